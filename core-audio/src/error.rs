//! # Audio Error Types
//!
//! Error taxonomy for the asset manager. Every variant maps to a stable
//! identifier through [`AudioError::code`] so host bridges can reject calls with
//! a machine-readable reason.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors returned by [`AudioManager`](crate::AudioManager) operations.
#[derive(Error, Debug)]
pub enum AudioError {
    // ========================================================================
    // Argument Errors
    // ========================================================================
    /// A required argument is missing, empty or not a number.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The preload request cannot describe a playable asset.
    #[error("Invalid preload spec: {0}")]
    InvalidSpec(String),

    /// Volume is not a finite number.
    #[error("Invalid volume: {0}")]
    InvalidVolume(f32),

    /// Playback rate is not a finite number.
    #[error("Invalid rate: {0}")]
    InvalidRate(f32),

    // ========================================================================
    // Registry Errors
    // ========================================================================
    /// No asset is registered under this id.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// The id is already registered; unload it first.
    #[error("Asset already loaded: {0}")]
    AlreadyLoaded(String),

    // ========================================================================
    // State Errors
    // ========================================================================
    /// The operation does not apply to the asset's current state.
    #[error("Invalid state: {0}")]
    StateInvalid(String),

    /// The backend could not determine the asset's length.
    #[error("Duration unavailable for asset {0}")]
    NoDuration(String),

    /// The asset is an unbounded stream.
    #[error("Asset {0} is a stream without a finite duration")]
    Streaming(String),

    // ========================================================================
    // Platform Errors
    // ========================================================================
    /// The backend does not provide this capability.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// No channel could be created for the asset.
    #[error("Failed to construct asset: {0}")]
    ConstructionFailure(String),

    /// A channel or session call failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Invalid runtime configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),
}

impl AudioError {
    /// Stable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AudioError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AudioError::InvalidSpec(_) => "INVALID_SPEC",
            AudioError::InvalidVolume(_) => "INVALID_VOLUME",
            AudioError::InvalidRate(_) => "INVALID_RATE",
            AudioError::NotFound(_) => "NOT_FOUND",
            AudioError::AlreadyLoaded(_) => "ALREADY_LOADED",
            AudioError::StateInvalid(_) => "STATE_INVALID",
            AudioError::NoDuration(_) => "NO_DURATION",
            AudioError::Streaming(_) => "STREAMING",
            AudioError::Unsupported(_) => "UNSUPPORTED",
            AudioError::ConstructionFailure(_) => "CONSTRUCTION_FAILURE",
            AudioError::Bridge(_) => "BRIDGE_ERROR",
            AudioError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Returns `true` if the asset id was unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AudioError::NotFound(_))
    }

    /// Returns `true` if the caller passed a bad argument.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            AudioError::InvalidArgument(_)
                | AudioError::InvalidSpec(_)
                | AudioError::InvalidVolume(_)
                | AudioError::InvalidRate(_)
        )
    }
}

/// Result type for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AudioError::NotFound("a".into()).code(), "NOT_FOUND");
        assert_eq!(AudioError::AlreadyLoaded("a".into()).code(), "ALREADY_LOADED");
        assert_eq!(AudioError::NoDuration("a".into()).code(), "NO_DURATION");
        assert_eq!(
            AudioError::Bridge(BridgeError::NotAvailable("x".into())).code(),
            "BRIDGE_ERROR"
        );
    }

    #[test]
    fn test_classification() {
        assert!(AudioError::NotFound("a".into()).is_not_found());
        assert!(AudioError::InvalidVolume(f32::NAN).is_argument_error());
        assert!(!AudioError::StateInvalid("idle".into()).is_argument_error());
    }

    #[test]
    fn test_display_includes_asset() {
        let err = AudioError::Streaming("radio".into());
        assert!(err.to_string().contains("radio"));
    }
}
