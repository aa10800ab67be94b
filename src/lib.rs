//! Workspace facade crate.
//!
//! Re-exports the audio core together with its runtime and bridge crates so a
//! host application can depend on `native-audio-workspace` alone. With the
//! `desktop-shims` feature (default) it also wires the desktop adapters into a
//! ready-to-use [`AudioManager`].

pub use bridge_traits;
pub use core_audio;
pub use core_runtime;

pub use core_audio::{AudioError, AudioManager};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

/// Builds an [`AudioManager`] backed by the desktop channel factory and session.
///
/// Bundled resources are resolved relative to `asset_root`. Must be called from
/// within a Tokio runtime.
#[cfg(feature = "desktop-shims")]
pub fn desktop_manager(
    asset_root: impl Into<std::path::PathBuf>,
    config: core_runtime::config::AudioConfig,
) -> core_audio::Result<AudioManager> {
    use std::sync::Arc;

    let factory = Arc::new(bridge_desktop::DesktopChannelFactory::new(asset_root));
    let session = Arc::new(bridge_desktop::DesktopAudioSession::new());
    AudioManager::with_config(factory, session, config)
}
