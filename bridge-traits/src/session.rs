//! Shared audio output session.
//!
//! The session is the one device-wide resource contended by every asset. Hosts
//! map it to `AVAudioSession`, Android audio focus, or nothing at all on the
//! desktop. The core only toggles it; deciding *when* is the job of the
//! session policy in `core-audio`.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// Host-level session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    /// Request exclusive audio focus (ducks or pauses other apps).
    #[serde(default)]
    pub focus: bool,
    /// Keep the session alive while the app is backgrounded.
    #[serde(default)]
    pub background: bool,
    /// Keep playing when the device silent switch is on.
    #[serde(default = "default_ignore_silent")]
    pub ignore_silent: bool,
}

fn default_ignore_silent() -> bool {
    true
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            focus: false,
            background: false,
            ignore_silent: default_ignore_silent(),
        }
    }
}

/// External interruption notifications (phone call, another app taking focus).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionEvent {
    /// Output was taken away from this app.
    Began,
    /// Output is available again.
    Ended {
        /// Platform hint that playback may resume.
        should_resume: bool,
    },
}

/// Platform audio session.
pub trait AudioSession: Send + Sync {
    /// Apply host configuration.
    ///
    /// Backends without a configurable session keep the default, which reports
    /// the capability as unavailable.
    fn configure(&self, options: &SessionOptions) -> Result<()> {
        let _ = options;
        Err(BridgeError::NotAvailable(
            "audio session configuration".to_string(),
        ))
    }

    /// Activate or deactivate the shared output session.
    fn set_active(&self, active: bool) -> Result<()>;

    /// Whether audio from another application is currently playing.
    fn is_other_audio_playing(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Passive;

    impl AudioSession for Passive {
        fn set_active(&self, _active: bool) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn default_options_ignore_silent() {
        let options = SessionOptions::default();
        assert!(!options.focus);
        assert!(!options.background);
        assert!(options.ignore_silent);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: SessionOptions = serde_json::from_str(r#"{"background":true}"#).unwrap();
        assert!(options.background);
        assert!(options.ignore_silent);

        let options: SessionOptions = serde_json::from_str(r#"{"ignoreSilent":false}"#).unwrap();
        assert!(!options.ignore_silent);
    }

    #[test]
    fn configure_defaults_to_not_available() {
        let result = Passive.configure(&SessionOptions::default());
        assert!(matches!(result, Err(BridgeError::NotAvailable(_))));
        assert!(!Passive.is_other_audio_playing());
    }
}
