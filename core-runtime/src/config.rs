//! # Audio Configuration
//!
//! Timing constants and limits shared by the audio core.
//!
//! ## Overview
//!
//! Every field has a serde default, so hosts can ship a partial JSON document
//! and inherit the rest. [`AudioConfig::validate`] fails fast on values that
//! would break the fade math or the scheduler (zero step sizes, an inverted
//! rate range, a zero channel cap) before any asset is created.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::AudioConfig;
//! use std::time::Duration;
//!
//! let config = AudioConfig::default()
//!     .with_fade_step(Duration::from_millis(40))
//!     .with_max_channels(8);
//! config.validate().expect("valid config");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the audio asset manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Interval between two envelope steps.
    ///
    /// Default: 80 ms.
    #[serde(default = "default_fade_step")]
    pub fade_step: Duration,

    /// Cadence of `currentTime` notifications while an asset is playing.
    ///
    /// Default: 100 ms.
    #[serde(default = "default_time_update_interval")]
    pub time_update_interval: Duration,

    /// Fade length used when a fade is requested without an explicit duration.
    ///
    /// Default: 1 second.
    #[serde(default = "default_fade_duration")]
    pub default_fade_duration: Duration,

    /// Floor applied to exponential ramps so the per-step ratio stays finite.
    ///
    /// Default: 0.001.
    #[serde(default = "default_zero_volume")]
    pub zero_volume: f32,

    /// Upper bound for channel gain.
    ///
    /// Default: 1.0.
    #[serde(default = "default_max_volume")]
    pub max_volume: f32,

    /// Lowest playback rate accepted by `setRate`.
    ///
    /// Default: 0.5.
    #[serde(default = "default_min_rate")]
    pub min_rate: f32,

    /// Highest playback rate accepted by `setRate`.
    ///
    /// Default: 2.0.
    #[serde(default = "default_max_rate")]
    pub max_rate: f32,

    /// Cap on the polyphonic channel pool of a single asset.
    ///
    /// Default: 32.
    #[serde(default = "default_max_channels")]
    pub max_channels: usize,

    /// Buffer of the event broadcast channel.
    ///
    /// Default: 100 events.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,

    /// Prefix prepended to bundled resource paths.
    ///
    /// Default: `public/`.
    #[serde(default = "default_bundled_asset_prefix")]
    pub bundled_asset_prefix: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            fade_step: default_fade_step(),
            time_update_interval: default_time_update_interval(),
            default_fade_duration: default_fade_duration(),
            zero_volume: default_zero_volume(),
            max_volume: default_max_volume(),
            min_rate: default_min_rate(),
            max_rate: default_max_rate(),
            max_channels: default_max_channels(),
            event_buffer_size: default_event_buffer_size(),
            bundled_asset_prefix: default_bundled_asset_prefix(),
        }
    }
}

impl AudioConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.fade_step.is_zero() {
            return Err(Error::Config("fade_step must be greater than zero".into()));
        }

        if self.time_update_interval.is_zero() {
            return Err(Error::Config(
                "time_update_interval must be greater than zero".into(),
            ));
        }

        if !(self.max_volume.is_finite() && self.max_volume > 0.0 && self.max_volume <= 1.0) {
            return Err(Error::Config("max_volume must be in (0.0, 1.0]".into()));
        }

        if !(self.zero_volume.is_finite()
            && self.zero_volume > 0.0
            && self.zero_volume < self.max_volume)
        {
            return Err(Error::Config(format!(
                "zero_volume must be in (0.0, {})",
                self.max_volume
            )));
        }

        if !(self.min_rate.is_finite() && self.min_rate > 0.0) {
            return Err(Error::Config("min_rate must be positive".into()));
        }

        if !(self.max_rate.is_finite() && self.max_rate >= self.min_rate) {
            return Err(Error::Config(
                "max_rate must be finite and not below min_rate".into(),
            ));
        }

        if self.max_channels == 0 {
            return Err(Error::Config("max_channels must be at least 1".into()));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "event_buffer_size must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Set the envelope step interval.
    pub fn with_fade_step(mut self, step: Duration) -> Self {
        self.fade_step = step;
        self
    }

    /// Set the `currentTime` notification cadence.
    pub fn with_time_update_interval(mut self, interval: Duration) -> Self {
        self.time_update_interval = interval;
        self
    }

    /// Set the fallback fade length.
    pub fn with_default_fade_duration(mut self, duration: Duration) -> Self {
        self.default_fade_duration = duration;
        self
    }

    /// Set the accepted playback rate range.
    pub fn with_rate_range(mut self, min: f32, max: f32) -> Self {
        self.min_rate = min;
        self.max_rate = max;
        self
    }

    /// Set the per-asset channel cap.
    pub fn with_max_channels(mut self, max: usize) -> Self {
        self.max_channels = max;
        self
    }

    /// Set the event buffer size.
    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    /// Set the bundled resource prefix.
    pub fn with_bundled_asset_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bundled_asset_prefix = prefix.into();
        self
    }

    /// Clamp a requested channel count into `[1, max_channels]`.
    pub fn clamp_channels(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(1).clamp(1, self.max_channels.max(1))
    }

    /// Clamp a playback rate into the configured range.
    pub fn clamp_rate(&self, rate: f32) -> f32 {
        rate.clamp(self.min_rate, self.max_rate)
    }
}

// Default value functions for serde
fn default_fade_step() -> Duration {
    Duration::from_millis(80)
}

fn default_time_update_interval() -> Duration {
    Duration::from_millis(100)
}

fn default_fade_duration() -> Duration {
    Duration::from_secs(1)
}

fn default_zero_volume() -> f32 {
    0.001
}

fn default_max_volume() -> f32 {
    1.0
}

fn default_min_rate() -> f32 {
    0.5
}

fn default_max_rate() -> f32 {
    2.0
}

fn default_max_channels() -> usize {
    32
}

fn default_event_buffer_size() -> usize {
    crate::events::DEFAULT_EVENT_BUFFER_SIZE
}

fn default_bundled_asset_prefix() -> String {
    "public/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AudioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fade_step, Duration::from_millis(80));
        assert_eq!(config.time_update_interval, Duration::from_millis(100));
        assert_eq!(config.max_channels, 32);
        assert_eq!(config.bundled_asset_prefix, "public/");
    }

    #[test]
    fn test_zero_fade_step_rejected() {
        let config = AudioConfig::default().with_fade_step(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fade_step"));
    }

    #[test]
    fn test_inverted_rate_range_rejected() {
        let config = AudioConfig::default().with_rate_range(2.0, 0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_volume_must_stay_below_max() {
        let config = AudioConfig {
            zero_volume: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AudioConfig {
            zero_volume: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_channels_rejected() {
        let config = AudioConfig::default().with_max_channels(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_channels() {
        let config = AudioConfig::default();
        assert_eq!(config.clamp_channels(None), 1);
        assert_eq!(config.clamp_channels(Some(0)), 1);
        assert_eq!(config.clamp_channels(Some(3)), 3);
        assert_eq!(config.clamp_channels(Some(500)), 32);
    }

    #[test]
    fn test_clamp_rate() {
        let config = AudioConfig::default();
        assert_eq!(config.clamp_rate(0.1), 0.5);
        assert_eq!(config.clamp_rate(1.25), 1.25);
        assert_eq!(config.clamp_rate(8.0), 2.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AudioConfig =
            serde_json::from_str(r#"{"max_channels": 4, "bundled_asset_prefix": "assets/"}"#)
                .unwrap();
        assert_eq!(config.max_channels, 4);
        assert_eq!(config.bundled_asset_prefix, "assets/");
        assert_eq!(config.fade_step, Duration::from_millis(80));
        assert!(config.validate().is_ok());
    }
}
