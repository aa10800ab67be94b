//! # Operation Options
//!
//! Argument bags for every manager operation, shaped like the host bridge's
//! JSON arguments (camelCase, optional fields with defaults). Times and
//! durations are in seconds.
//!
//! Results are small serde structs so a bridge can hand them back unchanged.

use crate::error::{AudioError, Result};
use bridge_traits::channel::AudioSource;
use bridge_traits::session::SessionOptions;
use core_async::time::secs_f64;
use core_runtime::config::AudioConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

// ============================================================================
// Requests
// ============================================================================

/// Host-level session configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureOptions {
    #[serde(default)]
    pub focus: Option<bool>,
    #[serde(default)]
    pub background: Option<bool>,
    #[serde(default)]
    pub ignore_silent: Option<bool>,
}

impl ConfigureOptions {
    pub(crate) fn session_options(&self) -> SessionOptions {
        let defaults = SessionOptions::default();
        SessionOptions {
            focus: self.focus.unwrap_or(defaults.focus),
            background: self.background.unwrap_or(defaults.background),
            ignore_silent: self.ignore_silent.unwrap_or(defaults.ignore_silent),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadOptions {
    pub asset_id: String,
    pub asset_path: String,
    /// Initial gain in `[0.0, 1.0]`. Default 1.0.
    #[serde(default)]
    pub volume: Option<f32>,
    /// Polyphony. Default 1, capped by the configuration.
    #[serde(default, alias = "audioChannelNum")]
    pub channels: Option<usize>,
    /// Treat `asset_path` as a URL or absolute file path rather than a bundled
    /// resource.
    #[serde(default)]
    pub is_url: bool,
}

impl PreloadOptions {
    pub fn new(asset_id: impl Into<String>, asset_path: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            asset_path: asset_path.into(),
            ..Default::default()
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn with_url(mut self, is_url: bool) -> Self {
        self.is_url = is_url;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        require_id(&self.asset_id)?;
        if self.asset_path.trim().is_empty() {
            return Err(AudioError::InvalidSpec(format!(
                "asset path is empty for {}",
                self.asset_id
            )));
        }
        if let Some(volume) = self.volume {
            if !volume.is_finite() {
                return Err(AudioError::InvalidArgument(format!(
                    "volume {} is not a number",
                    volume
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn initial_volume(&self) -> f32 {
        self.volume.unwrap_or(1.0).clamp(0.0, 1.0)
    }

    /// Resolve the path into a channel source.
    pub fn source(&self, config: &AudioConfig) -> AudioSource {
        resolve_source(&self.asset_path, self.is_url, &config.bundled_asset_prefix)
    }
}

fn resolve_source(path: &str, is_url: bool, bundled_prefix: &str) -> AudioSource {
    // Single-letter schemes are Windows drive letters, not URLs.
    if let Ok(url) = Url::parse(path) {
        if url.scheme().len() > 1 {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return AudioSource::LocalFile { path };
                }
                return AudioSource::LocalFile {
                    path: PathBuf::from(url.path()),
                };
            }
            return AudioSource::RemoteUrl { url };
        }
    }

    if is_url {
        return AudioSource::LocalFile {
            path: PathBuf::from(path),
        };
    }

    let relative = path.trim_start_matches('/');
    let path = if bundled_prefix.is_empty() || relative.starts_with(bundled_prefix) {
        PathBuf::from(relative)
    } else {
        Path::new(bundled_prefix).join(relative)
    };
    AudioSource::BundledResource { path }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayOptions {
    pub asset_id: String,
    /// Start offset. Default 0.
    #[serde(default)]
    pub time: Option<f64>,
    /// Defer playback. Default 0.
    #[serde(default)]
    pub delay: Option<f64>,
    /// Override the asset volume for this play.
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub fade_in: bool,
    #[serde(default)]
    pub fade_in_duration: Option<f64>,
    #[serde(default)]
    pub fade_out: bool,
    #[serde(default)]
    pub fade_out_duration: Option<f64>,
    /// Offset at which the fade-out begins. Default `duration - fadeOutDuration`.
    #[serde(default)]
    pub fade_out_start_time: Option<f64>,
}

impl PlayOptions {
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            ..Default::default()
        }
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_fade_in(mut self, duration: Option<f64>) -> Self {
        self.fade_in = true;
        self.fade_in_duration = duration;
        self
    }

    pub fn with_fade_out(mut self, duration: Option<f64>) -> Self {
        self.fade_out = true;
        self.fade_out_duration = duration;
        self
    }

    pub fn with_fade_out_start_time(mut self, start: f64) -> Self {
        self.fade_out_start_time = Some(start);
        self
    }

    pub(crate) fn delay(&self) -> Duration {
        self.delay.map(secs_f64).unwrap_or_default()
    }

    pub(crate) fn request(&self, config: &AudioConfig) -> Result<PlayRequest> {
        require_id(&self.asset_id)?;
        let volume = match self.volume {
            Some(volume) if !volume.is_finite() => return Err(AudioError::InvalidVolume(volume)),
            Some(volume) => Some(volume.clamp(0.0, config.max_volume)),
            None => None,
        };

        let fade_in = self
            .fade_in
            .then(|| fade_duration(self.fade_in_duration, config));
        let fade_out = self.fade_out.then(|| FadeOutRequest {
            duration: fade_duration(self.fade_out_duration, config),
            start: self.fade_out_start_time.map(secs_f64).filter(|s| !s.is_zero()),
        });

        Ok(PlayRequest {
            time: self.time.map(secs_f64).unwrap_or_default(),
            volume,
            fade_in,
            fade_out,
        })
    }
}

/// A validated play call with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlayRequest {
    pub time: Duration,
    pub volume: Option<f32>,
    pub fade_in: Option<Duration>,
    pub fade_out: Option<FadeOutRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FadeOutRequest {
    pub duration: Duration,
    /// Explicit start offset; `None` means `duration - fade length`.
    pub start: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseOptions {
    pub asset_id: String,
    #[serde(default)]
    pub fade_out: bool,
    #[serde(default)]
    pub fade_out_duration: Option<f64>,
}

impl PauseOptions {
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            ..Default::default()
        }
    }

    pub fn with_fade_out(mut self, duration: Option<f64>) -> Self {
        self.fade_out = true;
        self.fade_out_duration = duration;
        self
    }

    pub(crate) fn fade(&self, config: &AudioConfig) -> Option<Duration> {
        self.fade_out
            .then(|| fade_duration(self.fade_out_duration, config))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeOptions {
    pub asset_id: String,
    #[serde(default)]
    pub fade_in: bool,
    #[serde(default)]
    pub fade_in_duration: Option<f64>,
}

impl ResumeOptions {
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            ..Default::default()
        }
    }

    pub fn with_fade_in(mut self, duration: Option<f64>) -> Self {
        self.fade_in = true;
        self.fade_in_duration = duration;
        self
    }

    pub(crate) fn fade(&self, config: &AudioConfig) -> Option<Duration> {
        self.fade_in
            .then(|| fade_duration(self.fade_in_duration, config))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopOptions {
    pub asset_id: String,
    #[serde(default)]
    pub fade_out: bool,
    #[serde(default)]
    pub fade_out_duration: Option<f64>,
}

impl StopOptions {
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            ..Default::default()
        }
    }

    pub fn with_fade_out(mut self, duration: Option<f64>) -> Self {
        self.fade_out = true;
        self.fade_out_duration = duration;
        self
    }

    pub(crate) fn fade(&self, config: &AudioConfig) -> Option<Duration> {
        self.fade_out
            .then(|| fade_duration(self.fade_out_duration, config))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVolumeOptions {
    pub asset_id: String,
    pub volume: f32,
    /// Ramp length. Zero or absent applies the volume immediately.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl SetVolumeOptions {
    pub fn new(asset_id: impl Into<String>, volume: f32) -> Self {
        Self {
            asset_id: asset_id.into(),
            volume,
            duration: None,
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRateOptions {
    pub asset_id: String,
    pub rate: f32,
}

impl SetRateOptions {
    pub fn new(asset_id: impl Into<String>, rate: f32) -> Self {
        Self {
            asset_id: asset_id.into(),
            rate,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCurrentTimeOptions {
    pub asset_id: String,
    pub time: f64,
}

impl SetCurrentTimeOptions {
    pub fn new(asset_id: impl Into<String>, time: f64) -> Self {
        Self {
            asset_id: asset_id.into(),
            time,
        }
    }
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Found {
    pub found: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTime {
    pub current_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationInfo {
    pub duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsPlaying {
    pub is_playing: bool,
}

// ============================================================================
// Helpers
// ============================================================================

pub(crate) fn require_id(asset_id: &str) -> Result<()> {
    if asset_id.trim().is_empty() {
        return Err(AudioError::InvalidArgument("assetId is required".to_string()));
    }
    Ok(())
}

fn fade_duration(seconds: Option<f64>, config: &AudioConfig) -> Duration {
    match seconds {
        Some(seconds) if seconds.is_finite() && seconds >= 0.0 => secs_f64(seconds),
        _ => config.default_fade_duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_path_gets_prefix() {
        let config = AudioConfig::default();
        let source = PreloadOptions::new("click", "sounds/click.wav").source(&config);
        assert_eq!(
            source,
            AudioSource::BundledResource {
                path: PathBuf::from("public/sounds/click.wav")
            }
        );

        let source = PreloadOptions::new("click", "public/click.wav").source(&config);
        assert_eq!(
            source,
            AudioSource::BundledResource {
                path: PathBuf::from("public/click.wav")
            }
        );
    }

    #[test]
    fn test_urls_resolve_by_scheme() {
        let config = AudioConfig::default();
        let remote = PreloadOptions::new("bgm", "https://cdn.example.com/bgm.mp3").source(&config);
        assert!(remote.is_remote());

        let local = PreloadOptions::new("bgm", "file:///tmp/bgm.mp3")
            .with_url(true)
            .source(&config);
        assert_eq!(
            local,
            AudioSource::LocalFile {
                path: PathBuf::from("/tmp/bgm.mp3")
            }
        );

        let raw = PreloadOptions::new("bgm", "/var/media/bgm.mp3")
            .with_url(true)
            .source(&config);
        assert_eq!(
            raw,
            AudioSource::LocalFile {
                path: PathBuf::from("/var/media/bgm.mp3")
            }
        );
    }

    #[test]
    fn test_preload_validation() {
        assert!(matches!(
            PreloadOptions::new("", "a.wav").validate(),
            Err(AudioError::InvalidArgument(_))
        ));
        assert!(matches!(
            PreloadOptions::new("a", " ").validate(),
            Err(AudioError::InvalidSpec(_))
        ));
        assert!(PreloadOptions::new("a", "a.wav")
            .with_volume(f32::NAN)
            .validate()
            .is_err());
        assert_eq!(
            PreloadOptions::new("a", "a.wav").with_volume(3.0).initial_volume(),
            1.0
        );
    }

    #[test]
    fn test_preload_accepts_channel_alias() {
        let options: PreloadOptions = serde_json::from_str(
            r#"{"assetId":"click","assetPath":"click.wav","audioChannelNum":3,"isUrl":false}"#,
        )
        .unwrap();
        assert_eq!(options.channels, Some(3));

        let options: PreloadOptions =
            serde_json::from_str(r#"{"assetId":"click","assetPath":"click.wav","channels":2}"#)
                .unwrap();
        assert_eq!(options.channels, Some(2));
        assert!(!options.is_url);
    }

    #[test]
    fn test_play_request_defaults() {
        let config = AudioConfig::default();
        let request = PlayOptions::new("bgm")
            .with_fade_in(None)
            .with_fade_out(Some(2.0))
            .request(&config)
            .unwrap();

        assert_eq!(request.time, Duration::ZERO);
        assert_eq!(request.fade_in, Some(Duration::from_secs(1)));
        assert_eq!(
            request.fade_out,
            Some(FadeOutRequest {
                duration: Duration::from_secs(2),
                start: None
            })
        );
    }

    #[test]
    fn test_play_request_rejects_nan_volume() {
        let config = AudioConfig::default();
        let result = PlayOptions::new("bgm").with_volume(f32::NAN).request(&config);
        assert!(matches!(result, Err(AudioError::InvalidVolume(_))));
    }

    #[test]
    fn test_negative_delay_is_immediate() {
        assert_eq!(PlayOptions::new("a").with_delay(-1.0).delay(), Duration::ZERO);
        assert_eq!(
            PlayOptions::new("a").with_delay(0.25).delay(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_results_serialize_camel_case() {
        let json = serde_json::to_string(&IsPlaying { is_playing: true }).unwrap();
        assert_eq!(json, r#"{"isPlaying":true}"#);
        let json = serde_json::to_string(&CurrentTime { current_time: 1.5 }).unwrap();
        assert_eq!(json, r#"{"currentTime":1.5}"#);
    }
}
