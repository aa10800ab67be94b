//! Channel bridge traits and supporting source types.
//!
//! A channel is one unit of platform playback capability: a single voice that
//! can play, pause, seek and change gain. The core never looks behind this
//! interface; local files, bundled resources and remote streams are all just
//! different [`AudioSource`]s handed to a [`ChannelFactory`].

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Callback invoked when a channel reaches its natural end of playback.
///
/// Implementations may invoke it from any thread. The callback must not block.
pub type EndedCallback = Arc<dyn Fn() + Send + Sync>;

/// Where a channel reads its audio from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AudioSource {
    /// File on the local filesystem.
    LocalFile { path: PathBuf },
    /// Resource shipped with the host application, relative to its asset root.
    BundledResource { path: PathBuf },
    /// Remote stream fetched by the host.
    RemoteUrl { url: Url },
}

impl AudioSource {
    /// Returns `true` for sources that are fetched over the network.
    pub fn is_remote(&self) -> bool {
        matches!(self, AudioSource::RemoteUrl { .. })
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioSource::LocalFile { path } => write!(f, "file:{}", path.display()),
            AudioSource::BundledResource { path } => write!(f, "bundle:{}", path.display()),
            AudioSource::RemoteUrl { url } => write!(f, "{}", url),
        }
    }
}

/// Length of the media behind a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaDuration {
    /// Finite, known length.
    Known(Duration),
    /// The backend could not determine a length.
    Unknown,
    /// Live or unbounded stream.
    Streaming,
}

impl MediaDuration {
    /// Returns the concrete length, if known.
    pub fn known(&self) -> Option<Duration> {
        match self {
            MediaDuration::Known(duration) => Some(*duration),
            _ => None,
        }
    }
}

/// A single playable voice.
///
/// All methods are synchronous and cheap; the core calls them while holding its
/// registry lock, so implementations must not block on I/O.
pub trait ChannelHandle: Send + Sync {
    /// Start or continue playback from the current position.
    fn play(&self) -> Result<()>;

    /// Pause playback, keeping the current position.
    fn pause(&self) -> Result<()>;

    /// Stop playback, rewind to the start and clear looping.
    fn stop(&self) -> Result<()>;

    /// Move the playback position.
    fn seek(&self, position: Duration) -> Result<()>;

    /// Set the channel gain in `[0.0, 1.0]`.
    fn set_volume(&self, volume: f32) -> Result<()>;

    /// Current channel gain.
    fn volume(&self) -> f32;

    /// Set the playback rate (1.0 is normal speed).
    fn set_rate(&self, rate: f32) -> Result<()>;

    /// Repeat forever when `true`.
    fn set_looping(&self, looping: bool) -> Result<()>;

    fn is_playing(&self) -> bool;

    fn current_time(&self) -> Duration;

    fn duration(&self) -> MediaDuration;

    /// Install (or clear) the end-of-playback callback.
    fn set_on_ended(&self, callback: Option<EndedCallback>);

    /// Release platform resources. The handle must not be used afterwards.
    fn release(&self) -> Result<()>;
}

/// Creates channels for a given source.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::channel::{AudioSource, ChannelFactory};
///
/// async fn open(factory: &dyn ChannelFactory) -> bridge_traits::error::Result<()> {
///     let source = AudioSource::BundledResource { path: "public/click.wav".into() };
///     let channel = factory.create_channel(&source, 1.0).await?;
///     channel.play()?;
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait ChannelFactory: Send + Sync {
    /// Construct a new channel for `source` with the given starting gain.
    async fn create_channel(
        &self,
        source: &AudioSource,
        initial_volume: f32,
    ) -> Result<Arc<dyn ChannelHandle>>;

    /// Drop any cached remote media. No-op for factories without a cache.
    async fn clear_cache(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_duration_known() {
        assert_eq!(
            MediaDuration::Known(Duration::from_secs(3)).known(),
            Some(Duration::from_secs(3))
        );
        assert_eq!(MediaDuration::Unknown.known(), None);
        assert_eq!(MediaDuration::Streaming.known(), None);
    }

    #[test]
    fn audio_source_display_and_remote() {
        let remote = AudioSource::RemoteUrl {
            url: Url::parse("https://example.com/live.m3u8").unwrap(),
        };
        assert!(remote.is_remote());
        assert_eq!(remote.to_string(), "https://example.com/live.m3u8");

        let bundled = AudioSource::BundledResource {
            path: PathBuf::from("public/click.wav"),
        };
        assert!(!bundled.is_remote());
        assert_eq!(bundled.to_string(), "bundle:public/click.wav");
    }

    #[test]
    fn audio_source_serializes_with_kind_tag() {
        let source = AudioSource::LocalFile {
            path: PathBuf::from("/tmp/a.mp3"),
        };
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["kind"], "localFile");
        assert_eq!(json["path"], "/tmp/a.mp3");
    }
}
