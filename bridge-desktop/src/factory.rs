//! Channel factory for desktop hosts.

use crate::channel::HeadlessChannel;
use async_trait::async_trait;
use bridge_traits::{
    channel::{AudioSource, ChannelFactory, ChannelHandle, MediaDuration},
    error::{BridgeError, Result},
};
use core_async::task;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Builds [`HeadlessChannel`]s for local files, bundled resources and remote
/// URLs.
///
/// Bundled resources are resolved against `asset_root`. Local and bundled files
/// must exist; their length is probed once with symphonia (when the `probe`
/// feature is enabled) and cached until [`ChannelFactory::clear_cache`].
/// Remote URLs are treated as streams of unknown length.
pub struct DesktopChannelFactory {
    asset_root: PathBuf,
    durations: Mutex<HashMap<PathBuf, MediaDuration>>,
}

impl DesktopChannelFactory {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            durations: Mutex::new(HashMap::new()),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Number of probed files currently cached.
    pub fn cached_durations(&self) -> usize {
        self.durations.lock().len()
    }

    fn resolve(&self, source: &AudioSource) -> Option<PathBuf> {
        match source {
            AudioSource::LocalFile { path } => Some(path.clone()),
            AudioSource::BundledResource { path } => Some(self.asset_root.join(path)),
            AudioSource::RemoteUrl { .. } => None,
        }
    }

    async fn duration_of(&self, path: PathBuf) -> Result<MediaDuration> {
        if let Some(duration) = self.durations.lock().get(&path).copied() {
            return Ok(duration);
        }

        let probed = path.clone();
        let duration = task::spawn_blocking(move || probe_file(&probed))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("probe task failed: {}", e)))??;

        debug!(path = ?path, duration = ?duration, "Probed media duration");
        self.durations.lock().insert(path, duration);
        Ok(duration)
    }
}

#[async_trait]
impl ChannelFactory for DesktopChannelFactory {
    #[instrument(skip(self), fields(source = %source))]
    async fn create_channel(
        &self,
        source: &AudioSource,
        initial_volume: f32,
    ) -> Result<Arc<dyn ChannelHandle>> {
        let duration = match self.resolve(source) {
            Some(path) => self.duration_of(path).await?,
            None => MediaDuration::Streaming,
        };

        let channel = HeadlessChannel::new(duration, initial_volume)?;
        Ok(channel)
    }

    async fn clear_cache(&self) -> Result<()> {
        let mut durations = self.durations.lock();
        debug!(entries = durations.len(), "Clearing probe cache");
        durations.clear();
        Ok(())
    }
}

fn ensure_exists(path: &Path) -> Result<()> {
    let metadata = std::fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(BridgeError::OperationFailed(format!(
            "{} is not a file",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(feature = "probe")]
fn probe_file(path: &Path) -> Result<MediaDuration> {
    use symphonia::core::codecs::CODEC_TYPE_NULL;
    use symphonia::core::formats::FormatOptions;
    use symphonia::core::io::{MediaSource, MediaSourceStream};
    use symphonia::core::meta::MetadataOptions;
    use symphonia::core::probe::Hint;

    ensure_exists(path)?;

    let file = std::fs::File::open(path)?;
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(ext);
    }

    let media_source = Box::new(file) as Box<dyn MediaSource>;
    let mss = MediaSourceStream::new(media_source, Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| BridgeError::Decode(format!("{}: {}", path.display(), e)))?;

    let Some(track) = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
    else {
        return Err(BridgeError::Decode(format!(
            "{}: no audio track",
            path.display()
        )));
    };

    let params = &track.codec_params;
    match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => Ok(MediaDuration::Known(
            std::time::Duration::from_secs_f64(frames as f64 / f64::from(rate)),
        )),
        _ => {
            warn!(path = ?path, "Container does not report a length");
            Ok(MediaDuration::Unknown)
        }
    }
}

#[cfg(not(feature = "probe"))]
fn probe_file(path: &Path) -> Result<MediaDuration> {
    ensure_exists(path)?;
    Ok(MediaDuration::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    /// 16-bit mono PCM WAV holding `samples` silent frames.
    fn write_wav(dir: &Path, name: &str, sample_rate: u32, samples: u32) -> PathBuf {
        let data_len = samples * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);

        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&bytes).unwrap();
        path
    }

    #[cfg(feature = "probe")]
    #[tokio::test]
    async fn test_bundled_resource_is_probed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("public")).unwrap();
        write_wav(&dir.path().join("public"), "click.wav", 8000, 4000);

        let factory = DesktopChannelFactory::new(dir.path());
        let source = AudioSource::BundledResource {
            path: PathBuf::from("public/click.wav"),
        };
        let channel = factory.create_channel(&source, 0.8).await.unwrap();

        assert_eq!(
            channel.duration(),
            MediaDuration::Known(Duration::from_millis(500))
        );
        assert_eq!(channel.volume(), 0.8);
        assert_eq!(factory.cached_durations(), 1);

        factory.clear_cache().await.unwrap();
        assert_eq!(factory.cached_durations(), 0);
    }

    #[tokio::test]
    async fn test_missing_local_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let factory = DesktopChannelFactory::new(dir.path());
        let source = AudioSource::LocalFile {
            path: dir.path().join("missing.mp3"),
        };

        let result = factory.create_channel(&source, 1.0).await;
        assert!(matches!(result, Err(BridgeError::Io(_))));
    }

    #[tokio::test]
    async fn test_directory_is_not_a_source() {
        let dir = tempfile::tempdir().unwrap();
        let factory = DesktopChannelFactory::new(dir.path());
        let source = AudioSource::LocalFile {
            path: dir.path().to_path_buf(),
        };

        assert!(factory.create_channel(&source, 1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_remote_url_is_streaming() {
        let factory = DesktopChannelFactory::new(".");
        let source = AudioSource::RemoteUrl {
            url: url::Url::parse("https://example.com/bgm.mp3").unwrap(),
        };

        let channel = factory.create_channel(&source, 1.0).await.unwrap();
        assert_eq!(channel.duration(), MediaDuration::Streaming);
        assert_eq!(factory.cached_durations(), 0);
    }
}
