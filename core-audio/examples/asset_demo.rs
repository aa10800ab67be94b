//! Audio manager walkthrough on the headless desktop backend
//!
//! Preloads an effect and a music track from a directory, fires the effect
//! polyphonically, fades the music in and out, and prints every event.
//!
//! Run with:
//! ```bash
//! # Assets resolved under ./assets (bundled paths are prefixed with public/)
//! cargo run -p core-audio --example asset_demo -- ./assets
//!
//! # Custom file names
//! cargo run -p core-audio --example asset_demo -- ./assets click.wav theme.mp3
//! ```

use anyhow::{Context, Result};
use bridge_desktop::{DesktopAudioSession, DesktopChannelFactory};
use bridge_traits::{ConsoleLogger, LogLevel};
use core_audio::{
    AudioError, AudioEvent, AudioManager, ConfigureOptions, PlayOptions, PreloadOptions,
    SetVolumeOptions, StopOptions,
};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let root = args.get(1).cloned().unwrap_or_else(|| ".".to_string());
    let effect = args.get(2).cloned().unwrap_or_else(|| "click.wav".to_string());
    let music = args.get(3).cloned().unwrap_or_else(|| "theme.mp3".to_string());

    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug)
            .with_filter("core_audio=debug,bridge_desktop=debug")
            .with_logger_sink(Arc::new(ConsoleLogger {
                min_level: LogLevel::Warn,
            })),
    )
    .context("failed to initialize logging")?;

    let factory = Arc::new(DesktopChannelFactory::new(&root));
    let session = Arc::new(DesktopAudioSession::new());
    let manager = AudioManager::new(factory, session.clone()).context("failed to start manager")?;

    let mut events = manager.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                AudioEvent::CurrentTime { .. } => {}
                other => info!(?other, "Event"),
            }
        }
    });

    manager
        .configure(ConfigureOptions {
            focus: Some(true),
            ..Default::default()
        })
        .await?;

    manager
        .preload(PreloadOptions::new("click", &effect).with_channels(3))
        .await
        .with_context(|| format!("failed to preload {}", effect))?;
    manager
        .preload(PreloadOptions::new("music", &music).with_volume(0.8))
        .await
        .with_context(|| format!("failed to preload {}", music))?;

    for _ in 0..3 {
        manager.play(PlayOptions::new("click")).await?;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    match manager.get_duration("music").await {
        Ok(info) => info!(duration = info.duration, "Music duration"),
        Err(AudioError::NoDuration(_)) | Err(AudioError::Streaming(_)) => {
            warn!("Music duration unavailable, scheduled fade-out will be skipped")
        }
        Err(e) => return Err(e.into()),
    }

    manager
        .play(
            PlayOptions::new("music")
                .with_fade_in(Some(1.0))
                .with_fade_out(Some(2.0)),
        )
        .await?;
    tokio::time::sleep(Duration::from_secs(2)).await;

    manager
        .set_volume(SetVolumeOptions::new("music", 0.3).with_duration(1.0))
        .await?;
    tokio::time::sleep(Duration::from_millis(1500)).await;

    let position = manager.get_current_time("music").await?;
    info!(current_time = position.current_time, "Music position");

    manager
        .stop(StopOptions::new("music").with_fade_out(Some(0.5)))
        .await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    for id in manager.asset_ids().await {
        manager.unload(&id).await?;
    }
    info!(
        activations = session.activation_count(),
        deactivations = session.deactivation_count(),
        "Session summary"
    );
    Ok(())
}
