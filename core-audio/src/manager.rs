//! # Audio Manager
//!
//! The operation surface exposed to host bridges.
//!
//! ## Overview
//!
//! The manager owns the registry behind a single `RwLock`, which plays the
//! role of the serialized audio queue: mutating operations and every
//! scheduled job take the write lock, read-only queries take the read lock and
//! observe a consistent snapshot. Operations on one asset keep the caller's
//! program order because the lock is fair.
//!
//! ## Usage
//!
//! ```ignore
//! use core_audio::{AudioManager, PlayOptions, PreloadOptions};
//!
//! let manager = AudioManager::new(factory, session)?;
//! manager.preload(PreloadOptions::new("click", "click.wav").with_channels(3)).await?;
//! manager.play(PlayOptions::new("click")).await?;
//!
//! let mut events = manager.subscribe_asset("click");
//! while let Ok(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! ```

use crate::asset::AudioAsset;
use crate::error::{AudioError, Result};
use crate::options::{
    require_id, ConfigureOptions, CurrentTime, DurationInfo, Found, IsPlaying, PauseOptions,
    PlayOptions, PreloadOptions, ResumeOptions, SetCurrentTimeOptions, SetRateOptions,
    SetVolumeOptions, StopOptions,
};
use crate::registry::Registry;
use crate::scheduler::Scheduler;
use crate::session::{SessionPolicy, SessionState};
use bridge_traits::channel::{ChannelFactory, MediaDuration};
use bridge_traits::error::BridgeError;
use bridge_traits::lifecycle::LifecycleState;
use bridge_traits::session::{AudioSession, InterruptionEvent};
use core_async::runtime;
use core_async::sync::RwLock;
use core_async::time::secs_f64;
use core_runtime::config::AudioConfig;
use core_runtime::events::{AudioEvent, EventBus, EventSeverity, EventStream};
use core_runtime::logging::strip_path;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};

/// State shared between the manager and its scheduled jobs.
pub(crate) struct Shared {
    pub(crate) registry: RwLock<Registry>,
    pub(crate) scheduler: Scheduler,
    pub(crate) session: SessionPolicy,
    pub(crate) config: AudioConfig,
    events: EventBus,
    factory: Arc<dyn ChannelFactory>,
}

impl Shared {
    /// Log the event at its severity, then broadcast it.
    pub(crate) fn emit(&self, event: AudioEvent) {
        match event.severity() {
            EventSeverity::Warning => warn!(?event, "{}", event.description()),
            EventSeverity::Info => info!(?event, "{}", event.description()),
            EventSeverity::Debug => trace!(?event, "{}", event.description()),
        }
        if self.events.emit(event).is_err() {
            trace!("No event subscribers");
        }
    }
}

/// Registry of named audio assets.
///
/// Cloning is cheap; clones share the same registry.
#[derive(Clone)]
pub struct AudioManager {
    shared: Arc<Shared>,
}

impl AudioManager {
    /// Create a manager with the default configuration.
    ///
    /// Must be called from within a Tokio runtime; scheduled work is spawned
    /// on it.
    pub fn new(factory: Arc<dyn ChannelFactory>, session: Arc<dyn AudioSession>) -> Result<Self> {
        Self::with_config(factory, session, AudioConfig::default())
    }

    /// Create a manager with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Config`] for an invalid configuration and
    /// [`AudioError::StateInvalid`] outside of a runtime.
    pub fn with_config(
        factory: Arc<dyn ChannelFactory>,
        session: Arc<dyn AudioSession>,
        config: AudioConfig,
    ) -> Result<Self> {
        config.validate()?;
        let handle = runtime::current_handle().ok_or_else(|| {
            AudioError::StateInvalid("audio manager requires a running runtime".to_string())
        })?;

        let shared = Arc::new_cyclic(|weak| Shared {
            registry: RwLock::new(Registry::default()),
            scheduler: Scheduler::new(weak.clone(), handle),
            session: SessionPolicy::new(session),
            events: EventBus::new(config.event_buffer_size),
            config,
            factory,
        });

        info!("Audio manager initialized");
        Ok(Self { shared })
    }

    pub fn config(&self) -> &AudioConfig {
        &self.shared.config
    }

    pub fn session_state(&self) -> SessionState {
        self.shared.session.state()
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Subscribe to every event.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.shared.events.subscribe())
    }

    /// Subscribe to `complete` and `currentTime` events of one asset.
    pub fn subscribe_asset(&self, asset_id: impl Into<String>) -> EventStream {
        self.subscribe().for_asset(asset_id)
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Apply host session options.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Unsupported`] when the backend has no configurable
    /// session.
    #[instrument(skip(self))]
    pub async fn configure(&self, options: ConfigureOptions) -> Result<()> {
        let session_options = options.session_options();
        match self.shared.session.configure(&session_options) {
            Ok(()) => {}
            Err(BridgeError::NotAvailable(what)) => {
                return Err(AudioError::Unsupported(what));
            }
            Err(e) => return Err(e.into()),
        }

        if session_options.background {
            self.shared.session.activate();
        }
        Ok(())
    }

    /// Surface an external interruption to listeners. Does not change state.
    pub fn handle_interruption(&self, event: InterruptionEvent) {
        let event = match event {
            InterruptionEvent::Began => AudioEvent::Interrupt {
                interrupted: true,
                should_resume: None,
            },
            InterruptionEvent::Ended { should_resume } => AudioEvent::Interrupt {
                interrupted: false,
                should_resume: Some(should_resume),
            },
        };
        self.shared.emit(event);
    }

    /// Release the session when the app is backgrounded and nothing plays.
    #[instrument(skip(self))]
    pub async fn handle_lifecycle(&self, state: LifecycleState) {
        if !state.is_backgrounded() {
            return;
        }
        let registry = self.shared.registry.read().await;
        registry.settle_session(&self.shared);
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Create an asset and its channel pool.
    ///
    /// Channels that fail to construct are skipped; the preload fails only
    /// when none could be built.
    #[instrument(skip(self, options), fields(asset_id = %options.asset_id))]
    pub async fn preload(&self, options: PreloadOptions) -> Result<()> {
        options.validate()?;
        let shared = &self.shared;

        let mut registry = shared.registry.write().await;
        if registry.contains(&options.asset_id) {
            return Err(AudioError::AlreadyLoaded(options.asset_id));
        }

        let source = options.source(&shared.config);
        let file = strip_path(&options.asset_path).to_string();
        let count = shared.config.clamp_channels(options.channels);
        let volume = options.initial_volume();

        let mut handles = Vec::with_capacity(count);
        let mut last_error = None;
        for channel in 0..count {
            match shared.factory.create_channel(&source, volume).await {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    warn!(channel, file = %file, "Failed to create channel: {}", e);
                    last_error = Some(e);
                }
            }
        }

        if handles.is_empty() {
            let reason = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no channels requested".to_string());
            return Err(AudioError::ConstructionFailure(format!(
                "{}: {}",
                options.asset_id, reason
            )));
        }

        let asset = AudioAsset::new(options.asset_id, handles, volume)?;
        asset.attach_end_callbacks(shared);
        info!(channels = asset.channel_count(), file = %file, "Asset preloaded");
        registry.insert(asset);
        Ok(())
    }

    pub async fn is_preloaded(&self, asset_id: &str) -> Result<Found> {
        require_id(asset_id)?;
        let registry = self.shared.registry.read().await;
        Ok(Found {
            found: registry.contains(asset_id),
        })
    }

    /// Cancel all pending work of an asset and release its channels.
    #[instrument(skip(self))]
    pub async fn unload(&self, asset_id: &str) -> Result<()> {
        require_id(asset_id)?;
        let mut registry = self.shared.registry.write().await;
        let mut asset = registry.remove(asset_id)?;
        asset.unload();
        registry.settle_session(&self.shared);
        info!("Asset unloaded");
        Ok(())
    }

    /// Ids of every registered asset.
    pub async fn asset_ids(&self) -> Vec<String> {
        self.shared.registry.read().await.ids()
    }

    /// Drop cached remote media held by the channel factory.
    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> Result<()> {
        self.shared.factory.clear_cache().await?;
        Ok(())
    }

    // ========================================================================
    // Transport
    // ========================================================================

    #[instrument(skip(self, options), fields(asset_id = %options.asset_id))]
    pub async fn play(&self, options: PlayOptions) -> Result<()> {
        let shared = &self.shared;
        let request = options.request(&shared.config)?;
        let delay = options.delay();

        let mut registry = shared.registry.write().await;
        let asset = registry.get_mut(&options.asset_id)?;
        asset.cancel_pending_play();

        if !delay.is_zero() {
            asset.schedule_play(request, delay, shared);
            return Ok(());
        }

        if asset.play(&request, shared)? {
            shared.session.activate();
        }
        Ok(())
    }

    #[instrument(skip(self, options), fields(asset_id = %options.asset_id))]
    pub async fn pause(&self, options: PauseOptions) -> Result<()> {
        require_id(&options.asset_id)?;
        let shared = &self.shared;
        let fade = options.fade(&shared.config);

        let mut registry = shared.registry.write().await;
        let silenced = registry.get_mut(&options.asset_id)?.pause(fade, shared)?;
        if silenced {
            registry.settle_session(shared);
        }
        Ok(())
    }

    #[instrument(skip(self, options), fields(asset_id = %options.asset_id))]
    pub async fn resume(&self, options: ResumeOptions) -> Result<()> {
        require_id(&options.asset_id)?;
        let shared = &self.shared;
        let fade = options.fade(&shared.config);

        let mut registry = shared.registry.write().await;
        registry.get_mut(&options.asset_id)?.resume(fade, shared)?;
        shared.session.activate();
        Ok(())
    }

    /// Repeat the asset until stopped.
    #[instrument(skip(self))]
    pub async fn loop_asset(&self, asset_id: &str) -> Result<()> {
        require_id(asset_id)?;
        let shared = &self.shared;

        let mut registry = shared.registry.write().await;
        registry.get_mut(asset_id)?.loop_play(shared)?;
        shared.session.activate();
        Ok(())
    }

    /// Stop the asset and dispatch `complete`, immediately or after a fade.
    #[instrument(skip(self, options), fields(asset_id = %options.asset_id))]
    pub async fn stop(&self, options: StopOptions) -> Result<()> {
        require_id(&options.asset_id)?;
        let shared = &self.shared;
        let fade = options.fade(&shared.config);

        let mut registry = shared.registry.write().await;
        if registry.get_mut(&options.asset_id)?.stop(fade, shared) {
            registry.settle_session(shared);
        }
        Ok(())
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Set the asset volume, ramping the audible channel when a duration is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::InvalidVolume`] for a non-finite volume. Finite
    /// values are clamped.
    #[instrument(skip(self, options), fields(asset_id = %options.asset_id))]
    pub async fn set_volume(&self, options: SetVolumeOptions) -> Result<()> {
        require_id(&options.asset_id)?;
        if !options.volume.is_finite() {
            return Err(AudioError::InvalidVolume(options.volume));
        }
        let shared = &self.shared;
        let volume = options.volume.clamp(0.0, shared.config.max_volume);
        let fade = options
            .duration
            .map(secs_f64)
            .filter(|duration| !duration.is_zero());

        let mut registry = shared.registry.write().await;
        registry
            .get_mut(&options.asset_id)?
            .set_volume(volume, fade, shared)?;
        debug!(volume, "Volume set");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`AudioError::InvalidRate`] for a non-finite rate. Finite values
    /// are clamped to the configured range.
    #[instrument(skip(self, options), fields(asset_id = %options.asset_id))]
    pub async fn set_rate(&self, options: SetRateOptions) -> Result<()> {
        require_id(&options.asset_id)?;
        if !options.rate.is_finite() {
            return Err(AudioError::InvalidRate(options.rate));
        }
        let rate = self.shared.config.clamp_rate(options.rate);

        let mut registry = self.shared.registry.write().await;
        registry.get_mut(&options.asset_id)?.set_rate(rate)?;
        debug!(rate, "Rate set");
        Ok(())
    }

    #[instrument(skip(self, options), fields(asset_id = %options.asset_id))]
    pub async fn set_current_time(&self, options: SetCurrentTimeOptions) -> Result<()> {
        require_id(&options.asset_id)?;
        if !options.time.is_finite() {
            return Err(AudioError::InvalidArgument(format!(
                "time {} is not a number",
                options.time
            )));
        }

        let mut registry = self.shared.registry.write().await;
        registry
            .get_mut(&options.asset_id)?
            .seek(secs_f64(options.time))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Position of the active channel.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::StateInvalid`] if the asset was never played.
    pub async fn get_current_time(&self, asset_id: &str) -> Result<CurrentTime> {
        require_id(asset_id)?;
        let registry = self.shared.registry.read().await;
        let position = registry.get(asset_id)?.current_time()?;
        Ok(CurrentTime {
            current_time: position.as_secs_f64(),
        })
    }

    /// # Errors
    ///
    /// Returns [`AudioError::NoDuration`] when the length is unknown and
    /// [`AudioError::Streaming`] for unbounded streams.
    pub async fn get_duration(&self, asset_id: &str) -> Result<DurationInfo> {
        require_id(asset_id)?;
        let registry = self.shared.registry.read().await;
        match registry.get(asset_id)?.duration() {
            MediaDuration::Known(duration) => Ok(DurationInfo {
                duration: duration.as_secs_f64(),
            }),
            MediaDuration::Unknown => Err(AudioError::NoDuration(asset_id.to_string())),
            MediaDuration::Streaming => Err(AudioError::Streaming(asset_id.to_string())),
        }
    }

    /// Whether the selected channel is playing.
    pub async fn is_playing(&self, asset_id: &str) -> Result<IsPlaying> {
        require_id(asset_id)?;
        let registry = self.shared.registry.read().await;
        Ok(IsPlaying {
            is_playing: registry.get(asset_id)?.is_playing(),
        })
    }
}
