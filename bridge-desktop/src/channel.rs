//! Headless channel driven by the runtime clock.
//!
//! The desktop bridge has no output device of its own: hosts that render audio
//! elsewhere (or tests) still need a channel that keeps a faithful transport
//! state. `HeadlessChannel` derives its position from the Tokio clock, honors
//! rate and looping, and fires the end-of-playback callback when a finite
//! source runs out.

use bridge_traits::channel::{ChannelHandle, EndedCallback, MediaDuration};
use bridge_traits::error::{BridgeError, Result};
use core_async::runtime::{self, Handle};
use core_async::time::{sleep, Duration, Instant};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

struct TransportState {
    duration: MediaDuration,
    playing: bool,
    looping: bool,
    released: bool,
    /// Position at `anchor`, or the frozen position while not playing.
    position: Duration,
    /// Runtime instant at which `position` was sampled while playing.
    anchor: Option<Instant>,
    volume: f32,
    rate: f32,
    /// Bumped on every transport change so stale end timers can be discarded.
    generation: u64,
    play_count: u64,
}

impl TransportState {
    fn position_at(&self, now: Instant) -> Duration {
        let Some(anchor) = self.anchor else {
            return self.position;
        };

        let elapsed = now.saturating_duration_since(anchor).mul_f32(self.rate);
        let raw = self.position.saturating_add(elapsed);

        match self.duration {
            MediaDuration::Known(total) if !total.is_zero() => {
                if self.looping {
                    Duration::from_secs_f64(raw.as_secs_f64() % total.as_secs_f64())
                } else {
                    raw.min(total)
                }
            }
            _ => raw,
        }
    }

    /// Re-sample the position so later rate/loop changes start from "now".
    fn rebase(&mut self, now: Instant) {
        self.position = self.position_at(now);
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
    }

    fn time_to_end(&self, now: Instant) -> Option<Duration> {
        if !self.playing || self.looping {
            return None;
        }
        let total = self.duration.known()?;
        let remaining = total.saturating_sub(self.position_at(now));
        let scaled = remaining.as_secs_f64() / f64::from(self.rate);
        Some(Duration::try_from_secs_f64(scaled).unwrap_or(Duration::MAX))
    }
}

/// A channel whose transport runs on the runtime clock.
pub struct HeadlessChannel {
    state: Mutex<TransportState>,
    on_ended: Mutex<Option<EndedCallback>>,
    runtime: Handle,
    this: Weak<HeadlessChannel>,
}

impl HeadlessChannel {
    /// Create a channel on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotAvailable`] outside of a Tokio runtime.
    pub fn new(duration: MediaDuration, volume: f32) -> Result<Arc<Self>> {
        let runtime = runtime::current_handle().ok_or_else(|| {
            BridgeError::NotAvailable("headless channel requires a running runtime".to_string())
        })?;
        Ok(Self::with_handle(runtime, duration, volume))
    }

    /// Create a channel that schedules its end timer on `runtime`.
    pub fn with_handle(runtime: Handle, duration: MediaDuration, volume: f32) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            state: Mutex::new(TransportState {
                duration,
                playing: false,
                looping: false,
                released: false,
                position: Duration::ZERO,
                anchor: None,
                volume: volume.clamp(0.0, 1.0),
                rate: 1.0,
                generation: 0,
                play_count: 0,
            }),
            on_ended: Mutex::new(None),
            runtime,
            this: this.clone(),
        })
    }

    /// Number of times playback was started. Useful for inspecting round-robin
    /// selection.
    pub fn play_count(&self) -> u64 {
        self.state.lock().play_count
    }

    pub fn is_looping(&self) -> bool {
        self.state.lock().looping
    }

    pub fn rate(&self) -> f32 {
        self.state.lock().rate
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    fn ensure_live(state: &TransportState) -> Result<()> {
        if state.released {
            return Err(BridgeError::OperationFailed(
                "channel has been released".to_string(),
            ));
        }
        Ok(())
    }

    fn arm_end_timer(&self, state: &TransportState) {
        let Some(remaining) = state.time_to_end(Instant::now()) else {
            return;
        };

        let generation = state.generation;
        let this = self.this.clone();
        self.runtime.spawn(async move {
            sleep(remaining).await;
            if let Some(channel) = this.upgrade() {
                channel.finish(generation);
            }
        });
    }

    fn finish(&self, generation: u64) {
        {
            let mut state = self.state.lock();
            if state.generation != generation || !state.playing {
                return;
            }
            if let Some(total) = state.duration.known() {
                state.position = total;
            }
            state.anchor = None;
            state.playing = false;
            state.generation += 1;
        }

        trace!("Headless channel reached end of media");
        let callback = self.on_ended.lock().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl ChannelHandle for HeadlessChannel {
    fn play(&self) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_live(&state)?;
        if state.playing {
            return Ok(());
        }

        if let Some(total) = state.duration.known() {
            if state.position >= total {
                state.position = Duration::ZERO;
            }
        }

        state.anchor = Some(Instant::now());
        state.playing = true;
        state.play_count += 1;
        state.generation += 1;
        self.arm_end_timer(&state);
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_live(&state)?;
        if !state.playing {
            return Ok(());
        }
        state.rebase(Instant::now());
        state.anchor = None;
        state.playing = false;
        state.generation += 1;
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_live(&state)?;
        state.playing = false;
        state.looping = false;
        state.anchor = None;
        state.position = Duration::ZERO;
        state.generation += 1;
        Ok(())
    }

    fn seek(&self, position: Duration) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_live(&state)?;
        let position = match state.duration.known() {
            Some(total) => position.min(total),
            None => position,
        };

        state.position = position;
        if state.playing {
            state.anchor = Some(Instant::now());
            state.generation += 1;
            self.arm_end_timer(&state);
        }
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_live(&state)?;
        state.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    fn set_rate(&self, rate: f32) -> Result<()> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(BridgeError::OperationFailed(format!(
                "invalid playback rate {}",
                rate
            )));
        }

        let mut state = self.state.lock();
        Self::ensure_live(&state)?;
        state.rebase(Instant::now());
        state.rate = rate;
        if state.playing {
            state.generation += 1;
            self.arm_end_timer(&state);
        }
        Ok(())
    }

    fn set_looping(&self, looping: bool) -> Result<()> {
        let mut state = self.state.lock();
        Self::ensure_live(&state)?;
        state.rebase(Instant::now());
        state.looping = looping;
        if state.playing {
            state.generation += 1;
            self.arm_end_timer(&state);
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn current_time(&self) -> Duration {
        self.state.lock().position_at(Instant::now())
    }

    fn duration(&self) -> MediaDuration {
        self.state.lock().duration
    }

    fn set_on_ended(&self, callback: Option<EndedCallback>) {
        *self.on_ended.lock() = callback;
    }

    fn release(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.released {
                return Ok(());
            }
            state.playing = false;
            state.anchor = None;
            state.released = true;
            state.generation += 1;
        }
        self.on_ended.lock().take();
        debug!("Headless channel released");
        Ok(())
    }
}
