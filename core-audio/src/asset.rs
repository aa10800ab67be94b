//! # Audio Asset
//!
//! One logical sound backed by a pool of channels.
//!
//! ## Overview
//!
//! - `play` round-robins across the pool so rapid triggers overlap instead of
//!   restarting each other. The channel that started last becomes the
//!   *active* channel and answers single-voice queries.
//! - Each channel owns at most one envelope. Starting a fade, setting the
//!   volume, pausing, stopping or unloading cancels the previous one.
//! - While the active channel plays, a tick reports its position and arms the
//!   scheduled fade-out once the start offset is reached.
//! - `complete` is dispatched at most once per play, whether the channel ended
//!   naturally or was stopped. A stop fade that outlives its voice completes
//!   on its own.
//!
//! All methods run with the registry write lock held. Methods that may have
//! silenced output return `true` so the caller can re-evaluate the session.

use crate::envelope::{FadeCompletion, FadePlan};
use crate::error::{AudioError, Result};
use crate::manager::Shared;
use crate::options::{FadeOutRequest, PlayRequest};
use bridge_traits::channel::{ChannelHandle, MediaDuration};
use core_async::sync::CancellationToken;
use core_runtime::events::AudioEvent;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

struct Envelope {
    token: CancellationToken,
    plan: FadePlan,
}

struct ChannelSlot {
    handle: Arc<dyn ChannelHandle>,
    envelope: Option<Envelope>,
}

impl ChannelSlot {
    fn cancel_envelope(&mut self) {
        if let Some(envelope) = self.envelope.take() {
            envelope.token.cancel();
        }
    }

    /// The gain the channel is heading to, ignoring fades that end in silence.
    fn settled_volume(&self) -> f32 {
        match &self.envelope {
            Some(envelope) if envelope.plan.completion() == FadeCompletion::Hold => {
                envelope.plan.target()
            }
            _ => self.handle.volume(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScheduledFadeOut {
    start: Duration,
    duration: Duration,
}

/// Per-play bookkeeping, cleared on unload.
#[derive(Default)]
struct Transient {
    volume_before_pause: Option<f32>,
    pending_play: Option<CancellationToken>,
    scheduled_fade_out: Option<ScheduledFadeOut>,
    dispatched_complete: bool,
    tick: Option<CancellationToken>,
}

pub(crate) struct AudioAsset {
    id: String,
    /// Never empty.
    channels: Vec<ChannelSlot>,
    play_index: usize,
    active: Option<usize>,
    initial_volume: f32,
    /// Baseline applied to future plays.
    volume: f32,
    transient: Transient,
    /// Parent of every token this asset hands out.
    lifetime: CancellationToken,
}

impl AudioAsset {
    pub(crate) fn new(
        id: String,
        handles: Vec<Arc<dyn ChannelHandle>>,
        initial_volume: f32,
    ) -> Result<Self> {
        if handles.is_empty() {
            return Err(AudioError::ConstructionFailure(format!(
                "{} has no channels",
                id
            )));
        }

        Ok(Self {
            id,
            channels: handles
                .into_iter()
                .map(|handle| ChannelSlot {
                    handle,
                    envelope: None,
                })
                .collect(),
            play_index: 0,
            active: None,
            initial_volume,
            volume: initial_volume,
            transient: Transient::default(),
            lifetime: CancellationToken::new(),
        })
    }

    /// Route platform end-of-playback notifications through the scheduler.
    pub(crate) fn attach_end_callbacks(&self, shared: &Shared) {
        for (index, slot) in self.channels.iter().enumerate() {
            let scheduler = shared.scheduler.clone();
            let token = self.lifetime.clone();
            let id = self.id.clone();
            slot.handle.set_on_ended(Some(Arc::new(move || {
                let id = id.clone();
                scheduler.schedule(Duration::ZERO, token.clone(), move |registry, shared| {
                    registry.channel_ended(&id, index, shared)
                });
            })));
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn channel_count(&self) -> usize {
        self.channels.len()
    }

    fn selected(&self) -> usize {
        self.active.unwrap_or(self.play_index)
    }

    fn selected_handle(&self) -> Arc<dyn ChannelHandle> {
        Arc::clone(&self.channels[self.selected()].handle)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub(crate) fn is_playing(&self) -> bool {
        self.selected_handle().is_playing()
    }

    pub(crate) fn any_channel_playing(&self) -> bool {
        self.channels.iter().any(|slot| slot.handle.is_playing())
    }

    pub(crate) fn current_time(&self) -> Result<Duration> {
        let index = self.active.ok_or_else(|| {
            AudioError::StateInvalid(format!("{} has no active channel", self.id))
        })?;
        Ok(self.channels[index].handle.current_time())
    }

    pub(crate) fn duration(&self) -> MediaDuration {
        self.selected_handle().duration()
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Start `request` after `delay`, replacing any pending delayed play.
    pub(crate) fn schedule_play(&mut self, request: PlayRequest, delay: Duration, shared: &Shared) {
        self.cancel_pending_play();
        let token = self.lifetime.child_token();
        self.transient.pending_play = Some(token.clone());

        let id = self.id.clone();
        shared.scheduler.schedule(delay, token, move |registry, shared| {
            registry.run_delayed_play(&id, request, shared)
        });
        debug!(asset_id = %self.id, delay = ?delay, "Delayed play scheduled");
    }

    pub(crate) fn cancel_pending_play(&mut self) {
        if let Some(token) = self.transient.pending_play.take() {
            token.cancel();
            debug!(asset_id = %self.id, "Pending delayed play cancelled");
        }
    }

    /// Called by the delayed-play job once it owns the lock.
    pub(crate) fn clear_pending_play(&mut self) {
        self.transient.pending_play = None;
    }

    /// Play on the next round-robin channel. Returns `false` when a fade-in
    /// was requested on a channel that is already sounding.
    pub(crate) fn play(&mut self, request: &PlayRequest, shared: &Shared) -> Result<bool> {
        let index = self.play_index;
        let handle = Arc::clone(&self.channels[index].handle);

        if request.fade_in.is_some() && handle.is_playing() {
            debug!(asset_id = %self.id, channel = index, "Channel already playing, fade-in skipped");
            return Ok(false);
        }

        self.channels[index].cancel_envelope();
        let target = request.volume.unwrap_or(self.volume);
        let duration = handle.duration();

        handle.set_looping(false)?;
        handle.seek(clamp_position(request.time, duration))?;
        handle.set_volume(if request.fade_in.is_some() { 0.0 } else { target })?;
        handle.play()?;

        self.active = Some(index);
        self.play_index = (index + 1) % self.channels.len();
        self.transient.dispatched_complete = false;
        self.transient.volume_before_pause = None;
        debug!(asset_id = %self.id, channel = index, volume = target, "Channel started");

        if let Some(fade_in) = request.fade_in {
            let plan = FadePlan::linear(0.0, target, fade_in, shared.config.fade_step);
            self.run_fade(index, plan, target, FadeCompletion::Hold, shared);
        }

        self.arm_fade_out(request.fade_out, duration);
        self.start_ticks(shared);
        Ok(true)
    }

    /// Halt everything silently, then repeat the next round-robin channel.
    pub(crate) fn loop_play(&mut self, shared: &Shared) -> Result<()> {
        self.cancel_pending_play();
        for slot in &mut self.channels {
            slot.cancel_envelope();
            if let Err(e) = slot.handle.stop() {
                warn!(asset_id = %self.id, "Failed to halt channel before loop: {}", e);
            }
        }
        self.transient.scheduled_fade_out = None;
        self.transient.volume_before_pause = None;

        let index = self.play_index;
        let handle = Arc::clone(&self.channels[index].handle);
        handle.set_volume(self.volume)?;
        handle.set_looping(true)?;
        handle.play()?;

        self.active = Some(index);
        self.play_index = (index + 1) % self.channels.len();
        self.transient.dispatched_complete = false;
        debug!(asset_id = %self.id, channel = index, "Looping");

        self.start_ticks(shared);
        Ok(())
    }

    pub(crate) fn pause(&mut self, fade: Option<Duration>, shared: &Shared) -> Result<bool> {
        let index = self.selected();
        let handle = Arc::clone(&self.channels[index].handle);

        if handle.is_playing() {
            if self.transient.volume_before_pause.is_none() {
                self.transient.volume_before_pause = Some(self.channels[index].settled_volume());
            }

            if let Some(duration) = fade {
                let plan = FadePlan::linear(handle.volume(), 0.0, duration, shared.config.fade_step);
                return Ok(self.run_fade(index, plan, 0.0, FadeCompletion::Pause, shared));
            }
        }

        self.channels[index].cancel_envelope();
        handle.pause()?;
        self.stop_ticks();
        Ok(true)
    }

    pub(crate) fn resume(&mut self, fade: Option<Duration>, shared: &Shared) -> Result<()> {
        let index = self.selected();
        let handle = Arc::clone(&self.channels[index].handle);
        self.channels[index].cancel_envelope();

        let target = self
            .transient
            .volume_before_pause
            .take()
            .unwrap_or_else(|| handle.volume());

        handle.set_volume(if fade.is_some() { 0.0 } else { target })?;
        handle.play()?;

        self.active = Some(index);
        self.transient.dispatched_complete = false;
        debug!(asset_id = %self.id, channel = index, volume = target, "Resumed");

        if let Some(duration) = fade {
            let plan = FadePlan::linear(0.0, target, duration, shared.config.fade_step);
            self.run_fade(index, plan, target, FadeCompletion::Hold, shared);
        }

        self.start_ticks(shared);
        Ok(())
    }

    pub(crate) fn stop(&mut self, fade: Option<Duration>, shared: &Shared) -> bool {
        self.cancel_pending_play();

        if let Some(duration) = fade {
            let index = self.selected();
            let handle = Arc::clone(&self.channels[index].handle);
            if handle.is_playing() {
                self.transient.scheduled_fade_out = None;
                let plan = FadePlan::linear(handle.volume(), 0.0, duration, shared.config.fade_step);
                return self.run_fade(index, plan, 0.0, FadeCompletion::Stop, shared);
            }
        }

        self.stop_now(shared);
        true
    }

    /// Stop every channel, restore the initial volume and dispatch `complete`.
    fn stop_now(&mut self, shared: &Shared) {
        for slot in &mut self.channels {
            slot.cancel_envelope();
            if let Err(e) = slot.handle.stop() {
                warn!(asset_id = %self.id, "Failed to stop channel: {}", e);
            }
            if let Err(e) = slot.handle.set_volume(self.initial_volume) {
                warn!(asset_id = %self.id, "Failed to reset channel volume: {}", e);
            }
        }

        self.volume = self.initial_volume;
        self.transient.volume_before_pause = None;
        self.transient.scheduled_fade_out = None;
        self.stop_ticks();
        self.dispatch_complete(shared);
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    /// Set the baseline on every channel; ramp only the audible one.
    pub(crate) fn set_volume(
        &mut self,
        volume: f32,
        fade: Option<Duration>,
        shared: &Shared,
    ) -> Result<()> {
        self.volume = volume;
        if self.transient.volume_before_pause.is_some() {
            self.transient.volume_before_pause = Some(volume);
        }

        let selected = self.selected();
        let audible = self.channels[selected]
            .handle
            .is_playing()
            .then_some(selected);
        let ramped = audible.filter(|_| fade.is_some());

        let mut first_error = None;
        for (index, slot) in self.channels.iter_mut().enumerate() {
            if Some(index) == ramped {
                continue;
            }
            slot.cancel_envelope();
            if let Err(e) = slot.handle.set_volume(volume) {
                warn!(asset_id = %self.id, channel = index, "Failed to set volume: {}", e);
                first_error.get_or_insert(e);
            }
        }

        if let (Some(index), Some(duration)) = (ramped, fade) {
            let config = &shared.config;
            let plan = FadePlan::exponential(
                self.channels[index].handle.volume(),
                volume,
                duration,
                config.fade_step,
                config.zero_volume,
                config.max_volume,
            );
            self.run_fade(index, plan, volume, FadeCompletion::Hold, shared);
        }
        first_error.map_or(Ok(()), |e| Err(e.into()))
    }

    /// Apply `rate` to every channel, reporting the first failure afterwards.
    pub(crate) fn set_rate(&mut self, rate: f32) -> Result<()> {
        let mut first_error = None;
        for (index, slot) in self.channels.iter().enumerate() {
            if let Err(e) = slot.handle.set_rate(rate) {
                warn!(asset_id = %self.id, channel = index, "Failed to set rate: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), |e| Err(e.into()))
    }

    pub(crate) fn seek(&mut self, time: Duration) -> Result<()> {
        let handle = self.selected_handle();
        handle.seek(clamp_position(time, handle.duration()))?;
        Ok(())
    }

    // ========================================================================
    // Envelopes
    // ========================================================================

    /// Start `plan` on a channel, or apply `target` at once when the fade is
    /// shorter than one step.
    fn run_fade(
        &mut self,
        index: usize,
        plan: Option<FadePlan>,
        target: f32,
        completion: FadeCompletion,
        shared: &Shared,
    ) -> bool {
        self.channels[index].cancel_envelope();

        let Some(plan) = plan else {
            if let Err(e) = self.channels[index].handle.set_volume(target) {
                warn!(asset_id = %self.id, channel = index, "Failed to apply volume: {}", e);
            }
            return self.complete_fade(index, completion, shared);
        };

        let plan = plan.with_completion(completion);
        let token = self.lifetime.child_token();
        self.channels[index].envelope = Some(Envelope {
            token: token.clone(),
            plan,
        });
        trace!(asset_id = %self.id, channel = index, steps = plan.steps(), "Fade started");
        self.schedule_envelope_step(index, 1, token, plan.interval(), shared);
        false
    }

    fn schedule_envelope_step(
        &self,
        index: usize,
        step: u32,
        token: CancellationToken,
        delay: Duration,
        shared: &Shared,
    ) {
        let id = self.id.clone();
        shared.scheduler.schedule(delay, token, move |registry, shared| {
            registry.envelope_step(&id, index, step, shared)
        });
    }

    pub(crate) fn envelope_step(&mut self, index: usize, step: u32, shared: &Shared) -> bool {
        let Some(slot) = self.channels.get_mut(index) else {
            return false;
        };
        let Some(envelope) = slot.envelope.as_ref() else {
            return false;
        };
        let plan = envelope.plan;
        let token = envelope.token.clone();

        if let Err(e) = slot.handle.set_volume(plan.volume_at(step)) {
            warn!(asset_id = %self.id, channel = index, "Fade step failed: {}", e);
            slot.cancel_envelope();
            return false;
        }

        if step < plan.steps() {
            self.schedule_envelope_step(index, step + 1, token, plan.interval(), shared);
            return false;
        }

        slot.envelope = None;
        self.complete_fade(index, plan.completion(), shared)
    }

    /// Side effects of a finished fade. Skipped when the channel is no longer
    /// sounding; a channel superseded by a newer voice is settled on its own.
    fn complete_fade(&mut self, index: usize, completion: FadeCompletion, shared: &Shared) -> bool {
        if completion == FadeCompletion::Hold {
            return false;
        }

        let handle = Arc::clone(&self.channels[index].handle);
        if !handle.is_playing() {
            debug!(asset_id = %self.id, channel = index, "Fade finished on an idle channel");
            return false;
        }

        if self.active != Some(index) {
            // A newer voice owns the asset state; only this channel is settled.
            self.settle_superseded(index, completion, shared);
            return true;
        }

        match completion {
            FadeCompletion::Pause => {
                if let Err(e) = handle.pause() {
                    warn!(asset_id = %self.id, "Failed to pause after fade: {}", e);
                }
                self.stop_ticks();
            }
            FadeCompletion::Stop => self.stop_now(shared),
            FadeCompletion::Hold => {}
        }
        true
    }

    /// Pause or stop a channel that faded out after another one started.
    fn settle_superseded(&self, index: usize, completion: FadeCompletion, shared: &Shared) {
        let handle = Arc::clone(&self.channels[index].handle);
        let result = match completion {
            FadeCompletion::Pause => handle.pause(),
            FadeCompletion::Stop => handle
                .stop()
                .and_then(|()| handle.set_volume(self.volume)),
            FadeCompletion::Hold => Ok(()),
        };
        if let Err(e) = result {
            warn!(asset_id = %self.id, channel = index, "Failed to settle faded channel: {}", e);
        }

        if completion == FadeCompletion::Stop {
            // Each stop completes once, independent of the newer play.
            debug!(asset_id = %self.id, channel = index, "Superseded stop completed");
            shared.emit(AudioEvent::Complete {
                asset_id: self.id.clone(),
            });
        }
    }

    fn arm_fade_out(&mut self, request: Option<FadeOutRequest>, duration: MediaDuration) {
        self.transient.scheduled_fade_out = None;
        let Some(request) = request else {
            return;
        };
        let Some(total) = duration.known() else {
            debug!(asset_id = %self.id, "No finite duration, scheduled fade-out skipped");
            return;
        };

        let start = request
            .start
            .unwrap_or_else(|| total.saturating_sub(request.duration));
        self.transient.scheduled_fade_out = Some(ScheduledFadeOut {
            start,
            duration: request.duration,
        });
        debug!(asset_id = %self.id, start = ?start, "Fade-out armed");
    }

    // ========================================================================
    // Ticks and completion
    // ========================================================================

    fn start_ticks(&mut self, shared: &Shared) {
        self.stop_ticks();
        let token = self.lifetime.child_token();
        self.transient.tick = Some(token.clone());
        self.schedule_tick(token, shared);
    }

    fn stop_ticks(&mut self) {
        if let Some(token) = self.transient.tick.take() {
            token.cancel();
        }
    }

    fn schedule_tick(&self, token: CancellationToken, shared: &Shared) {
        let id = self.id.clone();
        shared
            .scheduler
            .schedule(shared.config.time_update_interval, token, move |registry, shared| {
                registry.tick(&id, shared)
            });
    }

    pub(crate) fn tick(&mut self, shared: &Shared) -> bool {
        let Some(token) = self.transient.tick.clone() else {
            return false;
        };
        let Some(index) = self.active else {
            self.stop_ticks();
            return false;
        };

        let handle = Arc::clone(&self.channels[index].handle);
        if !handle.is_playing() {
            self.stop_ticks();
            return false;
        }

        let position = handle.current_time();
        shared.emit(AudioEvent::CurrentTime {
            asset_id: self.id.clone(),
            current_time: round_to_tenth(position.as_secs_f64()),
        });

        if let Some(fade_out) = self.transient.scheduled_fade_out {
            if position >= fade_out.start {
                self.transient.scheduled_fade_out = None;
                debug!(asset_id = %self.id, position = ?position, "Scheduled fade-out started");
                let plan =
                    FadePlan::linear(handle.volume(), 0.0, fade_out.duration, shared.config.fade_step);
                if self.run_fade(index, plan, 0.0, FadeCompletion::Stop, shared) {
                    return true;
                }
            }
        }

        self.schedule_tick(token, shared);
        false
    }

    /// Natural end of a channel. Only the active channel completes the asset.
    pub(crate) fn channel_ended(&mut self, index: usize, shared: &Shared) -> bool {
        if self.active != Some(index) {
            trace!(asset_id = %self.id, channel = index, "Overlapping channel ended");
            return false;
        }

        let slot = &mut self.channels[index];
        if slot.handle.is_playing() {
            // Restarted before the notification was processed.
            return false;
        }
        slot.cancel_envelope();

        self.transient.scheduled_fade_out = None;
        self.stop_ticks();
        self.dispatch_complete(shared);
        true
    }

    fn dispatch_complete(&mut self, shared: &Shared) {
        if self.transient.dispatched_complete {
            return;
        }
        self.transient.dispatched_complete = true;
        debug!(asset_id = %self.id, "Dispatching complete");
        shared.emit(AudioEvent::Complete {
            asset_id: self.id.clone(),
        });
    }

    /// Cancel all scheduled work and release every channel.
    pub(crate) fn unload(&mut self) {
        self.lifetime.cancel();
        for slot in &mut self.channels {
            slot.envelope = None;
            slot.handle.set_on_ended(None);
            if let Err(e) = slot.handle.stop() {
                warn!(asset_id = %self.id, "Failed to stop channel on unload: {}", e);
            }
            if let Err(e) = slot.handle.release() {
                warn!(asset_id = %self.id, "Failed to release channel: {}", e);
            }
        }
        self.transient = Transient::default();
        self.active = None;
    }
}

fn clamp_position(time: Duration, duration: MediaDuration) -> Duration {
    match duration.known() {
        Some(total) => time.min(total),
        None => time,
    }
}

fn round_to_tenth(seconds: f64) -> f64 {
    (seconds * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(1.24), 1.2);
        assert_eq!(round_to_tenth(1.25), 1.3);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }

    #[test]
    fn test_clamp_position() {
        let total = MediaDuration::Known(Duration::from_secs(3));
        assert_eq!(clamp_position(Duration::from_secs(5), total), Duration::from_secs(3));
        assert_eq!(clamp_position(Duration::from_secs(1), total), Duration::from_secs(1));
        assert_eq!(
            clamp_position(Duration::from_secs(5), MediaDuration::Streaming),
            Duration::from_secs(5)
        );
    }
}
