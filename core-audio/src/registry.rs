//! Asset registry and the entry points of scheduled jobs.
//!
//! Only fully constructed assets are inserted. Scheduled jobs look their asset
//! up again by id; a missing entry means it was unloaded and the job is a no-op.

use crate::asset::AudioAsset;
use crate::error::{AudioError, Result};
use crate::manager::Shared;
use crate::options::PlayRequest;
use std::collections::HashMap;
use tracing::warn;

#[derive(Default)]
pub(crate) struct Registry {
    assets: HashMap<String, AudioAsset>,
}

impl Registry {
    pub(crate) fn contains(&self, asset_id: &str) -> bool {
        self.assets.contains_key(asset_id)
    }

    pub(crate) fn get(&self, asset_id: &str) -> Result<&AudioAsset> {
        self.assets
            .get(asset_id)
            .ok_or_else(|| AudioError::NotFound(asset_id.to_string()))
    }

    pub(crate) fn get_mut(&mut self, asset_id: &str) -> Result<&mut AudioAsset> {
        self.assets
            .get_mut(asset_id)
            .ok_or_else(|| AudioError::NotFound(asset_id.to_string()))
    }

    pub(crate) fn insert(&mut self, asset: AudioAsset) {
        self.assets.insert(asset.id().to_string(), asset);
    }

    pub(crate) fn remove(&mut self, asset_id: &str) -> Result<AudioAsset> {
        self.assets
            .remove(asset_id)
            .ok_or_else(|| AudioError::NotFound(asset_id.to_string()))
    }

    /// Registered ids in lexical order.
    pub(crate) fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.assets.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub(crate) fn any_playing(&self) -> bool {
        self.assets.values().any(AudioAsset::any_channel_playing)
    }

    /// Release the session if output went silent everywhere.
    pub(crate) fn settle_session(&self, shared: &Shared) {
        shared.session.deactivate_if_idle(self.any_playing());
    }

    // ========================================================================
    // Scheduled jobs
    // ========================================================================

    pub(crate) fn run_delayed_play(&mut self, asset_id: &str, request: PlayRequest, shared: &Shared) {
        let Some(asset) = self.assets.get_mut(asset_id) else {
            return;
        };
        asset.clear_pending_play();

        match asset.play(&request, shared) {
            Ok(true) => shared.session.activate(),
            Ok(false) => {}
            Err(e) => warn!(asset_id, "Delayed play failed: {}", e),
        }
    }

    pub(crate) fn envelope_step(&mut self, asset_id: &str, channel: usize, step: u32, shared: &Shared) {
        let silenced = match self.assets.get_mut(asset_id) {
            Some(asset) => asset.envelope_step(channel, step, shared),
            None => return,
        };
        if silenced {
            self.settle_session(shared);
        }
    }

    pub(crate) fn tick(&mut self, asset_id: &str, shared: &Shared) {
        let silenced = match self.assets.get_mut(asset_id) {
            Some(asset) => asset.tick(shared),
            None => return,
        };
        if silenced {
            self.settle_session(shared);
        }
    }

    pub(crate) fn channel_ended(&mut self, asset_id: &str, channel: usize, shared: &Shared) {
        let silenced = match self.assets.get_mut(asset_id) {
            Some(asset) => asset.channel_ended(channel, shared),
            None => return,
        };
        if silenced {
            self.settle_session(shared);
        }
    }
}
