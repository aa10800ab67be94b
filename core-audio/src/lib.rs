//! # Audio Asset Core
//!
//! Platform-independent asset manager for short effects and background music.
//!
//! ## Overview
//!
//! This crate handles:
//! - Asset lifecycle: preload, play/pause/resume/stop/loop, unload
//! - Polyphony through round-robin channel pools
//! - Linear and exponential volume envelopes driven one step per scheduled job
//! - Periodic `currentTime` notifications and scheduled fade-outs
//! - Cancellable delayed play
//! - Shared output session activation
//!
//! Platforms plug in through [`bridge_traits::ChannelFactory`] and
//! [`bridge_traits::AudioSession`]; events flow out through
//! [`core_runtime::events::EventStream`].

mod asset;
pub mod envelope;
pub mod error;
mod manager;
pub mod options;
mod registry;
mod scheduler;
mod session;

pub use error::{AudioError, Result};
pub use manager::AudioManager;
pub use options::{
    ConfigureOptions, CurrentTime, DurationInfo, Found, IsPlaying, PauseOptions, PlayOptions,
    PreloadOptions, ResumeOptions, SetCurrentTimeOptions, SetRateOptions, SetVolumeOptions,
    StopOptions,
};
pub use session::SessionState;

pub use core_runtime::events::{AudioEvent, EventStream};
