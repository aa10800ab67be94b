//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the audio core and platform-specific
//! playback engines. The asset state machine, fade envelopes and session policy
//! live once in `core-audio`; every backend only supplies the primitives below.
//!
//! ## Traits
//!
//! ### Playback
//! - [`ChannelHandle`](channel::ChannelHandle) - One playable voice (play/pause/seek/gain/rate)
//! - [`ChannelFactory`](channel::ChannelFactory) - Builds channels from an [`AudioSource`](channel::AudioSource)
//!
//! ### Platform Integration
//! - [`AudioSession`](session::AudioSession) - Shared output session activation
//! - [`LifecycleState`](lifecycle::LifecycleState) - App foreground/background transitions
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Headless channels + symphonia probing |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should convert their native errors and include context such
//! as the offending path or URL.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. End-of-playback callbacks in
//! particular may fire on platform threads outside the async runtime.

pub mod channel;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod session;

pub use error::BridgeError;

// Re-export commonly used types
pub use channel::{AudioSource, ChannelFactory, ChannelHandle, EndedCallback, MediaDuration};
pub use lifecycle::LifecycleState;
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use session::{AudioSession, InterruptionEvent, SessionOptions};
