//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides implementations of the playback bridge traits that run
//! without a native audio stack:
//! - `ChannelFactory` as [`DesktopChannelFactory`], resolving bundled resources
//!   against an asset root and probing file lengths with `symphonia`
//! - `ChannelHandle` as [`HeadlessChannel`], a transport driven by the runtime
//!   clock (position, rate, looping, end-of-media callback)
//! - `AudioSession` as [`DesktopAudioSession`], which records activation
//!
//! ## Feature Flags
//!
//! - `probe`: Read media lengths with symphonia (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopAudioSession, DesktopChannelFactory};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let factory = Arc::new(DesktopChannelFactory::new("./assets"));
//!     let session = Arc::new(DesktopAudioSession::new());
//!
//!     // Hand both to core_audio::AudioManager::new
//! }
//! ```

mod channel;
mod factory;
mod session;

pub use channel::HeadlessChannel;
pub use factory::DesktopChannelFactory;
pub use session::DesktopAudioSession;
