//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the audio core:
//! - Logging and tracing infrastructure
//! - Configuration of timing constants and limits
//! - Event bus for `complete`, `currentTime` and `interrupt` notifications
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the audio core depends on. It
//! establishes the logging conventions and the event broadcasting mechanism
//! used to surface asset lifecycle events to host listeners.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
