//! Runtime facade for the native audio core.
//!
//! Every `core-*` and `bridge-*` crate reaches the async runtime through this
//! crate instead of depending on Tokio directly. Keeping the surface in one
//! place means the scheduler, the headless channels and the tests all agree on
//! one clock, which matters once Tokio's paused test clock is in play.
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Sleep, timeouts and the runtime-aware `Instant`
//! - `sync`: Locks, channels and `CancellationToken`
//! - `runtime`: Runtime handles for callbacks arriving on foreign threads
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let token = CancellationToken::new();
//!     let child = token.child_token();
//!
//!     let handle = core_async::spawn(async move {
//!         core_async::select! {
//!             _ = child.cancelled() => false,
//!             _ = sleep(Duration::from_secs(1)) => true,
//!         }
//!     });
//!
//!     token.cancel();
//!     assert!(!handle.await.unwrap());
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

// Re-export commonly used items at crate root for convenience
pub use task::spawn;
pub use time::{sleep, Duration, Instant};
pub use tokio::select;
