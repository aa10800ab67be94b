//! Task spawning abstractions.
//!
//! Thin wrappers over `tokio::task` so downstream crates do not name Tokio
//! directly.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! async fn example() {
//!     let handle = task::spawn(async { 42 });
//!     assert_eq!(handle.await.unwrap(), 42);
//!
//!     // Blocking work (file probing, decoding) goes to the blocking pool.
//!     let probed = task::spawn_blocking(|| 7).await.unwrap();
//!     assert_eq!(probed, 7);
//! }
//! ```

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the current Tokio runtime.
///
/// The spawned task may run on a different thread.
///
/// # Panics
///
/// Panics when called outside of a Tokio runtime. Callers that may run on a
/// foreign thread should capture a [`Handle`](crate::runtime::Handle) up front
/// and spawn through it instead.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
