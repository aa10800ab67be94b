//! Synchronization primitives.
//!
//! Re-exports Tokio's async-aware locks and channels plus the cancellation
//! token used for every piece of scheduled work.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{CancellationToken, RwLock};
//!
//! async fn example() {
//!     let lock = RwLock::new(vec![1, 2, 3]);
//!     assert_eq!(lock.read().await.len(), 3);
//!
//!     let parent = CancellationToken::new();
//!     let child = parent.child_token();
//!     parent.cancel();
//!     assert!(child.is_cancelled());
//! }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};
pub use tokio_util::sync::CancellationToken;
