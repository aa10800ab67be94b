//! Runtime utilities.
//!
//! Platform callbacks (end-of-playback notifications, for instance) may arrive
//! on threads that are not part of the runtime. Components that need to spawn
//! from such callbacks capture a [`Handle`] while they are still inside the
//! runtime.

pub use tokio::runtime::{Builder, Handle, Runtime, TryCurrentError};

/// Returns a handle to the runtime driving the current task, if any.
pub fn current_handle() -> Option<Handle> {
    Handle::try_current().ok()
}

/// Runs the provided future to completion on a fresh current-thread runtime.
///
/// Returns an error when the runtime cannot be built.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}
