//! Time-based work that re-enters the registry.
//!
//! Every delayed play, envelope step, current-time tick and end-of-playback
//! notification is a job: sleep, then take the registry write lock, then
//! re-check the job's token, then mutate. Cancellation always happens while
//! the write lock is held, so a job that passes the check is still current.

use crate::manager::Shared;
use crate::registry::Registry;
use core_async::runtime::Handle;
use core_async::select;
use core_async::sync::CancellationToken;
use core_async::time::{sleep, Duration};
use std::sync::Weak;
use tracing::trace;

#[derive(Clone)]
pub(crate) struct Scheduler {
    shared: Weak<Shared>,
    runtime: Handle,
}

impl Scheduler {
    pub(crate) fn new(shared: Weak<Shared>, runtime: Handle) -> Self {
        Self { shared, runtime }
    }

    /// Run `job` after `delay` unless `token` is cancelled first.
    ///
    /// Safe to call from threads outside the runtime.
    pub(crate) fn schedule<F>(&self, delay: Duration, token: CancellationToken, job: F)
    where
        F: FnOnce(&mut Registry, &Shared) + Send + 'static,
    {
        let shared = self.shared.clone();
        self.runtime.spawn(async move {
            select! {
                _ = token.cancelled() => return,
                _ = sleep(delay) => {}
            }

            let Some(shared) = shared.upgrade() else {
                trace!("Manager dropped before scheduled job ran");
                return;
            };

            let mut registry = shared.registry.write().await;
            if token.is_cancelled() {
                return;
            }
            job(&mut registry, &shared);
        });
    }
}
