//! Shared output session policy.
//!
//! Tracks whether this process currently holds the platform session and
//! toggles it from the aggregate "anything playing" predicate computed by the
//! registry. Activation is skipped while another application is playing so
//! co-existing audio is not interrupted.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::session::{AudioSession, SessionOptions};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Inactive,
}

pub(crate) struct SessionPolicy {
    session: Arc<dyn AudioSession>,
    state: Mutex<SessionState>,
}

impl SessionPolicy {
    pub(crate) fn new(session: Arc<dyn AudioSession>) -> Self {
        Self {
            session,
            state: Mutex::new(SessionState::Inactive),
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub(crate) fn configure(&self, options: &SessionOptions) -> BridgeResult<()> {
        self.session.configure(options)
    }

    /// Take the session after output started. Idempotent.
    pub(crate) fn activate(&self) {
        let mut state = self.state.lock();
        if *state == SessionState::Active {
            return;
        }
        if self.session.is_other_audio_playing() {
            debug!("Other audio is playing, leaving session untouched");
            return;
        }

        match self.session.set_active(true) {
            Ok(()) => {
                *state = SessionState::Active;
                debug!("Audio session activated");
            }
            Err(e) => warn!("Failed to activate audio session: {}", e),
        }
    }

    /// Release the session unless some asset is still playing.
    pub(crate) fn deactivate_if_idle(&self, any_playing: bool) {
        let mut state = self.state.lock();
        if any_playing || *state == SessionState::Inactive {
            return;
        }

        match self.session.set_active(false) {
            Ok(()) => debug!("Audio session deactivated"),
            Err(e) => warn!("Failed to deactivate audio session: {}", e),
        }
        *state = SessionState::Inactive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::BridgeError;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        Session {}

        impl AudioSession for Session {
            fn configure(&self, options: &SessionOptions) -> BridgeResult<()>;
            fn set_active(&self, active: bool) -> BridgeResult<()>;
            fn is_other_audio_playing(&self) -> bool;
        }
    }

    #[test]
    fn test_activate_once() {
        let mut session = MockSession::new();
        session.expect_is_other_audio_playing().times(1).return_const(false);
        session
            .expect_set_active()
            .with(eq(true))
            .times(1)
            .returning(|_| Ok(()));

        let policy = SessionPolicy::new(Arc::new(session));
        policy.activate();
        policy.activate();
        assert_eq!(policy.state(), SessionState::Active);
    }

    #[test]
    fn test_activation_skipped_when_other_audio_plays() {
        let mut session = MockSession::new();
        session.expect_is_other_audio_playing().return_const(true);
        session.expect_set_active().never();

        let policy = SessionPolicy::new(Arc::new(session));
        policy.activate();
        assert_eq!(policy.state(), SessionState::Inactive);
    }

    #[test]
    fn test_deactivate_waits_for_idle() {
        let mut session = MockSession::new();
        session.expect_is_other_audio_playing().return_const(false);
        session
            .expect_set_active()
            .with(eq(true))
            .times(1)
            .returning(|_| Ok(()));
        session
            .expect_set_active()
            .with(eq(false))
            .times(1)
            .returning(|_| Ok(()));

        let policy = SessionPolicy::new(Arc::new(session));
        policy.activate();

        policy.deactivate_if_idle(true);
        assert_eq!(policy.state(), SessionState::Active);

        policy.deactivate_if_idle(false);
        policy.deactivate_if_idle(false);
        assert_eq!(policy.state(), SessionState::Inactive);
    }

    #[test]
    fn test_failed_activation_stays_inactive() {
        let mut session = MockSession::new();
        session.expect_is_other_audio_playing().return_const(false);
        session
            .expect_set_active()
            .returning(|_| Err(BridgeError::OperationFailed("busy".into())));

        let policy = SessionPolicy::new(Arc::new(session));
        policy.activate();
        assert_eq!(policy.state(), SessionState::Inactive);
    }
}
