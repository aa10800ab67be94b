//! Desktop audio session.
//!
//! Desktop operating systems have no app-level output session to negotiate, so
//! this implementation only records what the core asked for. Hosts and tests
//! can inspect it to verify activation behavior.

use bridge_traits::{
    error::Result,
    session::{AudioSession, SessionOptions},
};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
struct SessionRecord {
    active: bool,
    activations: u32,
    deactivations: u32,
    options: Option<SessionOptions>,
}

/// Recording no-op session for desktop hosts.
#[derive(Debug, Default)]
pub struct DesktopAudioSession {
    record: Mutex<SessionRecord>,
}

impl DesktopAudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.record.lock().active
    }

    /// Number of inactive-to-active transitions seen so far.
    pub fn activation_count(&self) -> u32 {
        self.record.lock().activations
    }

    pub fn deactivation_count(&self) -> u32 {
        self.record.lock().deactivations
    }

    /// Options passed to the last successful `configure`.
    pub fn options(&self) -> Option<SessionOptions> {
        self.record.lock().options
    }
}

impl AudioSession for DesktopAudioSession {
    fn configure(&self, options: &SessionOptions) -> Result<()> {
        debug!(?options, "Configuring desktop audio session");
        self.record.lock().options = Some(*options);
        Ok(())
    }

    fn set_active(&self, active: bool) -> Result<()> {
        let mut record = self.record.lock();
        if record.active != active {
            if active {
                record.activations += 1;
            } else {
                record.deactivations += 1;
            }
            record.active = active;
            debug!(active, "Desktop audio session toggled");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_transitions_only() {
        let session = DesktopAudioSession::new();
        session.set_active(true).unwrap();
        session.set_active(true).unwrap();
        session.set_active(false).unwrap();

        assert!(!session.is_active());
        assert_eq!(session.activation_count(), 1);
        assert_eq!(session.deactivation_count(), 1);
    }

    #[test]
    fn test_configure_records_options() {
        let session = DesktopAudioSession::new();
        let options = SessionOptions {
            background: true,
            ..Default::default()
        };

        session.configure(&options).unwrap();
        assert_eq!(session.options(), Some(options));
        assert!(!session.is_other_audio_playing());
    }
}
