//! App lifecycle signals.

use serde::{Deserialize, Serialize};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Application is in the foreground and active
    Foreground,
    /// Application is in the background
    Background,
    /// Application is being suspended
    Suspended,
}

impl LifecycleState {
    /// `true` once the app is no longer in the foreground.
    pub fn is_backgrounded(&self) -> bool {
        !matches!(self, LifecycleState::Foreground)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backgrounded_states() {
        assert!(!LifecycleState::Foreground.is_backgrounded());
        assert!(LifecycleState::Background.is_backgrounded());
        assert!(LifecycleState::Suspended.is_backgrounded());
    }
}
