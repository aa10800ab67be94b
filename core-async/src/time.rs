//! Time-related abstractions.
//!
//! `Instant` is Tokio's instant rather than `std::time::Instant`: it follows
//! the runtime clock, so code measuring playback position advances together
//! with `sleep` when a test pauses and auto-advances time.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(80)).await;
//!     assert!(start.elapsed() >= Duration::from_millis(80));
//! }
//! ```

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};
pub use tokio::time::{
    error::Elapsed, interval, sleep, sleep_until, timeout, Instant, Interval, Sleep, Timeout,
};

/// Converts a caller-supplied number of seconds into a `Duration`.
///
/// Negative, NaN and infinite inputs collapse to zero so option values coming
/// from a host bridge can never panic the conversion.
pub fn secs_f64(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_f64_clamps_invalid_input() {
        assert_eq!(secs_f64(1.5), Duration::from_millis(1500));
        assert_eq!(secs_f64(0.0), Duration::ZERO);
        assert_eq!(secs_f64(-2.0), Duration::ZERO);
        assert_eq!(secs_f64(f64::NAN), Duration::ZERO);
        assert_eq!(secs_f64(f64::INFINITY), Duration::ZERO);
    }
}
