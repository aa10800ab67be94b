//! # Event Bus System
//!
//! Broadcasts audio lifecycle events to host listeners using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **AudioEvent**: `complete`, `currentTime` and `interrupt` notifications
//! - **EventBus**: Central broadcast channel owned by the audio manager
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐    emit     ┌───────────┐
//! │ Audio assets ├────────────>│           │    subscribe    ┌────────────┐
//! └──────────────┘             │ EventBus  ├────────────────>│  Listener  │
//! ┌──────────────┐    emit     │ (broadcast│                 └────────────┘
//! │Session policy├────────────>│  channel) │
//! └──────────────┘             └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{AudioEvent, EventBus, EventStream};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = EventStream::new(bus.subscribe()).for_asset("click");
//!
//! bus.emit(AudioEvent::Complete { asset_id: "click".to_string() }).ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.asset_id(), Some("click"));
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. `currentTime`
//!   events arrive every 100 ms per playing asset, so slow listeners should
//!   expect this and keep reading.
//! - **`RecvError::Closed`**: the manager was dropped.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Audio Event Types
// ============================================================================

/// Events emitted by the audio manager.
///
/// Serializes as `{"event": "complete", "assetId": ...}` so a host bridge can
/// forward it to JavaScript/Swift/Kotlin listeners unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum AudioEvent {
    /// Playback of an asset finished, naturally or through `stop`.
    #[serde(rename_all = "camelCase")]
    Complete { asset_id: String },
    /// Periodic position report, rounded to one decimal.
    #[serde(rename_all = "camelCase")]
    CurrentTime { asset_id: String, current_time: f64 },
    /// The shared session was interrupted or became available again.
    #[serde(rename_all = "camelCase")]
    Interrupt {
        interrupted: bool,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        should_resume: Option<bool>,
    },
}

impl AudioEvent {
    /// The asset this event refers to, if any.
    pub fn asset_id(&self) -> Option<&str> {
        match self {
            AudioEvent::Complete { asset_id } | AudioEvent::CurrentTime { asset_id, .. } => {
                Some(asset_id)
            }
            AudioEvent::Interrupt { .. } => None,
        }
    }

    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            AudioEvent::Complete { .. } => "Playback completed",
            AudioEvent::CurrentTime { .. } => "Playback position update",
            AudioEvent::Interrupt {
                interrupted: true, ..
            } => "Audio session interrupted",
            AudioEvent::Interrupt { .. } => "Audio session interruption ended",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            AudioEvent::Interrupt {
                interrupted: true, ..
            } => EventSeverity::Warning,
            AudioEvent::Complete { .. } | AudioEvent::Interrupt { .. } => EventSeverity::Info,
            AudioEvent::CurrentTime { .. } => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for audio events.
///
/// Cloning an `EventBus` yields another sender onto the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AudioEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    ///   When a subscriber falls behind by more than this amount, it will
    ///   receive a `RecvError::Lagged` error.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// Returns an error if there are no active subscribers.
    pub fn emit(&self, event: AudioEvent) -> Result<usize, SendError<AudioEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Each call creates an independent receiver that will receive all future events.
    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<AudioEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&AudioEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with additional filtering capabilities.
pub struct EventStream {
    receiver: Receiver<AudioEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<AudioEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter function to this stream.
    ///
    /// Only events that match the filter will be returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AudioEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Restricts the stream to events about one asset.
    pub fn for_asset(self, asset_id: impl Into<String>) -> Self {
        let asset_id = asset_id.into();
        self.filter(move |event| event.asset_id() == Some(asset_id.as_str()))
    }

    fn accepts(&self, event: &AudioEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<AudioEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<AudioEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every event currently buffered that passes the filter.
    ///
    /// Lag notifications are skipped.
    pub fn drain(&mut self) -> Vec<AudioEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(asset_id: &str) -> AudioEvent {
        AudioEvent::Complete {
            asset_id: asset_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(complete("click")).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = AudioEvent::CurrentTime {
            asset_id: "bgm".to_string(),
            current_time: 1.2,
        };
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_for_asset() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe()).for_asset("bgm");

        bus.emit(complete("click")).ok();
        bus.emit(AudioEvent::Interrupt {
            interrupted: true,
            should_resume: None,
        })
        .ok();
        bus.emit(complete("bgm")).ok();

        assert_eq!(stream.recv().await.unwrap(), complete("bgm"));
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_event_stream_drain() {
        let bus = EventBus::new(10);
        let mut stream =
            EventStream::new(bus.subscribe()).filter(|e| matches!(e, AudioEvent::Complete { .. }));

        bus.emit(complete("a")).ok();
        bus.emit(AudioEvent::CurrentTime {
            asset_id: "a".to_string(),
            current_time: 0.1,
        })
        .ok();
        bus.emit(complete("b")).ok();

        assert_eq!(stream.drain(), vec![complete("a"), complete("b")]);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut stream = EventStream::new(bus.subscribe());

        for i in 0..5 {
            bus.emit(complete(&format!("asset-{i}"))).ok();
        }

        assert!(matches!(stream.try_recv(), Some(Err(RecvError::Lagged(_)))));
        assert_eq!(stream.drain().len(), 2);
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(AudioEvent::CurrentTime {
            asset_id: "bgm".to_string(),
            current_time: 2.5,
        })
        .unwrap();
        assert_eq!(json["event"], "currentTime");
        assert_eq!(json["assetId"], "bgm");
        assert_eq!(json["currentTime"], 2.5);

        let json = serde_json::to_value(AudioEvent::Interrupt {
            interrupted: true,
            should_resume: None,
        })
        .unwrap();
        assert_eq!(json["interrupted"], true);
        assert!(json.get("shouldResume").is_none());

        let json = serde_json::to_value(AudioEvent::Interrupt {
            interrupted: false,
            should_resume: Some(true),
        })
        .unwrap();
        assert_eq!(json["shouldResume"], true);
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(complete("a").severity(), EventSeverity::Info);
        assert_eq!(
            AudioEvent::Interrupt {
                interrupted: true,
                should_resume: None
            }
            .severity(),
            EventSeverity::Warning
        );
        assert_eq!(
            AudioEvent::Interrupt {
                interrupted: false,
                should_resume: Some(true)
            }
            .severity(),
            EventSeverity::Info
        );
        assert_eq!(
            AudioEvent::CurrentTime {
                asset_id: "a".to_string(),
                current_time: 0.0
            }
            .severity(),
            EventSeverity::Debug
        );
        assert_eq!(
            AudioEvent::CurrentTime {
                asset_id: "a".to_string(),
                current_time: 0.0
            }
            .description(),
            "Playback position update"
        );
    }
}
