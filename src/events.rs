//! Event types and EventBus
//!
//! Domain events are broadcast via the EventBus and serialized for SSE
//! transmission to connected browser clients. User-facing notifications
//! ride the same bus as [`AppEvent::Notification`] events: fire-and-forget,
//! never blocking the emitter.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Notification severity, mirrored by the client as toast styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// Application event types
///
/// Events are broadcast via EventBus and can be serialized for SSE
/// transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppEvent {
    /// Profile created and durably persisted
    ProfileCreated {
        profile_id: Uuid,
        name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Profile renamed
    ProfileRenamed {
        profile_id: Uuid,
        name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Profile removed, along with all items it owned
    ProfileRemoved {
        profile_id: Uuid,
        /// Dependent items removed by the cascade
        items_removed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Item committed into a profile's collection
    ItemSaved {
        item_id: Uuid,
        profile_id: Uuid,
        product_name: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Item removed by explicit delete
    ItemRemoved {
        item_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A decode produced a barcode; the scan session now awaits a profile
    BarcodeDetected {
        barcode: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Pending scan discarded without a commit
    ScanCancelled {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// User-facing notification (toast)
    Notification {
        title: String,
        detail: String,
        severity: Severity,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl AppEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            AppEvent::ProfileCreated { .. } => "ProfileCreated",
            AppEvent::ProfileRenamed { .. } => "ProfileRenamed",
            AppEvent::ProfileRemoved { .. } => "ProfileRemoved",
            AppEvent::ItemSaved { .. } => "ItemSaved",
            AppEvent::ItemRemoved { .. } => "ItemRemoved",
            AppEvent::BarcodeDetected { .. } => "BarcodeDetected",
            AppEvent::ScanCancelled { .. } => "ScanCancelled",
            AppEvent::Notification { .. } => "Notification",
        }
    }
}

/// Central event distribution bus
///
/// Wraps tokio::broadcast, providing non-blocking publish (slow subscribers
/// never block producers), multiple concurrent subscribers, and automatic
/// cleanup when subscribers drop.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring whether anyone is listening
    ///
    /// A bus with no subscribers (e.g. no SSE client connected) is a normal
    /// condition, not an error.
    pub fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    /// Fire-and-forget user notification
    ///
    /// Accepts a short title, a description, and a severity flag; returns
    /// nothing and never blocks the caller.
    pub fn notify(&self, title: &str, detail: &str, severity: Severity) {
        self.emit(AppEvent::Notification {
            title: title.to_string(),
            detail: detail.to_string(),
            severity,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eventbus_delivers_to_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit(AppEvent::BarcodeDetected {
            barcode: "9780735211292".to_string(),
            timestamp: chrono::Utc::now(),
        });

        let received = rx.try_recv().expect("should receive event");
        assert_eq!(received.event_type(), "BarcodeDetected");
    }

    #[test]
    fn test_emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new(2);
        for _ in 0..10 {
            bus.notify("Test", "no one listening", Severity::Info);
        }
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.notify("Profile added", "Emma", Severity::Info);

        assert_eq!(rx1.try_recv().unwrap().event_type(), "Notification");
        assert_eq!(rx2.try_recv().unwrap().event_type(), "Notification");
    }

    #[test]
    fn test_notification_serializes_with_type_tag() {
        let event = AppEvent::Notification {
            title: "Scan successful".to_string(),
            detail: "Atomic Habits".to_string(),
            severity: Severity::Info,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Notification\""));
        assert!(json.contains("\"severity\":\"info\""));
    }
}
