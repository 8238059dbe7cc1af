//! Fan-out of state-change events to a single long-lived subscriber.
//!
//! Subscribing replaces any previous handler. The handler stays registered
//! across any number of events until [`EventBus::unsubscribe`] is called.
//! Publishing with no subscriber is a no-op.

use crate::core::{CellReport, WifiReport};
use crate::error::Result;
use crossbeam_channel::{unbounded, Receiver};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Event type name for cell updates.
pub const EVENT_TYPE_CELL_STATE_UPDATED: &str = "cellStateUpdated";
/// Event type name for WiFi updates.
pub const EVENT_TYPE_WIFI_STATE_UPDATED: &str = "wifiStateUpdated";

/// A state-change event. Serializes as `{"type": ..., "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Event {
    CellStateUpdated(CellReport),
    WifiStateUpdated(WifiReport),
}

impl Event {
    /// Wire name of this event's type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::CellStateUpdated(_) => EVENT_TYPE_CELL_STATE_UPDATED,
            Event::WifiStateUpdated(_) => EVENT_TYPE_WIFI_STATE_UPDATED,
        }
    }

    /// JSON payload for delivery to a host.
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

type Handler = Arc<dyn Fn(Event) + Send + Sync>;

/// Zero-or-one subscriber slot.
#[derive(Default)]
pub struct EventBus {
    handler: Mutex<Option<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler`, replacing any existing one.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        let replaced = self.slot().replace(Arc::new(handler)).is_some();
        tracing::debug!(replaced, "event subscriber installed");
    }

    /// Install a handler that forwards every event into a channel.
    pub fn subscribe_channel(&self) -> Receiver<Event> {
        let (sender, receiver) = unbounded();
        self.subscribe(move |event| {
            // A dropped receiver just means nobody is listening any more.
            let _ = sender.send(event);
        });
        receiver
    }

    /// Remove the subscriber. Returns whether one was installed.
    pub fn unsubscribe(&self) -> bool {
        let removed = self.slot().take().is_some();
        if removed {
            tracing::debug!("event subscriber removed");
        }
        removed
    }

    pub fn has_subscriber(&self) -> bool {
        self.slot().is_some()
    }

    /// Deliver `event` to the current subscriber. Returns whether it was
    /// delivered.
    ///
    /// The handler runs outside the slot lock, so a handler may itself
    /// subscribe or unsubscribe.
    pub fn publish(&self, event: Event) -> bool {
        let handler = self.slot().clone();
        match handler {
            Some(handler) => {
                tracing::trace!(event_type = event.event_type(), "publishing event");
                handler(event);
                true
            }
            None => false,
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Handler>> {
        self.handler
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DisconnectReason;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn wifi_event() -> Event {
        Event::WifiStateUpdated(WifiReport::disconnected(false, DisconnectReason::Disabled))
    }

    #[test]
    fn test_publish_without_subscriber() {
        let bus = EventBus::new();
        assert!(!bus.publish(wifi_event()));
        assert!(!bus.unsubscribe());
    }

    #[test]
    fn test_subscriber_receives_every_event() {
        let bus = EventBus::new();
        let rx = bus.subscribe_channel();

        assert!(bus.publish(Event::CellStateUpdated(CellReport::empty())));
        assert!(bus.publish(wifi_event()));

        assert_eq!(rx.try_recv().unwrap().event_type(), "cellStateUpdated");
        assert_eq!(rx.try_recv().unwrap().event_type(), "wifiStateUpdated");
        assert!(bus.has_subscriber());
    }

    #[test]
    fn test_subscribe_replaces_handler() {
        let bus = EventBus::new();
        let first = bus.subscribe_channel();
        let second = bus.subscribe_channel();

        bus.publish(wifi_event());
        assert!(first.try_recv().is_err());
        assert!(second.try_recv().is_ok());

        assert!(bus.unsubscribe());
        assert!(!bus.unsubscribe());
        assert!(!bus.publish(wifi_event()));
    }

    #[test]
    fn test_payload_shape() {
        let payload = Event::CellStateUpdated(CellReport::empty())
            .to_payload()
            .unwrap();
        assert_eq!(payload["type"], "cellStateUpdated");
        assert!(payload["data"]["primary"].is_null());
        assert_eq!(payload["data"]["alternates"], serde_json::json!([]));
    }

    #[test]
    fn test_concurrent_publishers() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let bus = bus.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        bus.publish(wifi_event());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(count.load(Ordering::SeqCst), 100);
    }
}
