use std::collections::HashMap;
use std::sync::Mutex;

use async_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProximityEvent {
    NearDestination { distance_meters: f64 },
    ExitedWithoutConfirmation { task_id: Uuid },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    NearDestination,
    ExitedWithoutConfirmation,
}

impl ProximityEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::NearDestination { .. } => EventKind::NearDestination,
            Self::ExitedWithoutConfirmation { .. } => EventKind::ExitedWithoutConfirmation,
        }
    }
}

/// Publish/subscribe channel keyed by event kind. Delivery is
/// fire-and-forget: an event with no live listener is dropped, not queued.
#[derive(Debug, Default)]
pub struct EventBus {
    listeners: Mutex<HashMap<EventKind, Vec<Sender<ProximityEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: EventKind) -> Receiver<ProximityEvent> {
        let (tx, rx) = async_channel::unbounded();

        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.entry(kind).or_default().push(tx);
        }

        rx
    }

    /// Delivers `event` to every live listener of its kind, pruning closed
    /// ones. Returns the number of listeners reached.
    #[tracing::instrument(skip(self))]
    pub fn publish(&self, event: ProximityEvent) -> usize {
        let Ok(mut listeners) = self.listeners.lock() else {
            return 0;
        };

        let Some(senders) = listeners.get_mut(&event.kind()) else {
            tracing::debug!("no listeners registered, dropping event");
            return 0;
        };

        senders.retain(|tx| tx.try_send(event.clone()).is_ok());
        senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_listeners_drops_the_event() {
        let bus = EventBus::new();

        let delivered = bus.publish(ProximityEvent::NearDestination {
            distance_meters: 50.0,
        });
        assert_eq!(delivered, 0);
    }

    #[test]
    fn listeners_only_receive_their_kind() {
        let bus = EventBus::new();
        let near = bus.subscribe(EventKind::NearDestination);
        let exited = bus.subscribe(EventKind::ExitedWithoutConfirmation);

        let event = ProximityEvent::NearDestination {
            distance_meters: 80.0,
        };
        assert_eq!(bus.publish(event.clone()), 1);

        assert_eq!(near.try_recv().ok(), Some(event));
        assert!(exited.try_recv().is_err());
    }

    #[test]
    fn closed_listeners_are_pruned() {
        let bus = EventBus::new();
        let rx = bus.subscribe(EventKind::NearDestination);
        drop(rx);

        let delivered = bus.publish(ProximityEvent::NearDestination {
            distance_meters: 10.0,
        });
        assert_eq!(delivered, 0);
    }
}
