//! # Broadcast bus for supervisor events.
//!
//! ```text
//! Publishers:                         Consumer:
//!   Supervisor    ──┐
//!   health probes ──┼──► Bus ──► supervisor listener ──► SubscriberSet
//!   SubscriberSet ──┘  (broadcast)
//! ```
//!
//! ## Rules
//! - `publish` never blocks and never fails; without receivers the event is dropped.
//! - The ring buffer is shared by all receivers; a lagging receiver observes
//!   `RecvError::Lagged(n)` and skips the `n` oldest events.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable handle onto a bounded broadcast channel of [`Event`]s.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus holding up to `capacity` undelivered events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Fire-and-forget publish.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New receiver observing events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
