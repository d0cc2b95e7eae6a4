//! # Subscriber trait
//!
//! [`Subscribe`] is the extension point for routing supervisor events to logs,
//! metrics or alerting. Each subscriber is driven by its own worker, fed by a
//! bounded queue owned by [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow; they never block the supervisor or other subscribers.
//! - On queue overflow, events for that subscriber are dropped and a
//!   [`SubscriberOverflow`](crate::EventKind::SubscriberOverflow) event is published.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use procvisor::{Event, EventKind, Subscribe};
//!
//! struct ProbeAlerts;
//!
//! #[async_trait]
//! impl Subscribe for ProbeAlerts {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::ProbeFailed {
//!             // page someone...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "probe-alerts" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow/panic reports.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
