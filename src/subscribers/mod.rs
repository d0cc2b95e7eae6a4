//! # Event subscribers.
//!
//! ```text
//! Supervisor / probes ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                   │
//!                                                   ┌───────────────┼──────────────┐
//!                                                   ▼               ▼              ▼
//!                                               LogWriter        Metrics        Custom
//! ```
//!
//! [`LogWriter`] is the default sink; pass your own list through
//! [`SupervisorBuilder::with_subscribers`](crate::SupervisorBuilder::with_subscribers)
//! to replace it (include `LogWriter` explicitly to keep logging).

mod log;
mod subscribe;
mod subscriber_set;

pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
