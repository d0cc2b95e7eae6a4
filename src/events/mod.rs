//! Supervisor events: data model and broadcast bus.
//!
//! - [`EventKind`], [`Event`]: what happened, with optional metadata.
//! - [`Bus`]: thin wrapper over `tokio::sync::broadcast`.
//!
//! Publishers are the supervisor run loop, the health probe handlers and the
//! [`SubscriberSet`](crate::SubscriberSet) workers (overflow/panic). The only
//! consumer is the supervisor's listener, which forwards to the subscriber set.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
