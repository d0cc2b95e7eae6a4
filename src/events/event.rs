//! # Lifecycle events emitted by the supervisor and the health adapter.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (name, reason, bound address, deadline) a subscriber needs to report it.
//!
//! ## Ordering guarantees
//! Each event takes a process-wide, monotonically increasing `seq`. Subscribers
//! receive events through independent queues, so `seq` is the way to restore
//! global order across them.
//!
//! ## Example
//! ```rust
//! use procvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ProbeFailed)
//!     .with_name("db-ready")
//!     .with_reason("db unreachable");
//!
//! assert_eq!(ev.kind, EventKind::ProbeFailed);
//! assert_eq!(ev.name.as_deref(), Some("db-ready"));
//! ```

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering as AtomicOrdering},
    },
    time::{Duration, SystemTime},
};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle ===
    /// `run` accepted; the supervisor moved to `Starting`.
    ProcessStarting,

    /// Health listener bound.
    ///
    /// Sets `addr` (resolved, ephemeral ports included).
    HealthListening,

    /// Signals registered, Serve about to be invoked.
    ProcessRunning,

    /// Serve returned success before shutdown was requested.
    ///
    /// Sets `name` (serve operation name).
    ServeReturned,

    /// Serve failed; shutdown follows.
    ///
    /// Sets `name`, `reason`.
    ServeFailed,

    /// Shutdown sequence started.
    ///
    /// Sets `reason` (trigger: signal name, `serve failed` or `shutdown requested`)
    /// and `timeout_ms` (shutdown deadline).
    ShutdownRequested,

    /// Clean failed during shutdown.
    ///
    /// Sets `name`, `reason`.
    CleanFailed,

    /// The health listener did not stop cleanly.
    ///
    /// Sets `reason`.
    HealthStopFailed,

    /// Terminal state reached; `run` is about to return.
    ProcessStopped,

    // === Health ===
    /// A liveness/readiness probe failed and answered 503.
    ///
    /// Sets `name` (probe operation), `reason`.
    ProbeFailed,

    // === Subscribers ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets `name` (subscriber), `reason`.
    SubscriberOverflow,

    /// Subscriber panicked while handling an event.
    ///
    /// Sets `name` (subscriber), `reason` (panic message).
    SubscriberPanicked,
}

/// Supervisor event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide monotonic sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    pub kind: EventKind,
    /// Operation or subscriber name, depending on `kind`.
    pub name: Option<Arc<str>>,
    /// Human-readable failure text or trigger.
    pub reason: Option<Arc<str>>,
    /// Bound health listener address.
    pub addr: Option<SocketAddr>,
    /// Deadline in milliseconds (compact).
    pub timeout_ms: Option<u32>,
}

impl Event {
    /// Creates an event stamped with the current time and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            name: None,
            reason: None,
            addr: None,
            timeout_ms: None,
        }
    }

    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Attaches a deadline, stored as milliseconds saturated to `u32::MAX`.
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_name(subscriber)
            .with_reason(reason)
    }

    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_name(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::ProcessStarting);
        let b = Event::new(EventKind::ProcessRunning);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn timeout_saturates() {
        let ev = Event::new(EventKind::ShutdownRequested).with_timeout(Duration::from_secs(u64::MAX));
        assert_eq!(ev.timeout_ms, Some(u32::MAX));

        let ev = Event::new(EventKind::ShutdownRequested).with_timeout(Duration::from_secs(30));
        assert_eq!(ev.timeout_ms, Some(30_000));
    }
}
