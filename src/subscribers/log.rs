//! # Default logging subscriber.
//!
//! [`LogWriter`] turns supervisor events into leveled `tracing` records:
//!
//! | Level | Events |
//! |---|---|
//! | `info` | lifecycle (starting, listening, running, shutdown requested, stopped) |
//! | `warn` | probe failures, subscriber overflow |
//! | `error` | Serve/Clean failures, health listener stop failures, subscriber panics |
//!
//! Output formatting is up to the installed `tracing` subscriber, see
//! [`init_logging`](crate::init_logging).

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::{
    events::{Event, EventKind},
    subscribers::Subscribe,
};

/// Structured logging sink installed when no subscribers are configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let name = e.name.as_deref().unwrap_or("");
        let reason = e.reason.as_deref().unwrap_or("");

        match e.kind {
            EventKind::ProcessStarting => info!(seq = e.seq, "starting process"),
            EventKind::HealthListening => match e.addr {
                Some(addr) => info!(seq = e.seq, %addr, "health listener ready"),
                None => info!(seq = e.seq, "health listener ready"),
            },
            EventKind::ProcessRunning => info!(seq = e.seq, "process running"),
            EventKind::ServeReturned => {
                info!(seq = e.seq, op = name, "serve returned; waiting for shutdown")
            }
            EventKind::ServeFailed => error!(seq = e.seq, op = name, error = reason, "serve failed"),
            EventKind::ShutdownRequested => info!(
                seq = e.seq,
                trigger = reason,
                timeout_ms = e.timeout_ms,
                "stopping process"
            ),
            EventKind::CleanFailed => error!(seq = e.seq, op = name, error = reason, "clean failed"),
            EventKind::HealthStopFailed => {
                error!(seq = e.seq, error = reason, "health listener shutdown failed")
            }
            EventKind::ProcessStopped => info!(seq = e.seq, "process stopped"),
            EventKind::ProbeFailed => warn!(seq = e.seq, probe = name, error = reason, "probe failed"),
            EventKind::SubscriberOverflow => {
                warn!(seq = e.seq, subscriber = name, reason, "subscriber dropped event")
            }
            EventKind::SubscriberPanicked => {
                error!(seq = e.seq, subscriber = name, panic = reason, "subscriber panicked")
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
