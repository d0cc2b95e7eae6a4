//! Error types used by operations and by the process supervisor.
//!
//! This module defines the error values that flow through the crate:
//!
//! - [`OpError`]: the failure value returned by any [`Operation`](crate::Operation).
//! - [`AggregateError`]: every failure collected by [`parallel`](crate::parallel).
//! - [`RuntimeError`]: errors raised by the supervisor infrastructure itself.
//!
//! Both enums provide `as_label` for stable log/metric labels.

use std::{fmt, io, net::SocketAddr, time::Duration};

use thiserror::Error;

/// # Failure of a single operation.
///
/// Operation failures are ordinary values: combinators propagate them, the
/// supervisor logs them, and health probes render them into HTTP 503 bodies
/// through their [`Display`](fmt::Display) text.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpError {
    /// Operation failed with a human-readable reason.
    #[error("{reason}")]
    Fail {
        /// The underlying error message.
        reason: String,
    },

    /// The scope the operation observed was cancelled.
    #[error("context canceled")]
    Canceled,

    /// The scope the operation observed reached its deadline.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// Operation panicked; the panic payload was recovered into a value.
    #[error("operation panicked: {reason}")]
    Panicked {
        /// Panic payload rendered as text.
        reason: String,
    },

    /// Several operations failed concurrently.
    #[error(transparent)]
    Aggregate(AggregateError),
}

impl OpError {
    /// Builds an [`OpError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use procvisor::OpError;
    ///
    /// let err = OpError::fail("db unreachable");
    /// assert_eq!(err.to_string(), "db unreachable");
    /// ```
    pub fn fail(reason: impl fmt::Display) -> Self {
        OpError::Fail {
            reason: reason.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            OpError::Fail { .. } => "op_failed",
            OpError::Canceled => "op_canceled",
            OpError::DeadlineExceeded => "op_deadline_exceeded",
            OpError::Panicked { .. } => "op_panicked",
            OpError::Aggregate(_) => "op_aggregate",
        }
    }

    /// Returns `true` if the failure came from scope cancellation or deadline.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, OpError::Canceled | OpError::DeadlineExceeded)
    }

    /// Returns `true` if `self` is `target` or, for aggregates, holds it at any depth.
    pub fn includes(&self, target: &OpError) -> bool {
        match self {
            OpError::Aggregate(agg) => agg.contains(target),
            other => other == target,
        }
    }
}

/// Every failure observed by one [`parallel`](crate::parallel) invocation.
///
/// Failures keep their identity: callers can ask whether a particular failure
/// is part of the aggregate with [`AggregateError::contains`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError {
    errors: Vec<OpError>,
}

impl AggregateError {
    /// Wraps the collected failures. Returns `None` when there are none.
    pub fn from_errors(errors: Vec<OpError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    /// Failures in operand order.
    pub fn errors(&self) -> &[OpError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpError> {
        self.errors.iter()
    }

    /// Returns `true` if `target` is among the failures, searching nested aggregates too.
    pub fn contains(&self, target: &OpError) -> bool {
        self.errors.iter().any(|e| e.includes(target))
    }

    pub fn into_errors(self) -> Vec<OpError> {
        self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

impl From<AggregateError> for OpError {
    fn from(value: AggregateError) -> Self {
        OpError::Aggregate(value)
    }
}

/// # Errors produced by the supervisor infrastructure.
///
/// Operation failures (Serve/Clean) are never returned here; they are logged
/// and handled by the configured [`FailurePolicy`](crate::FailurePolicy).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// `run` was called on a supervisor that already left the `Created` state.
    #[error("supervisor already started; a supervisor runs exactly once")]
    AlreadyStarted,

    /// The health listener could not bind its address.
    #[error("failed to bind health listener on {addr}: {source}")]
    HealthBind {
        /// Requested bind address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The health listener failed while serving.
    #[error("health listener failed: {0}")]
    HealthServe(#[source] io::Error),

    /// The health listener did not drain within the remaining shutdown budget.
    #[error("health listener shutdown exceeded {budget:?}")]
    HealthShutdownTimeout {
        /// Budget that was exceeded.
        budget: Duration,
    },

    /// The health listener task panicked or was aborted.
    #[error("health listener task ended abnormally: {reason}")]
    HealthTask {
        /// Join error rendered as text.
        reason: String,
    },

    /// Termination signal handlers could not be registered.
    #[error("failed to register termination signals: {0}")]
    Signal(#[source] io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use procvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::AlreadyStarted.as_label(), "runtime_already_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AlreadyStarted => "runtime_already_started",
            RuntimeError::HealthBind { .. } => "runtime_health_bind",
            RuntimeError::HealthServe(_) => "runtime_health_serve",
            RuntimeError::HealthShutdownTimeout { .. } => "runtime_health_shutdown_timeout",
            RuntimeError::HealthTask { .. } => "runtime_health_task",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
