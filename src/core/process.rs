//! # Callback-bundle construction style.
//!
//! [`Process`] bundles four optional operations (start, live, ready, stop) and
//! implements [`Runnable`], so the supervisor drives it exactly like any other
//! runnable. An unset `start`/`stop` is a no-op; an unset `live`/`ready` is an
//! absent capability.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::{OpError, OpFn, Process, Scope, http_get_check};
//!
//! let process = Process::builder()
//!     .start(OpFn::arc("http-server", |scope: Scope| async move {
//!         scope.cancelled().await;
//!         Ok::<_, OpError>(())
//!     }))
//!     .ready(http_get_check("http://127.0.0.1:5432/", Duration::from_millis(500)))
//!     .build();
//! ```

use async_trait::async_trait;

use crate::{
    core::runnable::{Liveness, Readiness, Runnable},
    error::OpError,
    ops::{OpRef, Scope, noop},
};

/// Start/Live/Ready/Stop callback bundle.
#[derive(Clone)]
pub struct Process {
    start: OpRef,
    stop: OpRef,
    live: Option<OpRef>,
    ready: Option<OpRef>,
}

impl Process {
    pub fn builder() -> ProcessBuilder {
        ProcessBuilder::default()
    }
}

impl Default for Process {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`Process`]; every callback is optional.
#[derive(Clone, Default)]
pub struct ProcessBuilder {
    start: Option<OpRef>,
    stop: Option<OpRef>,
    live: Option<OpRef>,
    ready: Option<OpRef>,
}

impl ProcessBuilder {
    /// Runs with the root scope until shutdown or failure.
    pub fn start(mut self, op: OpRef) -> Self {
        self.start = Some(op);
        self
    }

    /// Backs `GET /live`.
    pub fn live(mut self, op: OpRef) -> Self {
        self.live = Some(op);
        self
    }

    /// Backs `GET /ready`.
    pub fn ready(mut self, op: OpRef) -> Self {
        self.ready = Some(op);
        self
    }

    /// Runs once during shutdown, under the shutdown deadline.
    pub fn stop(mut self, op: OpRef) -> Self {
        self.stop = Some(op);
        self
    }

    pub fn build(self) -> Process {
        Process {
            start: self.start.unwrap_or_else(|| noop("start")),
            stop: self.stop.unwrap_or_else(|| noop("stop")),
            live: self.live,
            ready: self.ready,
        }
    }
}

#[async_trait]
impl Runnable for Process {
    async fn serve(&self, scope: Scope) -> Result<(), OpError> {
        self.start.run(scope).await
    }

    async fn clean(&self, scope: Scope) -> Result<(), OpError> {
        self.stop.run(scope).await
    }

    fn name(&self) -> &str {
        "process"
    }

    fn as_liveness(&self) -> Option<&dyn Liveness> {
        self.live.as_ref().map(|_| self as &dyn Liveness)
    }

    fn as_readiness(&self) -> Option<&dyn Readiness> {
        self.ready.as_ref().map(|_| self as &dyn Readiness)
    }
}

#[async_trait]
impl Liveness for Process {
    async fn liveness(&self, scope: Scope) -> Result<(), OpError> {
        match &self.live {
            Some(op) => op.run(scope).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Readiness for Process {
    async fn readiness(&self, scope: Scope) -> Result<(), OpError> {
        match &self.ready {
            Some(op) => op.run(scope).await,
            None => Ok(()),
        }
    }
}
