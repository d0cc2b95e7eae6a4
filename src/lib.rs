//! # procvisor
//!
//! **procvisor** composes cancellable, fallible operations and runs a long-lived
//! service under a process supervisor that answers liveness/readiness probes,
//! reacts to termination signals, and enforces a graceful-shutdown deadline.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   OpFn / custom Operation          Combinators
//!   ┌────────────┐ ┌────────────┐    sequential · parallel · timeout
//!   │ connect-db │ │ warm-cache │──► retry · ignore_error · atomic ──► OpRef
//!   └────────────┘ └────────────┘
//!                                                   │
//!             Process { start, live, ready, stop } ─┤  or  impl Runnable (+ Liveness / Readiness)
//!                                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor                                                       │
//! │  - root Scope (cancellation tree)                                 │
//! │  - HealthServer: GET /live, GET /ready (200 OK | 503 <error>)     │
//! │  - ShutdownSignals: SIGINT · SIGHUP · SIGTERM · SIGQUIT           │
//! │  - Watchdog: exit(2) if cleanup misses the shutdown deadline      │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ publish(Event)
//!        ▼
//!   Bus (broadcast) ──► listener ──► SubscriberSet ──► LogWriter / custom subscribers
//! ```
//!
//! ### Lifecycle
//! ```text
//! Created ─► Starting ─► Running ─────────────────────► Stopping ─────────────────────► Stopped
//!            bind health  serve(root)                    cancel checks, arm watchdog
//!            register     until signal, shutdown future, clean(bounded), disarm watchdog
//!            signals      or serve failure               health.shutdown(remaining), root.cancel()
//! ```
//!
//! ## Features
//! | Area             | Description                                               | Key types / functions |
//! |------------------|-----------------------------------------------------------|-----------------------|
//! | **Operations**   | Cancellable units of work and their scopes.               | [`Operation`], [`OpFn`], [`OpRef`], [`Scope`] |
//! | **Combinators**  | Compose operations into larger ones.                      | [`sequential`], [`parallel`], [`timeout`], [`retry`], [`ignore_error`], [`atomic`] |
//! | **Policies**     | Delays between retry attempts.                            | [`BackoffPolicy`], [`JitterPolicy`] |
//! | **Supervision**  | Run a service with probes, signals and a shutdown deadline.| [`Supervisor`], [`Runnable`], [`Process`] |
//! | **Health**       | Probe routes and an HTTP dependency check.                | [`health_router`], [`http_get_check`] |
//! | **Events**       | Observe the lifecycle.                                    | [`Event`], [`Subscribe`], [`LogWriter`] |
//! | **Errors**       | Typed failures.                                           | [`OpError`], [`AggregateError`], [`RuntimeError`] |
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use procvisor::{
//!     LogFormat, OpError, OpFn, OpRef, Process, ProcessConfig, Scope, Supervisor,
//!     init_logging, retry, sequential, timeout,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(LogFormat::Text)?;
//!
//!     let connect: OpRef = OpFn::arc("connect-db", |scope: Scope| async move {
//!         scope.check()?;
//!         Ok::<_, OpError>(())
//!     });
//!     let serve: OpRef = OpFn::arc("serve", |scope: Scope| async move {
//!         scope.cancelled().await;
//!         Ok::<_, OpError>(())
//!     });
//!
//!     let process = Process::builder()
//!         .start(sequential(vec![
//!             timeout(retry(connect, 5, Duration::from_millis(200)), Duration::from_secs(10)),
//!             serve,
//!         ]))
//!         .build();
//!
//!     Supervisor::builder(ProcessConfig::well_known())
//!         .build()
//!         .run(process)
//!         .await?;
//!     Ok(())
//! }
//! ```

mod config;
mod control;
mod core;
mod error;
mod logging;
mod ops;

pub mod events;
pub mod health;
pub mod policies;
pub mod subscribers;

pub use config::{
    DEFAULT_HEALTH_PORT, DEFAULT_SHUTDOWN_TIMEOUT, FATAL_EXIT_CODE, FailurePolicy, ProcessConfig,
    WATCHDOG_EXIT_CODE,
};
pub use control::{
    Atomic, IgnoreError, Parallel, Retry, Sequential, Timeout, atomic, ignore_error, parallel,
    retry, retry_with_backoff, sequential, timeout,
};
pub use self::core::{
    Liveness, Process, ProcessBuilder, Readiness, Runnable, Supervisor, SupervisorBuilder,
    SupervisorState,
};
pub use error::{AggregateError, OpError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use health::{HealthServer, ProbeContext, health_router, http_get_check, probe_route};
pub use logging::{LogFormat, TryInitError, init_logging};
pub use ops::{Noop, OpFn, OpRef, Operation, Scope, ScopeGuard, noop};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
