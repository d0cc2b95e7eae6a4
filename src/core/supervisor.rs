//! # Supervisor: drives one runnable through its process lifecycle.
//!
//! ## Architecture
//! ```text
//! run_until(runnable, shutdown)
//!   Created ─► Starting
//!     ├─ listener: Bus.subscribe() ─► SubscriberSet::emit(Event)
//!     ├─ root scope (no deadline)
//!     ├─ HealthServer::bind(addr, /live + /ready)       bind error → Err(HealthBind)
//!     └─ ShutdownSignals::register()                     INT / HUP / TERM / QUIT
//!   ─► Running
//!     tokio::join!(
//!       serve(root)                                      Err → ServeFailed, trigger shutdown
//!       wait(signal | shutdown future | serve failed)
//!         ─► Stopping
//!            ├─ check scope cancelled                    in-flight checks drain
//!            ├─ bounded = root.with_deadline(now + shutdown_timeout)
//!            ├─ Watchdog::arm(deadline)                  fires → process exit(2)
//!            ├─ clean(bounded)                           Err → CleanFailed (logged)
//!            ├─ watchdog.disarm()
//!            ├─ health.shutdown(bounded.remaining())     Err → HealthStopFailed (logged)
//!            └─ root.cancel()                            unblocks serve
//!     )
//!   ─► Stopped ─► flush subscribers ─► FailurePolicy
//! ```
//!
//! ## Rules
//! - A supervisor runs once. Any later `run*` call returns [`RuntimeError::AlreadyStarted`].
//! - Serve/Clean failures never surface as `run` errors; they are published as
//!   events and, with [`FailurePolicy::Exit`], end the process after shutdown.
//! - A Serve that returns success early does not stop the process; the
//!   supervisor keeps answering probes until a termination trigger arrives.
//! - A Serve that reports cancellation after the root scope was cancelled has
//!   stopped normally.
//! - The watchdog covers Clean only. A health listener that cannot drain within
//!   the remaining budget is aborted and logged, never a forced exit.
//!
//! ## Example
//! ```no_run
//! use procvisor::{OpError, OpFn, Process, ProcessConfig, Scope, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let process = Process::builder()
//!         .start(OpFn::arc("worker", |scope: Scope| async move {
//!             scope.cancelled().await;
//!             Ok::<_, OpError>(())
//!         }))
//!         .build();
//!
//!     Supervisor::builder(ProcessConfig::default())
//!         .build()
//!         .run(process)
//!         .await?;
//!     Ok(())
//! }
//! ```

use std::{
    future::Future,
    net::SocketAddr,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use tokio::{
    sync::{
        broadcast::error::{RecvError, TryRecvError},
        watch,
    },
    task::JoinHandle,
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::{
    config::{FATAL_EXIT_CODE, FailurePolicy, ProcessConfig},
    core::{
        builder::SupervisorBuilder,
        runnable::{Resolved, Runnable},
        shutdown::ShutdownSignals,
        state::SupervisorState,
        watchdog::Watchdog,
    },
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    health::{HealthServer, ProbeContext, health_router},
    ops::{OpRef, Scope},
    subscribers::{LogWriter, Subscribe, SubscriberSet},
};

/// Runs a [`Runnable`] with health endpoints, signal handling and a shutdown deadline.
pub struct Supervisor {
    cfg: ProcessConfig,
    bus: Bus,
    subscribers: Mutex<Vec<Arc<dyn Subscribe>>>,
    state: watch::Sender<SupervisorState>,
    health_addr: OnceLock<SocketAddr>,
}

impl Supervisor {
    pub fn builder(cfg: ProcessConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: ProcessConfig, mut subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        if subscribers.is_empty() {
            subscribers.push(Arc::new(LogWriter));
        }
        let (state, _) = watch::channel(SupervisorState::Created);

        Self {
            bus: Bus::new(cfg.bus_capacity_clamped()),
            cfg,
            subscribers: Mutex::new(subscribers),
            state,
            health_addr: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &ProcessConfig {
        &self.cfg
    }

    /// Bus the supervisor publishes its events on.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SupervisorState> {
        self.state.subscribe()
    }

    /// Address the health listener is bound to, once it is listening.
    pub fn health_addr(&self) -> Option<SocketAddr> {
        self.health_addr.get().copied()
    }

    /// Runs `runnable` until an OS termination signal or a Serve failure.
    pub async fn run<R: Runnable>(&self, runnable: R) -> Result<(), RuntimeError> {
        self.run_until(runnable, std::future::pending()).await
    }

    /// Like [`run`](Self::run), with `shutdown` as an extra termination trigger.
    pub async fn run_until<R, F>(&self, runnable: R, shutdown: F) -> Result<(), RuntimeError>
    where
        R: Runnable,
        F: Future<Output = ()> + Send,
    {
        self.begin()?;

        let stop_listener = CancellationToken::new();
        let listener = self.subscriber_listener(stop_listener.clone());
        self.bus.publish(Event::new(EventKind::ProcessStarting));

        let target = Resolved::from_runnable(Arc::new(runnable));
        let outcome = self.drive(target, shutdown).await;

        self.state.send_replace(SupervisorState::Stopped);
        self.bus.publish(Event::new(EventKind::ProcessStopped));
        stop_listener.cancel();
        match listener.await {
            Ok(set) => set.shutdown().await,
            Err(err) => warn!(error = %err, "event listener ended abnormally"),
        }

        let failed = outcome?;
        if failed && self.cfg.failure_policy == FailurePolicy::Exit {
            exit_fatal();
        }
        Ok(())
    }

    /// `Created → Starting`, exactly once.
    fn begin(&self) -> Result<(), RuntimeError> {
        let mut accepted = false;
        self.state.send_if_modified(|state| {
            if *state == SupervisorState::Created {
                *state = SupervisorState::Starting;
                accepted = true;
            }
            accepted
        });

        if accepted {
            Ok(())
        } else {
            Err(RuntimeError::AlreadyStarted)
        }
    }

    /// Forwards bus events to the subscriber set until `stop`, then drains what is left.
    fn subscriber_listener(&self, stop: CancellationToken) -> JoinHandle<SubscriberSet> {
        let subs = std::mem::take(
            &mut *self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let set = SubscriberSet::new(subs, self.bus.clone());
        let mut rx = self.bus.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    received = rx.recv() => match received {
                        Ok(ev) => set.emit(ev),
                        Err(RecvError::Lagged(skipped)) => warn!(skipped, "event listener lagged"),
                        Err(RecvError::Closed) => break,
                    },
                    () = stop.cancelled() => {
                        loop {
                            match rx.try_recv() {
                                Ok(ev) => set.emit(ev),
                                Err(TryRecvError::Lagged(_)) => continue,
                                Err(_) => break,
                            }
                        }
                        break;
                    }
                }
            }
            set
        })
    }

    /// Startup, Serve and shutdown. `Ok(true)` if Serve or Clean failed.
    async fn drive<F>(&self, target: Resolved, shutdown: F) -> Result<bool, RuntimeError>
    where
        F: Future<Output = ()> + Send,
    {
        let root = Scope::new();
        let _cancel_root = root.drop_guard();

        let check_scope = root.child();
        let checks = ProbeContext::new(check_scope.clone()).with_bus(self.bus.clone());
        let router = health_router(target.live.clone(), target.ready.clone(), checks);
        let health = HealthServer::bind(self.cfg.health_addr_or_default(), router).await?;
        let addr = health.local_addr();
        let _ = self.health_addr.set(addr);
        self.bus
            .publish(Event::new(EventKind::HealthListening).with_addr(addr));

        let mut signals = ShutdownSignals::register().map_err(RuntimeError::Signal)?;

        self.state.send_replace(SupervisorState::Running);
        self.bus.publish(Event::new(EventKind::ProcessRunning));

        let serve_failed = CancellationToken::new();
        let trigger = async {
            tokio::select! {
                sig = signals.recv() => sig,
                () = shutdown => "shutdown requested",
                () = serve_failed.cancelled() => "serve failed",
            }
        };

        let (serve_failure, clean_failure) = tokio::join!(
            self.serve(&target.serve, &root, &serve_failed),
            self.stop(&target.clean, &root, &check_scope, health, trigger),
        );
        Ok(serve_failure || clean_failure)
    }

    /// Runs Serve on the root scope. Returns `true` on failure.
    async fn serve(&self, op: &OpRef, root: &Scope, failed: &CancellationToken) -> bool {
        match op.run(root.clone()).await {
            Ok(()) => {
                if !root.is_cancelled() {
                    self.bus
                        .publish(Event::new(EventKind::ServeReturned).with_name(op.name()));
                }
                false
            }
            Err(err) if root.is_cancelled() && err.is_cancellation() => {
                debug!(op = op.name(), error = %err, "serve observed shutdown");
                false
            }
            Err(err) => {
                self.bus.publish(
                    Event::new(EventKind::ServeFailed)
                        .with_name(op.name())
                        .with_reason(err.to_string()),
                );
                failed.cancel();
                true
            }
        }
    }

    /// Waits for `trigger`, then runs the bounded shutdown sequence. Returns `true` if Clean failed.
    async fn stop(
        &self,
        clean: &OpRef,
        root: &Scope,
        checks: &Scope,
        health: HealthServer,
        trigger: impl Future<Output = &'static str>,
    ) -> bool {
        let reason = trigger.await;
        self.state.send_replace(SupervisorState::Stopping);
        checks.cancel();

        let budget = self.cfg.shutdown_timeout;
        self.bus.publish(
            Event::new(EventKind::ShutdownRequested)
                .with_reason(reason)
                .with_timeout(budget),
        );

        let deadline = Instant::now() + budget;
        let bounded = root.with_deadline(deadline);
        let watchdog = Watchdog::arm(deadline, budget);

        let clean_failed = match clean.run(bounded.scope().clone()).await {
            Ok(()) => false,
            Err(err) => {
                self.bus.publish(
                    Event::new(EventKind::CleanFailed)
                        .with_name(clean.name())
                        .with_reason(err.to_string()),
                );
                true
            }
        };
        watchdog.disarm();

        let remaining = bounded.remaining().unwrap_or_default();
        if let Err(err) = health.shutdown(remaining).await {
            self.bus.publish(
                Event::new(EventKind::HealthStopFailed).with_reason(err.to_string()),
            );
        }

        root.cancel();
        clean_failed
    }
}

fn exit_fatal() -> ! {
    error!(exit_code = FATAL_EXIT_CODE, "serve or clean failed, exiting");
    std::process::exit(FATAL_EXIT_CODE)
}
