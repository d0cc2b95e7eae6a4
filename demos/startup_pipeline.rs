//! # Example: startup_pipeline
//!
//! Composes a service's startup out of combinators and runs it under the
//! supervisor with JSON logs.
//!
//! ```text
//! sequential
//!   ├─ timeout(10s, retry_with_backoff(connect-db, 5, exp 100ms..2s + full jitter))
//!   ├─ parallel(load-config, warm-cache)
//!   ├─ ignore_error(register-metrics)
//!   ├─ atomic(migrate, rollback-migration)
//!   └─ serve
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example startup_pipeline
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use procvisor::{
    BackoffPolicy, JitterPolicy, LogFormat, OpError, OpFn, OpRef, Process, ProcessConfig, Scope,
    Supervisor, atomic, ignore_error, init_logging, parallel, retry_with_backoff, sequential,
    timeout,
};

/// Succeeds after `delay`, or fails with `error`.
fn step(name: &'static str, delay: Duration, error: Option<&'static str>) -> OpRef {
    OpFn::arc(name, move |scope: Scope| async move {
        scope.sleep(delay).await?;
        match error {
            Some(reason) => Err(OpError::fail(reason)),
            None => {
                tracing::info!(step = name, "done");
                Ok(())
            }
        }
    })
}

/// Fails its first `failures` runs.
fn flaky(name: &'static str, failures: u32) -> OpRef {
    let runs = Arc::new(AtomicU32::new(0));
    OpFn::arc(name, move |_scope: Scope| {
        let runs = runs.clone();
        async move {
            let n = runs.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                return Err(OpError::fail(format!("{name}: connection refused")));
            }
            tracing::info!(step = name, attempts = n + 1, "connected");
            Ok(())
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::Json)?;

    let backoff = BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(2))
        .with_jitter(JitterPolicy::Full);

    let serve: OpRef = OpFn::arc("serve", |scope: Scope| async move {
        tracing::info!("serving");
        scope.cancelled().await;
        Ok::<_, OpError>(())
    });

    let startup = sequential(vec![
        timeout(
            retry_with_backoff(flaky("connect-db", 3), 5, backoff),
            Duration::from_secs(10),
        ),
        parallel(vec![
            step("load-config", Duration::from_millis(50), None),
            step("warm-cache", Duration::from_millis(300), None),
        ]),
        ignore_error(step(
            "register-metrics",
            Duration::from_millis(10),
            Some("metrics endpoint unavailable"),
        )),
        atomic(
            step("migrate", Duration::from_millis(100), None),
            step("rollback-migration", Duration::ZERO, None),
        ),
        serve,
    ]);

    let process = Process::builder().start(startup).build();

    Supervisor::builder(ProcessConfig::well_known())
        .build()
        .run(process)
        .await?;
    Ok(())
}
