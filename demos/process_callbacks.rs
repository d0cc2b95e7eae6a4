//! # Example: process_callbacks
//!
//! A worker built from callbacks: `start` runs until shutdown, `ready` checks
//! an upstream HTTP endpoint, `stop` flushes buffered work under the shutdown
//! deadline.
//!
//! ```text
//! Process { start, ready, stop } ──► Supervisor::run()
//!     GET :8086/live  ─► 200 OK
//!     GET :8086/ready ─► http_get_check(UPSTREAM)  200 OK | 503 <error>
//!     Ctrl-C / SIGTERM ─► stop(bounded scope) ─► exit
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example process_callbacks
//! curl -i localhost:8086/ready
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use procvisor::{
    LogFormat, OpError, OpFn, OpRef, Process, ProcessConfig, Scope, Supervisor, http_get_check,
    init_logging,
};

const UPSTREAM: &str = "http://127.0.0.1:9200/";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::Text)?;

    let processed = Arc::new(AtomicU64::new(0));

    let start: OpRef = {
        let processed = processed.clone();
        OpFn::arc("worker", move |scope: Scope| {
            let processed = processed.clone();
            async move {
                loop {
                    if scope.sleep(Duration::from_millis(500)).await.is_err() {
                        return Ok::<_, OpError>(());
                    }
                    let n = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::info!(processed = n, "batch done");
                }
            }
        })
    };

    let stop: OpRef = {
        let processed = processed.clone();
        OpFn::arc("flush", move |scope: Scope| {
            let processed = processed.clone();
            async move {
                scope.sleep(Duration::from_millis(200)).await?;
                tracing::info!(
                    processed = processed.load(Ordering::Relaxed),
                    "flushed pending batches"
                );
                Ok::<_, OpError>(())
            }
        })
    };

    let process = Process::builder()
        .start(start)
        .ready(http_get_check(UPSTREAM, Duration::from_millis(500)))
        .stop(stop)
        .build();

    Supervisor::builder(ProcessConfig::well_known())
        .build()
        .run(process)
        .await?;
    Ok(())
}
