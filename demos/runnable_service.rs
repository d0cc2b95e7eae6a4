//! # Example: runnable_service
//!
//! A service object implementing [`Runnable`] plus the optional [`Readiness`]
//! capability. Readiness fails until the cache is warm; liveness is not
//! exposed, so `/live` always answers `200 OK`.
//!
//! A custom subscriber prints probe failures next to the default log output.
//!
//! ## Run
//! ```bash
//! cargo run --example runnable_service
//! curl -i localhost:8086/ready   # 503 "cache is warming" for ~3s, then 200 OK
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use procvisor::{
    Event, EventKind, LogFormat, LogWriter, OpError, ProcessConfig, Readiness, Runnable, Scope,
    Subscribe, Supervisor, init_logging,
};

struct CacheService {
    warm: AtomicBool,
}

#[async_trait]
impl Runnable for CacheService {
    async fn serve(&self, scope: Scope) -> Result<(), OpError> {
        scope.sleep(Duration::from_secs(3)).await?;
        self.warm.store(true, Ordering::SeqCst);
        tracing::info!("cache warm");

        scope.cancelled().await;
        Ok(())
    }

    async fn clean(&self, _scope: Scope) -> Result<(), OpError> {
        self.warm.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "cache-service"
    }

    fn as_readiness(&self) -> Option<&dyn Readiness> {
        Some(self)
    }
}

#[async_trait]
impl Readiness for CacheService {
    async fn readiness(&self, _scope: Scope) -> Result<(), OpError> {
        if self.warm.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(OpError::fail("cache is warming"))
        }
    }
}

struct ProbeAlerts;

#[async_trait]
impl Subscribe for ProbeAlerts {
    async fn on_event(&self, ev: &Event) {
        if ev.kind == EventKind::ProbeFailed {
            println!(
                "[alert] probe={} error={}",
                ev.name.as_deref().unwrap_or("?"),
                ev.reason.as_deref().unwrap_or("?"),
            );
        }
    }

    fn name(&self) -> &'static str {
        "probe-alerts"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LogFormat::Text)?;

    let service = Arc::new(CacheService {
        warm: AtomicBool::new(false),
    });

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter), Arc::new(ProbeAlerts)];
    Supervisor::builder(ProcessConfig::well_known())
        .with_subscribers(subscribers)
        .build()
        .run(service)
        .await?;
    Ok(())
}
