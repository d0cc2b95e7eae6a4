use std::{io, net::SocketAddr, time::Duration};

use axum::Router;
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use crate::error::RuntimeError;

/// Background HTTP listener serving the health router.
///
/// Dropping the server without calling [`shutdown`](Self::shutdown) still
/// stops accepting connections; in-flight requests are then not awaited.
pub struct HealthServer {
    addr: SocketAddr,
    stop: CancellationToken,
    task: JoinHandle<io::Result<()>>,
    _stop_on_drop: DropGuard,
}

impl HealthServer {
    /// Binds `addr` and starts serving `router` on a background task.
    pub async fn bind(addr: SocketAddr, router: Router) -> Result<Self, RuntimeError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RuntimeError::HealthBind { addr, source })?;
        let local = listener
            .local_addr()
            .map_err(|source| RuntimeError::HealthBind { addr, source })?;

        let stop = CancellationToken::new();
        let signal = stop.clone();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.cancelled().await })
                .await
        });

        debug!(%local, "health listener bound");
        Ok(Self {
            addr: local,
            _stop_on_drop: stop.clone().drop_guard(),
            stop,
            task,
        })
    }

    /// Bound address, with an OS-assigned port resolved.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting and waits at most `budget` for in-flight requests.
    ///
    /// On timeout the serving task is aborted.
    pub async fn shutdown(self, budget: Duration) -> Result<(), RuntimeError> {
        self.stop.cancel();

        let mut task = self.task;
        let joined = match tokio::time::timeout(budget, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                task.abort();
                return Err(RuntimeError::HealthShutdownTimeout { budget });
            }
        };

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(RuntimeError::HealthServe(err)),
            Err(join_err) => Err(RuntimeError::HealthTask {
                reason: join_err.to_string(),
            }),
        }
    }
}
