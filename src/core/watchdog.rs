//! Forced-exit watchdog.
//!
//! Armed while Clean runs under the shutdown deadline; if it is still armed
//! when the deadline passes, the whole process exits with [`WATCHDOG_EXIT_CODE`] without
//! running any further cleanup. This is the only place that terminates the
//! process on a deadline.

use std::time::Duration;

use tokio::{task::JoinHandle, time::Instant};
use tracing::error;

use crate::config::WATCHDOG_EXIT_CODE;

pub(crate) struct Watchdog {
    timer: JoinHandle<()>,
}

impl Watchdog {
    pub(crate) fn arm(deadline: Instant, budget: Duration) -> Self {
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            error!(
                timeout_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX),
                exit_code = WATCHDOG_EXIT_CODE,
                "graceful shutdown missed its deadline, forcing exit"
            );
            abort_process();
        });
        Self { timer }
    }

    pub(crate) fn disarm(self) {
        drop(self);
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

fn abort_process() -> ! {
    std::process::exit(WATCHDOG_EXIT_CODE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn disarmed_watchdog_never_fires() {
        let budget = Duration::from_millis(10);
        let dog = Watchdog::arm(Instant::now() + budget, budget);
        dog.disarm();

        // Exiting here would take the whole test binary down.
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
