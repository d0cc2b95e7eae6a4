use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    error::OpError,
    ops::{OpRef, Operation, Scope},
};

/// Runs the operand under a child scope that expires after `timeout`.
///
/// Cancellation is cooperative: an operand that ignores its scope runs to
/// natural completion and its own result is returned.
pub struct Timeout {
    op: OpRef,
    timeout: Duration,
}

#[async_trait]
impl Operation for Timeout {
    fn name(&self) -> &str {
        "timeout"
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        let bounded = scope.with_timeout(self.timeout);
        self.op.run(bounded.scope().clone()).await
    }
}

/// Wraps `op` so it observes a deadline `timeout` from invocation time.
pub fn timeout(op: OpRef, timeout: Duration) -> OpRef {
    Arc::new(Timeout { op, timeout })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;
    use crate::{OpFn, parallel};

    fn ticking(total: Duration) -> OpRef {
        OpFn::arc("ticker", move |scope: Scope| async move {
            let started = Instant::now();
            while started.elapsed() < total {
                scope.check()?;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            Ok::<_, OpError>(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn cooperative_operand_stops_near_deadline() {
        let op = timeout(ticking(Duration::from_secs(2)), Duration::from_millis(50));

        let started = Instant::now();
        let res = op.run(Scope::new()).await;
        let elapsed = started.elapsed();

        assert_eq!(res, Err(OpError::DeadlineExceeded));
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(100), "took {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn fast_operand_is_unaffected() {
        let op = timeout(ticking(Duration::from_millis(10)), Duration::from_millis(50));
        assert_eq!(op.run(Scope::new()).await, Ok(()));
    }

    #[tokio::test(start_paused = true)]
    async fn non_cooperating_operand_runs_to_completion() {
        let stubborn: OpRef = OpFn::arc("stubborn", |_s: Scope| async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, OpError>(())
        });

        let started = Instant::now();
        let res = timeout(stubborn, Duration::from_millis(50)).run(Scope::new()).await;

        assert_eq!(res, Ok(()));
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_reaches_operand() {
        let root = Scope::new();
        let op = timeout(ticking(Duration::from_secs(10)), Duration::from_secs(5));

        let canceller = root.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        assert_eq!(op.run(root).await, Err(OpError::Canceled));
    }

    #[tokio::test]
    async fn panicking_operand_releases_bounded_scope() {
        let seen: Arc<Mutex<Option<Scope>>> = Arc::default();
        let boom: OpRef = {
            let seen = Arc::clone(&seen);
            OpFn::arc("boom", move |scope: Scope| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.lock().unwrap().replace(scope);
                    if true {
                        panic!("operand blew up");
                    }
                    Ok::<_, OpError>(())
                }
            })
        };

        let err = parallel(vec![timeout(boom, Duration::from_secs(60))])
            .run(Scope::new())
            .await
            .unwrap_err();
        assert!(err.includes(&OpError::Panicked {
            reason: "operand blew up".into()
        }));

        let bounded = seen.lock().unwrap().take().expect("operand ran");
        assert!(bounded.is_cancelled());
        assert_eq!(bounded.error(), Some(OpError::Canceled));

        let metrics = tokio::runtime::Handle::current().metrics();
        for _ in 0..16 {
            if metrics.num_alive_tasks() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(metrics.num_alive_tasks(), 0, "deadline timer outlived its scope");
    }
}
