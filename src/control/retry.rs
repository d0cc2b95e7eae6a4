//! # Retry combinator.
//!
//! ```text
//! attempt 1 ── Err ──► sleep(backoff.next(0)) ──► attempt 2 ── Err ──► ... ──► attempt N ── Err ──► return Err
//!     └─ Ok ──► return Ok                                                       (no sleep after the last attempt)
//! ```
//!
//! ## Rules
//! - `attempts == 0` is treated as a single attempt.
//! - The wait between attempts observes the scope: once it is cancelled no
//!   further attempt starts and the last failure is returned.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::OpError,
    ops::{OpRef, Operation, Scope},
    policies::BackoffPolicy,
};

/// Runs the operand until it succeeds or the attempts are used up.
pub struct Retry {
    op: OpRef,
    attempts: u32,
    backoff: BackoffPolicy,
}

#[async_trait]
impl Operation for Retry {
    fn name(&self) -> &str {
        "retry"
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        let attempts = self.attempts.max(1);
        let mut attempt: u32 = 0;

        loop {
            let err = match self.op.run(scope.clone()).await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            attempt += 1;
            if attempt >= attempts {
                return Err(err);
            }

            let delay = self.backoff.next(attempt - 1);
            debug!(
                op = self.op.name(),
                attempt,
                attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying operation"
            );
            if !delay.is_zero() && scope.sleep(delay).await.is_err() {
                return Err(err);
            }
        }
    }
}

/// Retries `op` up to `attempts` times, waiting `delay` between attempts.
pub fn retry(op: OpRef, attempts: u32, delay: Duration) -> OpRef {
    retry_with_backoff(op, attempts, BackoffPolicy::constant(delay))
}

/// Retries `op` up to `attempts` times, waiting `backoff.next(n)` after failure `n`.
pub fn retry_with_backoff(op: OpRef, attempts: u32, backoff: BackoffPolicy) -> OpRef {
    Arc::new(Retry {
        op,
        attempts,
        backoff,
    })
}
