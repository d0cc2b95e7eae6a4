//! # Concurrent fan-out with failure aggregation.
//!
//! ```text
//! run(scope)
//!   ├──► spawn op[0](scope) ─┐
//!   ├──► spawn op[1](scope) ─┼──► JoinSet: wait for all
//!   └──► spawn op[N](scope) ─┘        │
//!                                     └─► failures (operand order) → AggregateError
//! ```
//!
//! ## Rules
//! - No cancellation fan-out: a failing operand does not stop its siblings.
//! - A panicking operand is recovered into [`OpError::Panicked`].
//! - Dropping the returned future aborts workers still in flight.

use std::{panic::AssertUnwindSafe, sync::Arc};

use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::warn;

use crate::{
    error::{AggregateError, OpError, panic_message},
    ops::{OpRef, Operation, Scope},
};

/// Runs every operand concurrently and aggregates their failures.
pub struct Parallel {
    ops: Vec<OpRef>,
}

#[async_trait]
impl Operation for Parallel {
    fn name(&self) -> &str {
        "parallel"
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        let mut set = JoinSet::new();
        for (idx, op) in self.ops.iter().enumerate() {
            let op = Arc::clone(op);
            let scope = scope.clone();
            set.spawn(async move {
                let res = AssertUnwindSafe(op.run(scope))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|payload| {
                        Err(OpError::Panicked {
                            reason: panic_message(&*payload),
                        })
                    });
                (idx, res)
            });
        }

        let mut slots: Vec<Option<OpError>> = vec![None; self.ops.len()];
        let mut lost = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, Err(err))) => slots[idx] = Some(err),
                Ok((_, Ok(()))) => {}
                Err(join_err) => {
                    warn!(error = %join_err, "parallel worker did not complete");
                    lost.push(OpError::Panicked {
                        reason: join_err.to_string(),
                    });
                }
            }
        }

        let failures: Vec<OpError> = slots.into_iter().flatten().chain(lost).collect();
        match AggregateError::from_errors(failures) {
            Some(agg) => Err(OpError::Aggregate(agg)),
            None => Ok(()),
        }
    }
}

/// Composes `ops` into one operation that runs them all concurrently.
///
/// Success iff every operand succeeded; otherwise an [`OpError::Aggregate`]
/// holding each failure in operand order.
pub fn parallel(ops: impl IntoIterator<Item = OpRef>) -> OpRef {
    Arc::new(Parallel {
        ops: ops.into_iter().collect(),
    })
}
