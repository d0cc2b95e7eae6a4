use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::OpError,
    ops::{OpRef, Operation, Scope},
};

/// Commit with compensating rollback.
///
/// On commit failure the rollback runs exactly once and *its* outcome is
/// returned; the commit failure itself is not. Callers that need the commit
/// failure must capture it inside the commit operation.
pub struct Atomic {
    commit: OpRef,
    rollback: OpRef,
}

#[async_trait]
impl Operation for Atomic {
    fn name(&self) -> &str {
        "atomic"
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        match self.commit.run(scope.clone()).await {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!(
                    commit = self.commit.name(),
                    rollback = self.rollback.name(),
                    error = %err,
                    "commit failed, rolling back"
                );
                self.rollback.run(scope).await
            }
        }
    }
}

/// Runs `commit`; if it fails, runs `rollback` and returns rollback's outcome.
pub fn atomic(commit: OpRef, rollback: OpRef) -> OpRef {
    Arc::new(Atomic { commit, rollback })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::testing::{calls, counting};

    #[tokio::test]
    async fn successful_commit_skips_rollback() {
        let (commit, cc) = counting("commit", Ok(()));
        let (rollback, rc) = counting("rollback", Ok(()));

        assert_eq!(atomic(commit, rollback).run(Scope::new()).await, Ok(()));
        assert_eq!(calls(&cc), 1);
        assert_eq!(calls(&rc), 0);
    }

    #[tokio::test]
    async fn failed_commit_returns_rollback_success() {
        let (commit, _) = counting("commit", Err(OpError::fail("write failed")));
        let (rollback, rc) = counting("rollback", Ok(()));

        assert_eq!(atomic(commit, rollback).run(Scope::new()).await, Ok(()));
        assert_eq!(calls(&rc), 1);
    }

    #[tokio::test]
    async fn failed_commit_returns_rollback_failure() {
        let (commit, _) = counting("commit", Err(OpError::fail("write failed")));
        let (rollback, rc) = counting("rollback", Err(OpError::fail("undo failed")));

        let res = atomic(commit, rollback).run(Scope::new()).await;

        assert_eq!(res, Err(OpError::fail("undo failed")));
        assert_eq!(calls(&rc), 1);
    }
}
