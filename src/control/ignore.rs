use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    error::OpError,
    ops::{OpRef, Operation, Scope},
};

/// Runs the operand once and reports success whatever happened.
pub struct IgnoreError {
    op: OpRef,
}

#[async_trait]
impl Operation for IgnoreError {
    fn name(&self) -> &str {
        "ignore_error"
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        if let Err(err) = self.op.run(scope).await {
            debug!(op = self.op.name(), error = %err, "ignoring operation failure");
        }
        Ok(())
    }
}

/// Makes `op` best-effort: its failure never reaches the caller.
pub fn ignore_error(op: OpRef) -> OpRef {
    Arc::new(IgnoreError { op })
}
