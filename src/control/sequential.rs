use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::OpError,
    ops::{OpRef, Operation, Scope},
};

/// Runs operands left to right with the same scope, stopping at the first failure.
pub struct Sequential {
    ops: Vec<OpRef>,
}

#[async_trait]
impl Operation for Sequential {
    fn name(&self) -> &str {
        "sequential"
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        for op in &self.ops {
            op.run(scope.clone()).await?;
        }
        Ok(())
    }
}

/// Composes `ops` into one operation that runs them in order.
///
/// Operand `i` runs only if operands `0..i` all succeeded; the first failure is returned as is.
pub fn sequential(ops: impl IntoIterator<Item = OpRef>) -> OpRef {
    Arc::new(Sequential {
        ops: ops.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::testing::{calls, counting};

    #[tokio::test]
    async fn runs_every_operand_once_on_success() {
        let (a, ca) = counting("a", Ok(()));
        let (b, cb) = counting("b", Ok(()));
        let (c, cc) = counting("c", Ok(()));

        let res = sequential(vec![a, b, c]).run(Scope::new()).await;

        assert_eq!(res, Ok(()));
        assert_eq!((calls(&ca), calls(&cb), calls(&cc)), (1, 1, 1));
    }

    #[tokio::test]
    async fn short_circuits_on_first_failure() {
        let (a, ca) = counting("a", Ok(()));
        let (b, cb) = counting("b", Err(OpError::fail("b broke")));
        let (c, cc) = counting("c", Ok(()));

        let res = sequential(vec![a, b, c]).run(Scope::new()).await;

        assert_eq!(res, Err(OpError::fail("b broke")));
        assert_eq!(calls(&ca), 1);
        assert_eq!(calls(&cb), 1);
        assert_eq!(calls(&cc), 0);
    }

    #[tokio::test]
    async fn empty_sequence_succeeds() {
        assert_eq!(sequential(Vec::new()).run(Scope::new()).await, Ok(()));
    }

    #[tokio::test]
    async fn preserves_order() {
        use std::sync::Mutex;

        use crate::OpFn;

        let log = Arc::new(Mutex::new(Vec::new()));
        let ops: Vec<OpRef> = (0..5)
            .map(|i| {
                let log = Arc::clone(&log);
                let op: OpRef = OpFn::arc(format!("step-{i}"), move |_s: Scope| {
                    let log = Arc::clone(&log);
                    async move {
                        log.lock().unwrap().push(i);
                        Ok::<_, OpError>(())
                    }
                });
                op
            })
            .collect();

        sequential(ops).run(Scope::new()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }
}
