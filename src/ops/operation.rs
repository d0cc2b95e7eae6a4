//! # Operation abstraction.
//!
//! An [`Operation`] is a cancellable, fallible unit of work. It receives the
//! [`Scope`] of its caller and should observe it to stop cooperatively.
//! The common handle type is [`OpRef`], an `Arc<dyn Operation>` that
//! combinators and the supervisor share freely.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{error::OpError, ops::Scope};

/// Shared handle to an operation.
pub type OpRef = Arc<dyn Operation>;

/// # Asynchronous, cancellable unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use procvisor::{OpError, Operation, Scope};
///
/// struct Ping;
///
/// #[async_trait]
/// impl Operation for Ping {
///     fn name(&self) -> &str { "ping" }
///
///     async fn run(&self, scope: Scope) -> Result<(), OpError> {
///         scope.check()?;
///         // talk to the network...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Operation: Send + Sync + 'static {
    /// Returns a stable, human-readable name used in logs.
    fn name(&self) -> &str;

    /// Runs the operation to completion.
    ///
    /// Implementations should watch `scope` and return promptly once it is cancelled.
    async fn run(&self, scope: Scope) -> Result<(), OpError>;
}

/// Always-succeed operation, used wherever a callback is left unset.
#[derive(Debug, Clone)]
pub struct Noop {
    name: &'static str,
}

#[async_trait]
impl Operation for Noop {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, _scope: Scope) -> Result<(), OpError> {
        Ok(())
    }
}

/// Returns an operation that does nothing and succeeds.
pub fn noop(name: &'static str) -> OpRef {
    Arc::new(Noop { name })
}
