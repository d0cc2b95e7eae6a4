//! # The contract a supervised service fulfils.
//!
//! [`Runnable`] is required (`serve` + `clean`); [`Liveness`] and
//! [`Readiness`] are optional capabilities exposed through
//! [`Runnable::as_liveness`] / [`Runnable::as_readiness`]. A capability that is
//! not exposed is treated as "always healthy" and its route answers `200 OK`
//! without calling anything.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use procvisor::{OpError, Readiness, Runnable, Scope};
//!
//! struct Api;
//!
//! #[async_trait]
//! impl Runnable for Api {
//!     async fn serve(&self, scope: Scope) -> Result<(), OpError> {
//!         scope.cancelled().await;
//!         Ok(())
//!     }
//!     async fn clean(&self, _scope: Scope) -> Result<(), OpError> {
//!         Ok(())
//!     }
//!     fn as_readiness(&self) -> Option<&dyn Readiness> {
//!         Some(self)
//!     }
//! }
//!
//! #[async_trait]
//! impl Readiness for Api {
//!     async fn readiness(&self, _scope: Scope) -> Result<(), OpError> {
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::OpError,
    ops::{OpRef, Operation, Scope},
};

/// Optional liveness probe capability.
#[async_trait]
pub trait Liveness: Send + Sync {
    async fn liveness(&self, scope: Scope) -> Result<(), OpError>;
}

/// Optional readiness probe capability.
#[async_trait]
pub trait Readiness: Send + Sync {
    async fn readiness(&self, scope: Scope) -> Result<(), OpError>;
}

/// Object driven by the [`Supervisor`](crate::Supervisor).
#[async_trait]
pub trait Runnable: Send + Sync + 'static {
    /// Runs until the scope is cancelled or the service fails.
    async fn serve(&self, scope: Scope) -> Result<(), OpError>;

    /// Releases resources. The scope carries the shutdown deadline.
    async fn clean(&self, scope: Scope) -> Result<(), OpError>;

    /// Name used in logs and events.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn as_liveness(&self) -> Option<&dyn Liveness> {
        None
    }

    fn as_readiness(&self) -> Option<&dyn Readiness> {
        None
    }
}

#[async_trait]
impl<T: Runnable + ?Sized> Runnable for Arc<T> {
    async fn serve(&self, scope: Scope) -> Result<(), OpError> {
        (**self).serve(scope).await
    }

    async fn clean(&self, scope: Scope) -> Result<(), OpError> {
        (**self).clean(scope).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn as_liveness(&self) -> Option<&dyn Liveness> {
        (**self).as_liveness()
    }

    fn as_readiness(&self) -> Option<&dyn Readiness> {
        (**self).as_readiness()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Capability {
    Serve,
    Clean,
    Liveness,
    Readiness,
}

impl Capability {
    fn as_str(self) -> &'static str {
        match self {
            Capability::Serve => "serve",
            Capability::Clean => "clean",
            Capability::Liveness => "liveness",
            Capability::Readiness => "readiness",
        }
    }
}

/// One capability of a runnable, exposed as an operation.
struct RunnableOp<R: ?Sized> {
    runnable: Arc<R>,
    capability: Capability,
    name: String,
}

#[async_trait]
impl<R: Runnable + ?Sized> Operation for RunnableOp<R> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        match self.capability {
            Capability::Serve => self.runnable.serve(scope).await,
            Capability::Clean => self.runnable.clean(scope).await,
            Capability::Liveness => match self.runnable.as_liveness() {
                Some(probe) => probe.liveness(scope).await,
                None => Ok(()),
            },
            Capability::Readiness => match self.runnable.as_readiness() {
                Some(probe) => probe.readiness(scope).await,
                None => Ok(()),
            },
        }
    }
}

/// The single shape the supervisor drives, whichever construction style was used.
pub(crate) struct Resolved {
    pub(crate) serve: OpRef,
    pub(crate) clean: OpRef,
    pub(crate) live: Option<OpRef>,
    pub(crate) ready: Option<OpRef>,
}

impl Resolved {
    /// Probes the optional capabilities once and wraps every present one.
    pub(crate) fn from_runnable<R: Runnable + ?Sized>(runnable: Arc<R>) -> Self {
        let op = |capability: Capability| -> OpRef {
            Arc::new(RunnableOp {
                name: format!("{}.{}", runnable.name(), capability.as_str()),
                runnable: Arc::clone(&runnable),
                capability,
            })
        };

        Self {
            serve: op(Capability::Serve),
            clean: op(Capability::Clean),
            live: runnable.as_liveness().map(|_| op(Capability::Liveness)),
            ready: runnable.as_readiness().map(|_| op(Capability::Readiness)),
        }
    }
}
