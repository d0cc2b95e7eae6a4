//! # Function-backed operation (`OpFn`)
//!
//! [`OpFn`] wraps a closure `F: Fn(Scope) -> Fut`, producing a fresh future
//! per invocation. No state is shared between invocations; if an operation
//! needs shared state, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use procvisor::{OpError, OpFn, OpRef, Operation, Scope};
//!
//! let op: OpRef = OpFn::arc("connect-db", |scope: Scope| async move {
//!     scope.check()?;
//!     // connect...
//!     Ok::<_, OpError>(())
//! });
//!
//! assert_eq!(op.name(), "connect-db");
//! ```

use std::{borrow::Cow, future::Future, sync::Arc};

use async_trait::async_trait;

use crate::{
    error::OpError,
    ops::{Operation, Scope},
};

/// Function-backed operation.
#[derive(Debug)]
pub struct OpFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> OpFn<F> {
    /// Creates a new function-backed operation.
    ///
    /// Prefer [`OpFn::arc`] when you immediately need an [`OpRef`](crate::OpRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the operation and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Operation for OpFn<F>
where
    F: Fn(Scope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), OpError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        (self.f)(scope).await
    }
}
