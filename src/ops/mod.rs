//! # Operations and cancellation scopes.
//!
//! This module provides the primitives every other part of the crate composes:
//! - [`Operation`] - trait for async, cancellable, fallible units of work
//! - [`OpFn`] - closure-backed operation
//! - [`OpRef`] - shared handle (`Arc<dyn Operation>`)
//! - [`Scope`] / [`ScopeGuard`] - hierarchical cancellation with deadlines

mod op_fn;
mod operation;
mod scope;

pub use op_fn::OpFn;
pub use operation::{Noop, OpRef, Operation, noop};
pub use scope::{Scope, ScopeGuard};
