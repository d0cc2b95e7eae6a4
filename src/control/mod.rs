//! # Combinators over operations.
//!
//! Every combinator takes [`OpRef`](crate::OpRef)s and returns a new one. The
//! returned operation runs its operands with the scope it is given; only
//! [`timeout`] derives a new (bounded) scope.
//!
//! | Combinator | Runs | Result |
//! |---|---|---|
//! | [`sequential`] | in order, stops at first failure | first failure or success |
//! | [`parallel`] | all concurrently, waits for all | [`AggregateError`](crate::AggregateError) of every failure |
//! | [`timeout`] | once, with a bounded child scope | operand's result |
//! | [`retry`] / [`retry_with_backoff`] | up to `attempts` times | first success or last failure |
//! | [`ignore_error`] | once | always success |
//! | [`atomic`] | commit, then rollback on failure | success, or rollback's result |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::{OpError, OpFn, OpRef, Scope, ignore_error, retry, sequential, timeout};
//!
//! # async fn demo() -> Result<(), OpError> {
//! let connect: OpRef = OpFn::arc("connect-db", |_s: Scope| async { Ok(()) });
//! let warm: OpRef = OpFn::arc("warm-cache", |_s: Scope| async { Err(OpError::fail("cold")) });
//!
//! let startup = sequential(vec![
//!     timeout(retry(connect, 3, Duration::from_millis(200)), Duration::from_secs(5)),
//!     ignore_error(warm),
//! ]);
//! startup.run(Scope::new()).await?;
//! # Ok(())
//! # }
//! ```

mod atomic;
mod ignore;
mod parallel;
mod retry;
mod sequential;
mod timeout;

pub use atomic::{Atomic, atomic};
pub use ignore::{IgnoreError, ignore_error};
pub use parallel::{Parallel, parallel};
pub use retry::{Retry, retry, retry_with_backoff};
pub use sequential::{Sequential, sequential};
pub use timeout::{Timeout, timeout};
