//! Retry delay policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how long to wait after each failed attempt (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! retry(op, attempts, delay)              == retry_with_backoff(op, attempts, BackoffPolicy::constant(delay))
//! retry_with_backoff(op, attempts, policy) └─► after failure n: sleep(policy.next(n)) unless n is the last attempt
//! ```

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
