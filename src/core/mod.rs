//! Process supervision: lifecycle, signals, deadline enforcement.
//!
//! The public surface is [`Supervisor`] (with [`SupervisorBuilder`]), the
//! [`Runnable`] contract with its optional [`Liveness`] / [`Readiness`]
//! capabilities, the [`Process`] callback bundle, and [`SupervisorState`].
//!
//! Internal modules:
//! - `runnable`: capability probing and normalisation into operations;
//! - `shutdown`: termination signal registration;
//! - `watchdog`: forced exit when the shutdown deadline passes;
//! - `supervisor`: the run loop.

mod builder;
mod process;
mod runnable;
mod shutdown;
mod state;
mod supervisor;
mod watchdog;

pub use builder::SupervisorBuilder;
pub use process::{Process, ProcessBuilder};
pub use runnable::{Liveness, Readiness, Runnable};
pub use state::SupervisorState;
pub use supervisor::Supervisor;
