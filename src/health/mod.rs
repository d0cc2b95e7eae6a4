//! # Health endpoints.
//!
//! - [`probe_route`] / [`health_router`]: turn optional probe operations into
//!   `GET /live` and `GET /ready` handlers (`200 OK` or `503 <error>`).
//! - [`HealthServer`]: the background listener the supervisor runs them on.
//! - [`http_get_check`]: a probe operation that checks another HTTP endpoint.

mod check;
mod handler;
mod server;

pub use check::{HttpGetCheck, http_get_check};
pub use handler::{LIVE_PATH, READY_PATH, ProbeContext, health_router, probe_route};
pub use server::HealthServer;
