//! # Process configuration.
//!
//! [`ProcessConfig`] is fixed once the supervisor is built; defaults are
//! resolved a single time by the builder.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use procvisor::{FailurePolicy, ProcessConfig};
//!
//! let mut cfg = ProcessConfig::well_known();
//! cfg.shutdown_timeout = Duration::from_secs(10);
//! cfg.failure_policy = FailurePolicy::Exit;
//!
//! assert_eq!(cfg.health_addr_or_default().port(), 8086);
//! ```

use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

/// Port used by [`ProcessConfig::well_known`].
pub const DEFAULT_HEALTH_PORT: u16 = 8086;

/// Budget shared by Clean and the health listener shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit status used by [`FailurePolicy::Exit`] after Serve or Clean failed.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Exit status used when graceful shutdown misses its deadline.
pub const WATCHDOG_EXIT_CODE: i32 = 2;

/// What the supervisor does with Serve/Clean failures once shutdown has finished.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure; `run` returns normally.
    #[default]
    Log,
    /// Log the failure, finish the graceful shutdown, then exit the process
    /// with [`FATAL_EXIT_CODE`].
    Exit,
}

/// Configuration for one supervised process.
#[derive(Clone, Debug)]
pub struct ProcessConfig {
    /// Health listener address. `None` binds `0.0.0.0:0` (OS-assigned port).
    pub health_addr: Option<SocketAddr>,
    /// Deadline for Clean plus health listener shutdown; the watchdog fires after it.
    pub shutdown_timeout: Duration,
    pub failure_policy: FailurePolicy,
    /// Capacity of the event bus channel.
    pub bus_capacity: usize,
}

impl Default for ProcessConfig {
    /// - `health_addr = None` (ephemeral port)
    /// - `shutdown_timeout = 30s`
    /// - `failure_policy = Log`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            health_addr: None,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            failure_policy: FailurePolicy::default(),
            bus_capacity: 1024,
        }
    }
}

impl ProcessConfig {
    /// Defaults, with the health listener on the fixed `0.0.0.0:8086`.
    pub fn well_known() -> Self {
        Self {
            health_addr: Some(SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_HEALTH_PORT))),
            ..Self::default()
        }
    }

    pub fn health_addr_or_default(&self) -> SocketAddr {
        self.health_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)))
    }

    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}
