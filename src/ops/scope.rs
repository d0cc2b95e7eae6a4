//! # Hierarchical cancellation scope.
//!
//! [`Scope`] pairs a [`CancellationToken`] with an optional deadline. Scopes
//! form a tree: cancelling a parent cancels every child, and a derived scope
//! may tighten the inherited deadline but never loosen it.
//!
//! ```text
//! root (no deadline)
//!   ├─► child()                 same deadline, own token
//!   └─► with_timeout(30s) ──► ScopeGuard
//!          │                    ├─ deadline = min(parent, now + 30s)
//!          │                    └─ timer task: sleep_until(deadline) → cancel
//!          └─► drop(guard)      cancel child + stop timer
//! ```
//!
//! ## Rules
//! - Cancellation is cooperative: a scope only *signals*; operations observe it
//!   through [`Scope::cancelled`], [`Scope::check`] or [`Scope::sleep`].
//! - A bounded scope owns exactly one timer task, released when its
//!   [`ScopeGuard`] drops (early return and unwinding included).

use std::{ops::Deref, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, Instant},
};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::OpError;

/// Cancellation signal plus optional deadline, cheap to clone.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Scope {
    /// Creates a root scope with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a child scope inheriting this scope's deadline and cancellation.
    pub fn child(&self) -> Scope {
        Scope {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derives a bounded child scope whose deadline is `timeout` from now.
    ///
    /// The effective deadline never exceeds the parent's.
    pub fn with_timeout(&self, timeout: Duration) -> ScopeGuard {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derives a bounded child scope expiring at `deadline` (or the parent's deadline, if earlier).
    ///
    /// Must be called from within a tokio runtime: the deadline is enforced by a timer task.
    pub fn with_deadline(&self, deadline: Instant) -> ScopeGuard {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        let scope = Scope {
            token: self.token.child_token(),
            deadline: Some(deadline),
        };

        let timer_token = scope.token.clone();
        let timer = tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep_until(deadline) => timer_token.cancel(),
                _ = timer_token.cancelled() => {}
            }
        });

        ScopeGuard {
            scope,
            timer: Some(timer),
        }
    }

    /// Cancels this scope and all of its descendants.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once this scope is cancelled or its deadline fires.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline (`Some(ZERO)` once passed, `None` without a deadline).
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Returns why the scope is done, or `None` while it is still live.
    ///
    /// - [`OpError::DeadlineExceeded`] once the deadline has passed,
    /// - [`OpError::Canceled`] for explicit cancellation (own or inherited).
    pub fn error(&self) -> Option<OpError> {
        if !self.token.is_cancelled() {
            return None;
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(OpError::DeadlineExceeded),
            _ => Some(OpError::Canceled),
        }
    }

    /// `Err` with [`Scope::error`] if the scope is done; `Ok(())` otherwise.
    pub fn check(&self) -> Result<(), OpError> {
        match self.error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Sleeps for `dur`, returning early with the scope's error on cancellation.
    pub async fn sleep(&self, dur: Duration) -> Result<(), OpError> {
        tokio::select! {
            _ = time::sleep(dur) => Ok(()),
            _ = self.token.cancelled() => self.check(),
        }
    }

    /// Returns a guard that cancels this scope when dropped.
    pub fn drop_guard(&self) -> DropGuard {
        self.token.clone().drop_guard()
    }

    /// Underlying token, for interop with APIs that take a [`CancellationToken`].
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Owner of a bounded scope created by [`Scope::with_timeout`] / [`Scope::with_deadline`].
///
/// Dropping the guard cancels the scope and releases its timer.
#[derive(Debug)]
pub struct ScopeGuard {
    scope: Scope,
    timer: Option<JoinHandle<()>>,
}

impl ScopeGuard {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Deref for ScopeGuard {
    type Target = Scope;

    fn deref(&self) -> &Scope {
        &self.scope
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        self.scope.cancel();
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
