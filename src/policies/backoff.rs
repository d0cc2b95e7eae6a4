//! # Delay policy between retry attempts.
//!
//! [`BackoffPolicy`] decides how long [`retry_with_backoff`](crate::retry_with_backoff)
//! waits after a failed attempt. The delay after failure `n` (0-based) is
//! `first × factor^n`, clamped to `max`, then jitter is applied. The base is
//! derived from the attempt number alone, so jitter never feeds back into
//! later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(10));
//!
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//!
//! let fixed = BackoffPolicy::constant(Duration::from_millis(250));
//! assert_eq!(fixed.next(7), Duration::from_millis(250));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry delay policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Multiplicative growth factor (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied on top of the computed delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Constant 100ms delay, no jitter.
    fn default() -> Self {
        Self::constant(Duration::from_millis(100))
    }
}

impl BackoffPolicy {
    /// The same `delay` after every failure.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Doubling delays starting at `first`, capped at `max`.
    pub fn exponential(first: Duration, max: Duration) -> Self {
        Self {
            first,
            max,
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Returns a copy with the given jitter.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Computes the delay after failed attempt `attempt` (0-indexed).
    pub fn next(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let clamped_exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs >= max_secs {
                self.max
            } else {
                Duration::from_secs_f64(unclamped_secs)
            };

        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_policy_never_grows() {
        let policy = BackoffPolicy::constant(Duration::from_millis(500));
        for attempt in 0..10 {
            assert_eq!(policy.next(attempt), Duration::from_millis(500));
        }
    }

    #[test]
    fn zero_delay_stays_zero() {
        let policy = BackoffPolicy::constant(Duration::ZERO);
        assert_eq!(policy.next(0), Duration::ZERO);
        assert_eq!(policy.next(42), Duration::ZERO);
    }

    #[test]
    fn exponential_doubles_until_cap() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_millis(1000));

        assert_eq!(policy.next(0), Duration::from_millis(100));
        assert_eq!(policy.next(1), Duration::from_millis(200));
        assert_eq!(policy.next(2), Duration::from_millis(400));
        assert_eq!(policy.next(3), Duration::from_millis(800));
        assert_eq!(policy.next(4), Duration::from_millis(1000));
    }

    #[test]
    fn first_larger_than_max_is_clamped() {
        let policy = BackoffPolicy::exponential(Duration::from_secs(10), Duration::from_secs(5));
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn overflowing_exponent_clamps_to_max() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(10));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn maximal_constant_delay_does_not_overflow() {
        let policy = BackoffPolicy::constant(Duration::MAX);
        assert_eq!(policy.next(0), Duration::MAX);
        assert_eq!(policy.next(3), Duration::MAX);
    }

    #[test]
    fn equal_jitter_stays_within_half_and_full_base() {
        let policy = BackoffPolicy::constant(Duration::from_millis(1000))
            .with_jitter(JitterPolicy::Equal);
        for attempt in 0..50 {
            let delay = policy.next(attempt);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn full_jitter_never_exceeds_base() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(30))
                .with_jitter(JitterPolicy::Full);
        for attempt in 0..12 {
            let base_ms = (100.0 * 2.0f64.powi(attempt as i32)).min(30_000.0);
            assert!(policy.next(attempt) <= Duration::from_millis(base_ms as u64));
        }
    }

    #[test]
    fn decorrelated_jitter_respects_floor() {
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(30))
                .with_jitter(JitterPolicy::Decorrelated);
        for _ in 0..100 {
            assert!(policy.next(8) >= Duration::from_millis(100));
        }
    }
}
