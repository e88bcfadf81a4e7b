//! Adaptive throttling for network scans.
//!
//! Inserts a randomized pause after each probe and lengthens it once the
//! target starts failing probes (e.g. firewall resets), to soften an
//! aggressive scan.

use crate::error::{ConfigError, ConfigResult};
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::trace;

/// Tunables for the per-probe delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    /// Inclusive lower bound of the random base delay.
    pub min_delay: Duration,
    /// Exclusive upper bound of the random base delay.
    pub max_delay: Duration,
    /// Penalty applies once the error count exceeds this.
    pub error_threshold: usize,
    /// Extra delay per observed error once over the threshold.
    pub error_penalty: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(150),
            error_threshold: 5,
            error_penalty: Duration::from_millis(10),
        }
    }
}

impl ThrottlePolicy {
    /// Create a policy, rejecting an empty delay window.
    pub fn new(
        min_delay: Duration,
        max_delay: Duration,
        error_threshold: usize,
        error_penalty: Duration,
    ) -> ConfigResult<Self> {
        if min_delay >= max_delay {
            return Err(ConfigError::InvalidValue(format!(
                "throttle min delay ({:?}) must be below max delay ({:?})",
                min_delay, max_delay
            )));
        }
        Ok(Self {
            min_delay,
            max_delay,
            error_threshold,
            error_penalty,
        })
    }
}

/// Scan-wide throttle state shared by every worker.
#[derive(Debug)]
pub struct Throttle {
    policy: ThrottlePolicy,
    errors: AtomicUsize,
}

impl Throttle {
    pub fn new(policy: ThrottlePolicy) -> Self {
        Self {
            policy,
            errors: AtomicUsize::new(0),
        }
    }

    /// Count one failed probe. Returns the new total.
    pub fn record_error(&self) -> usize {
        self.errors.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Total failed probes observed so far in this scan.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Compute the next delay: random base plus the error penalty.
    pub fn delay(&self) -> Duration {
        let base = rand::thread_rng().gen_range(self.policy.min_delay..self.policy.max_delay);
        base + self.penalty(self.error_count())
    }

    fn penalty(&self, errors: usize) -> Duration {
        if errors > self.policy.error_threshold {
            self.policy
                .error_penalty
                .saturating_mul(u32::try_from(errors).unwrap_or(u32::MAX))
        } else {
            Duration::ZERO
        }
    }

    /// Sleep for one throttle delay.
    pub async fn pause(&self) {
        let delay = self.delay();
        trace!(delay_ms = delay.as_millis() as u64, "throttling");
        tokio::time::sleep(delay).await;
    }
}
