//! Exponential backoff state machine gating stream reconnects.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::BackoffPolicy;

const MIN_DELAY_MS: u64 = 10;

/// Tracks consecutive connection failures and produces jittered delays.
pub struct BackoffState {
    policy: BackoffPolicy,
    current: Duration,
    failures: u32,
    healthy_since: Option<Instant>,
    rng: StdRng,
}

impl BackoffState {
    /// Create a new state machine from the supplied policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            current: policy.base,
            failures: 0,
            healthy_since: None,
            rng: StdRng::from_entropy(),
            policy,
        }
    }

    /// Record a successful write.
    pub fn record_success(&mut self, now: Instant) {
        self.healthy_since.get_or_insert(now);
    }

    /// Delay before the next connection attempt following a failure.
    ///
    /// The window doubles per consecutive failure up to the cap and resets to
    /// the base once the previous connection stayed healthy for
    /// `reset_after`.
    pub fn next_delay(&mut self, now: Instant) -> Duration {
        if let Some(since) = self.healthy_since.take()
            && now.duration_since(since) >= self.policy.reset_after
        {
            self.current = self.policy.base;
            self.failures = 0;
        }
        if self.failures > 0 {
            self.current = self.current.saturating_mul(2).min(self.policy.cap);
        }
        self.failures = self.failures.saturating_add(1);

        let max_ms = self.current.as_millis().min(u128::from(u64::MAX)) as u64;
        let delay_ms = match max_ms {
            0 => MIN_DELAY_MS,
            1..=MIN_DELAY_MS => max_ms,
            _ => self.rng.gen_range(MIN_DELAY_MS..=max_ms),
        };
        Duration::from_millis(delay_ms)
    }
}
