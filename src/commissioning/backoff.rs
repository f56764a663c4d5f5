//! Exponential rejoin backoff.
//!
//! Delays grow by `growth_numerator / growth_denominator` per failed
//! attempt, capped at the ceiling.  Arithmetic is truncating integer
//! math on whole seconds, so the default 1.2× growth from 10 s yields
//! 12 s, 14 s, 16 s, 19 s, ...  A start below `den / (num - den)`
//! seconds would truncate back to itself and never grow; config
//! validation rejects it.  Once the attempt budget is spent the
//! policy keeps answering with the ceiling delay forever: the device
//! never gives up, it only slows down.

use core::time::Duration;

use crate::config::BackoffConfig;

/// Output of one [`BackoffPolicy::next_delay`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffStep {
    pub delay: Duration,
    pub attempts_remaining: u8,
    /// The budget was already spent; `delay` is the ceiling.
    pub exhausted: bool,
}

/// Pure backoff computation.  No state, no side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    config: BackoffConfig,
}

impl BackoffPolicy {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    pub fn initial_delay(&self) -> Duration {
        self.config.initial_delay()
    }

    pub fn max_delay(&self) -> Duration {
        self.config.max_delay()
    }

    /// Compute the delay for the next attempt.
    pub fn next_delay(&self, current: Duration, attempts_remaining: u8) -> BackoffStep {
        if attempts_remaining == 0 {
            return BackoffStep {
                delay: self.max_delay(),
                attempts_remaining: 0,
                exhausted: true,
            };
        }

        let grown = current.as_secs().saturating_mul(u64::from(self.config.growth_numerator))
            / u64::from(self.config.growth_denominator.max(1));
        let delay = Duration::from_secs(grown).min(self.max_delay());

        BackoffStep {
            delay,
            attempts_remaining: attempts_remaining - 1,
            exhausted: false,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}

/// Retry bookkeeping for one recovery episode.
///
/// Owned by the state machine; `current_delay` never decreases between
/// two resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempts_remaining: u8,
    pub current_delay: Duration,
}

impl RetryState {
    /// Full budget at the initial delay.
    pub fn initial(policy: &BackoffPolicy) -> Self {
        Self {
            attempts_remaining: policy.config().max_attempts,
            current_delay: policy.initial_delay(),
        }
    }

    pub fn reset(&mut self, policy: &BackoffPolicy) {
        *self = Self::initial(policy);
    }

    /// Advance by one failed attempt and return the delay to wait.
    pub fn advance(&mut self, policy: &BackoffPolicy) -> BackoffStep {
        let step = policy.next_delay(self.current_delay, self.attempts_remaining);
        self.current_delay = step.delay;
        self.attempts_remaining = step.attempts_remaining;
        step
    }
}
