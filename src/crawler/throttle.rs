//! Politeness delay between requests of one page sequence

use crate::config::FetchPolicy;
use std::time::Duration;

/// Longest base delay a policy can ask for
pub const MAX_DELAY: Duration = Duration::from_secs(3600);

/// Randomized delay derived from a fetch policy
///
/// Each wait lasts `delay * (1 + randomize_factor * u)` with `u` drawn
/// uniformly from `[-1, 1]`, so a factor of 0.5 spreads waits over
/// `[0.5 * delay, 1.5 * delay]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    delay: Duration,
    randomize_factor: f64,
}

impl Throttle {
    /// Builds a throttle, clamping out-of-range policy values
    ///
    /// Delays above [`MAX_DELAY`] are capped to it.
    pub fn from_policy(policy: &FetchPolicy) -> Self {
        let delay = if policy.delay > 0.0 {
            Duration::try_from_secs_f64(policy.delay)
                .unwrap_or(MAX_DELAY)
                .min(MAX_DELAY)
        } else {
            Duration::ZERO
        };

        let randomize_factor = if policy.randomize_factor.is_finite() {
            policy.randomize_factor.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            delay,
            randomize_factor,
        }
    }

    /// A throttle that never waits
    pub fn none() -> Self {
        Self {
            delay: Duration::ZERO,
            randomize_factor: 0.0,
        }
    }

    pub fn base_delay(&self) -> Duration {
        self.delay
    }

    /// Draws the next delay
    pub fn next_delay(&self) -> Duration {
        if self.delay.is_zero() || self.randomize_factor == 0.0 {
            return self.delay;
        }

        let u = fastrand::f64() * 2.0 - 1.0;
        let scale = 1.0 + self.randomize_factor * u;
        Duration::try_from_secs_f64(self.delay.as_secs_f64() * scale).unwrap_or(self.delay)
    }

    /// Sleeps for the next delay
    pub async fn wait(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            tracing::trace!("Throttling for {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}
