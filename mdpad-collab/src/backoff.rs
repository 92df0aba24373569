//! Reconnection delays: exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnection attempt (default: 500ms).
    pub initial_delay: Duration,
    /// Upper bound on any single delay (default: 10s).
    pub max_delay: Duration,
    /// Multiplier per consecutive failure (default: 2.0).
    pub backoff_factor: f64,
    /// Random jitter as a fraction of the delay (default: 0.1 = ±10%).
    pub jitter_percent: f64,
    /// Give up after this many consecutive failures. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter_percent: 0.1,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    #[must_use]
    pub fn new(
        initial_delay: Duration,
        max_delay: Duration,
        backoff_factor: f64,
        jitter_percent: f64,
        max_attempts: Option<u32>,
    ) -> Self {
        Self {
            initial_delay,
            max_delay,
            backoff_factor: backoff_factor.max(1.0),
            jitter_percent: jitter_percent.clamp(0.0, 1.0),
            max_attempts,
        }
    }

    /// Fixed delay, no jitter. Handy for tests and offline mode.
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay, 1.0, 0.0, None)
    }

    /// Whether another attempt is allowed after `failures` consecutive
    /// failures.
    pub fn allows(&self, failures: u32) -> bool {
        self.max_attempts.map_or(true, |max| failures < max)
    }

    /// Delay before the attempt following `failures` consecutive failures.
    pub fn delay_for_attempt(&self, failures: u32) -> Duration {
        let initial_ms = u64::try_from(self.initial_delay.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_delay.as_millis()).unwrap_or(u64::MAX);

        let exp = failures.min(31) as i32;
        let base_ms = (initial_ms as f64) * self.backoff_factor.powi(exp);
        let base_ms = base_ms.min(max_ms as f64);

        let jitter = if self.jitter_percent > 0.0 {
            let range = base_ms * self.jitter_percent;
            rand::rng().random_range(-range..=range)
        } else {
            0.0
        };

        Duration::from_millis((base_ms + jitter).max(0.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter() -> ReconnectPolicy {
        ReconnectPolicy {
            jitter_percent: 0.0,
            ..ReconnectPolicy::default()
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.initial_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
        assert_eq!(policy.max_attempts, None);
        assert!(policy.allows(1_000_000));
    }

    #[test]
    fn test_exponential_growth_capped() {
        let policy = no_jitter();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(8000));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(10));
        assert_eq!(policy.delay_for_attempt(100), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let policy = ReconnectPolicy::default();
        for _ in 0..200 {
            let d = policy.delay_for_attempt(1).as_millis();
            assert!((900..=1100).contains(&d), "{d}");
        }
    }

    #[test]
    fn test_new_clamps_parameters() {
        let policy = ReconnectPolicy::new(
            Duration::from_millis(10),
            Duration::from_secs(1),
            0.5,
            3.0,
            Some(2),
        );
        assert_eq!(policy.backoff_factor, 1.0);
        assert_eq!(policy.jitter_percent, 1.0);
        assert!(policy.allows(1));
        assert!(!policy.allows(2));
    }

    #[test]
    fn test_fixed_policy() {
        let policy = ReconnectPolicy::fixed(Duration::from_millis(50));
        for attempt in 0..10 {
            assert_eq!(policy.delay_for_attempt(attempt), Duration::from_millis(50));
        }
    }
}
