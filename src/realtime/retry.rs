//! Bounded exponential backoff for transient notification failures.
//!
//! Delivery retries start at one second and double up to a thirty-second
//! cap, giving up after ten attempts. Rotation state is never recomputed on
//! retry; only the publish is repeated.

use std::time::Duration;

/// Backoff schedule: `base * 2^attempt`, capped, with a bounded attempt
/// count.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    max_retries: u32,
    attempt: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30), 10)
    }
}

impl Backoff {
    pub fn new(base: Duration, cap: Duration, max_retries: u32) -> Self {
        Self {
            base,
            cap,
            max_retries,
            attempt: 0,
        }
    }

    /// Returns the next delay, or `None` once the retry budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        let factor = 2u32.saturating_pow(self.attempt);
        let delay = self
            .base
            .checked_mul(factor)
            .map(|d| d.min(self.cap))
            .unwrap_or(self.cap);
        self.attempt += 1;
        Some(delay)
    }

    /// Number of attempts consumed so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Resets the schedule after a success.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_until_cap() {
        let mut backoff = Backoff::default();
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_delay())
            .map(|d| d.as_secs())
            .collect();

        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30, 30, 30, 30]);
    }

    #[test]
    fn test_budget_is_bounded() {
        let mut backoff = Backoff::new(Duration::from_millis(10), Duration::from_secs(1), 3);
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_none());
        assert_eq!(backoff.attempts(), 3);
    }

    #[test]
    fn test_reset_starts_over() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(8), 5);
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_secs(1)));
    }
}
