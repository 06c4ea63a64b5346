//! Retry delay implementations

use rand::Rng;
use std::{iter::Iterator, time::Duration};

/// Uniformly jittered retry delay iterator
///
/// This struct implements the iterator trait and returns an unlimited sequence of randomized durations,
/// each drawn uniformly from the configured interval. The jitter spreads out the reconnection attempts
/// of multiple service instances that lost the same broker at the same time.
pub struct RetryJitter {
    min_ms: u64,
    max_ms: u64,
}

impl RetryJitter {
    /// Creates an iterator yielding delays in `[min, max]`
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min_ms: min.as_millis() as u64,
            max_ms: max.as_millis() as u64,
        }
    }
}

impl Default for RetryJitter {
    fn default() -> Self {
        Self {
            min_ms: 500,
            max_ms: 1500,
        }
    }
}

impl Iterator for RetryJitter {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        Some(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_within_bounds() {
        let mut jitter = RetryJitter::default();

        for _ in 0..1_000 {
            let duration = jitter.next().unwrap();
            assert!(duration >= Duration::from_millis(500));
            assert!(duration <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn jitter_is_not_constant() {
        let mut jitter = RetryJitter::new(Duration::from_millis(0), Duration::from_millis(1000));
        let first = jitter.next().unwrap();

        assert!(jitter.take(1_000).any(|duration| duration != first));
    }

    #[test]
    fn jitter_never_terminates() {
        let mut jitter = RetryJitter::default();

        for _ in 0..10_000 {
            assert!(jitter.next().is_some());
        }
    }
}
