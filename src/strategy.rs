use std::{fmt, time::Duration};

use rand::Rng;

pub const SAFE_MIN_INTERVAL_MS: u64 = 900;

pub const DEFAULT_JITTER_FRACTION: f64 = 0.2;

// Only the auto base is floored, a jittered draw may land up to
// `base_ms * jitter_fraction` below SAFE_MIN_INTERVAL_MS.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DelayStrategy {
    Manual { min_ms: u64, max_ms: u64 },
    Auto { base_ms: u64, jitter_fraction: f64 },
}

impl DelayStrategy {
    pub fn bounds(&self) -> (u64, u64) {
        match *self {
            Self::Manual { min_ms, max_ms } => (min_ms, max_ms),
            Self::Auto { base_ms, jitter_fraction } => {
                let jitter = (base_ms as f64 * jitter_fraction).floor() as u64;
                (base_ms.saturating_sub(jitter), base_ms.saturating_add(jitter))
            },
        }
    }

    pub fn draw<R>(&self, rng: &mut R) -> Duration
    where
        R: Rng,
    {
        let (low, high) = self.bounds();
        let millis = if low >= high {
            low
        } else {
            rng.random_range(low..=high)
        };

        Duration::from_millis(millis)
    }
}

impl fmt::Display for DelayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Manual { min_ms, max_ms } if min_ms == max_ms => write!(f, "{:.2}s", seconds(min_ms)),
            Self::Manual { min_ms, max_ms } => write!(f, "{:.2}s-{:.2}s", seconds(min_ms), seconds(max_ms)),
            Self::Auto { base_ms, jitter_fraction } => {
                write!(f, "{:.2}s ±{}% (auto)", seconds(base_ms), (jitter_fraction * 100.0).round())
            },
        }
    }
}

fn seconds(millis: u64) -> f64 {
    millis as f64 / 1000.0
}
