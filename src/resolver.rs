use std::str::FromStr;

use strum::Display as StrumDisplay;

use crate::{
    error::{PacingError, PacingResult},
    parser::{Parser, range::RangeParser},
    progress::ProgressSink,
    strategy::{DEFAULT_JITTER_FRACTION, DelayStrategy, SAFE_MIN_INTERVAL_MS},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    #[default]
    Manual,
    Auto,
}

impl FromStr for Mode {
    type Err = PacingError;

    fn from_str(s: &str) -> PacingResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "manual" => Ok(Self::Manual),
            "auto" => Ok(Self::Auto),
            other => Err(PacingError::invalid(format!("unknown delay mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacingIntent {
    Manual { delay: Option<String> },
    Auto {
        total_ops: Option<i64>,
        window_sec: Option<i64>,
    },
}

impl PacingIntent {
    pub fn manual(delay: impl Into<String>) -> Self {
        Self::Manual { delay: Some(delay.into()) }
    }

    pub fn auto(total_ops: i64, window_sec: i64) -> Self {
        Self::Auto {
            total_ops: Some(total_ops),
            window_sec: Some(window_sec),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Manual { .. } => Mode::Manual,
            Self::Auto { .. } => Mode::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalAdjustment {
    pub requested_ms: u64,
    pub interval_ms: u64,
    pub min_window_sec: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub strategy: DelayStrategy,
    pub adjustment: Option<IntervalAdjustment>,
}

impl Resolution {
    pub fn notify<P>(self, progress: &P) -> DelayStrategy
    where
        P: ProgressSink,
    {
        if let Some(adjustment) = &self.adjustment {
            progress.interval_adjusted(adjustment);
        }

        self.strategy
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    jitter_fraction: f64,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            jitter_fraction: DEFAULT_JITTER_FRACTION,
        }
    }
}

impl Resolver {
    pub fn new(jitter_fraction: f64) -> PacingResult<Self> {
        if !(0.0..=1.0).contains(&jitter_fraction) {
            return Err(PacingError::invalid(format!("jitter must be within 0 and 1, got {jitter_fraction}")));
        }

        Ok(Self { jitter_fraction })
    }

    #[tracing::instrument(skip(self), fields(mode = %intent.mode()))]
    pub fn resolve(&self, intent: &PacingIntent) -> PacingResult<Resolution> {
        let resolution = match intent {
            PacingIntent::Manual { delay } => {
                let delay = delay.as_deref().ok_or_else(|| PacingError::invalid("delay is required"))?;
                Self::resolve_manual(delay)?
            },
            PacingIntent::Auto { total_ops, window_sec } => {
                let total_ops = positive("total operations", *total_ops)?;
                let window_sec = positive("window", *window_sec)?;
                self.resolve_auto(total_ops, window_sec)
            },
        };

        tracing::debug!(strategy = %resolution.strategy, "resolved delay strategy");

        Ok(resolution)
    }

    fn resolve_manual(delay: &str) -> PacingResult<Resolution> {
        let range = RangeParser.parse(delay)?;

        let strategy = DelayStrategy::Manual {
            min_ms: range.min.saturating_mul(1000).max(SAFE_MIN_INTERVAL_MS),
            max_ms: range.max.saturating_mul(1000).max(SAFE_MIN_INTERVAL_MS),
        };

        Ok(Resolution {
            strategy,
            adjustment: None,
        })
    }

    fn resolve_auto(&self, total_ops: u64, window_sec: u64) -> Resolution {
        let requested_ms = window_sec.saturating_mul(1000) / total_ops;
        let interval_ms = requested_ms.max(SAFE_MIN_INTERVAL_MS);

        let adjustment = (interval_ms > requested_ms).then(|| IntervalAdjustment {
            requested_ms,
            interval_ms,
            min_window_sec: total_ops.saturating_mul(SAFE_MIN_INTERVAL_MS).div_ceil(1000),
        });

        Resolution {
            strategy: DelayStrategy::Auto {
                base_ms: interval_ms,
                jitter_fraction: self.jitter_fraction,
            },
            adjustment,
        }
    }
}

fn positive(name: &str, value: Option<i64>) -> PacingResult<u64> {
    match value {
        Some(value) if value > 0 => Ok(value as u64),
        Some(value) => Err(PacingError::invalid(format!("{name} must be positive, got {value}"))),
        None => Err(PacingError::invalid(format!("{name} is required"))),
    }
}
