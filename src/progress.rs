use std::{fmt, time::Duration};

use crate::{
    executor::{BatchOutcome, BatchReport},
    resolver::IntervalAdjustment,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step {
    index: usize,
    len: usize,
}

impl Position {
    pub(crate) fn enter(&mut self, index: usize, len: usize) {
        self.steps.push(Step { index, len });
    }

    pub(crate) fn leave(&mut self) {
        self.steps.pop();
    }

    pub fn indices(&self) -> Vec<usize> {
        self.steps.iter().map(|step| step.index).collect()
    }

    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self.steps.len().saturating_sub(1);
        for (depth, step) in self.steps.iter().enumerate() {
            if depth > 0 {
                f.write_str(" ")?;
            }
            let noun = if depth == last { "item" } else { "group" };
            write!(f, "{noun} {}/{}", step.index + 1, step.len)?;
        }

        Ok(())
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ProgressSink {
    fn interval_adjusted(&self, adjustment: &IntervalAdjustment);
    fn item_succeeded(&self, position: &Position, item: &str);
    fn item_failed(&self, position: &Position, item: &str, error: &anyhow::Error);
    fn delay(&self, position: &Position, duration: Duration);
    fn batch_finished(&self, report: &BatchReport);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn interval_adjusted(&self, adjustment: &IntervalAdjustment) {
        tracing::warn!(
            requested_ms = adjustment.requested_ms,
            interval_ms = adjustment.interval_ms,
            "target too fast, interval adjusted to {:.2}s; minimum safe window is {}s (~{} min)",
            adjustment.interval_ms as f64 / 1000.0,
            adjustment.min_window_sec,
            adjustment.min_window_sec.div_ceil(60),
        );
    }

    fn item_succeeded(&self, position: &Position, item: &str) {
        tracing::info!(%position, item, "operation succeeded");
    }

    fn item_failed(&self, position: &Position, item: &str, error: &anyhow::Error) {
        tracing::error!(%position, item, "operation failed: {error:#}");
    }

    fn delay(&self, position: &Position, duration: Duration) {
        tracing::info!(%position, "waiting {:.2}s", duration.as_secs_f64());
    }

    fn batch_finished(&self, report: &BatchReport) {
        match report.outcome {
            BatchOutcome::Done => tracing::info!(
                succeeded = report.succeeded,
                failed = report.failed,
                delays = report.delays,
                "batch done",
            ),
            BatchOutcome::Cancelled => tracing::warn!(
                succeeded = report.succeeded,
                failed = report.failed,
                delays = report.delays,
                "batch cancelled",
            ),
        }
    }
}

impl<A, B> ProgressSink for (A, B)
where
    A: ProgressSink,
    B: ProgressSink,
{
    fn interval_adjusted(&self, adjustment: &IntervalAdjustment) {
        self.0.interval_adjusted(adjustment);
        self.1.interval_adjusted(adjustment);
    }

    fn item_succeeded(&self, position: &Position, item: &str) {
        self.0.item_succeeded(position, item);
        self.1.item_succeeded(position, item);
    }

    fn item_failed(&self, position: &Position, item: &str, error: &anyhow::Error) {
        self.0.item_failed(position, item, error);
        self.1.item_failed(position, item, error);
    }

    fn delay(&self, position: &Position, duration: Duration) {
        self.0.delay(position, duration);
        self.1.delay(position, duration);
    }

    fn batch_finished(&self, report: &BatchReport) {
        self.0.batch_finished(report);
        self.1.batch_finished(report);
    }
}
