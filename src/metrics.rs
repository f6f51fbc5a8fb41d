use std::{sync::atomic::AtomicU64, time::Duration};

use prometheus_client::{
    encoding::text,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

use crate::{
    executor::{BatchOutcome, BatchReport},
    metrics::labels::{BatchLabels, BatchOutcomeLabel, LevelLabels, OperationLabels, OperationOutcome},
    progress::{Position, ProgressSink},
    resolver::IntervalAdjustment,
};

pub mod labels;

#[derive(Debug)]
pub struct BatchMetrics {
    registry: Registry,
    operations: Family<OperationLabels, Counter>,
    delays: Family<LevelLabels, Counter>,
    delay_seconds: Family<LevelLabels, Counter<f64, AtomicU64>>,
    batches: Family<BatchLabels, Counter>,
    adjustments: Counter,
}

impl Default for BatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchMetrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("pacer");

        let operations = Family::<OperationLabels, Counter>::default();
        let delays = Family::<LevelLabels, Counter>::default();
        let delay_seconds = Family::<LevelLabels, Counter<f64, AtomicU64>>::default();
        let batches = Family::<BatchLabels, Counter>::default();
        let adjustments = Counter::default();

        registry.register("operations", "Operations attempted by outcome", operations.clone());
        registry.register("delays", "Pacing delays applied by level", delays.clone());
        registry.register("delay_seconds", "Time spent pacing by level", delay_seconds.clone());
        registry.register("batches", "Batches finished by outcome", batches.clone());
        registry.register(
            "interval_adjustments",
            "Auto intervals raised to the safety floor",
            adjustments.clone(),
        );

        // families are only encoded once they hold a label set
        for outcome in [OperationOutcome::Success, OperationOutcome::Failure] {
            operations.get_or_create(&OperationLabels { outcome }).inc_by(0);
        }
        for outcome in [BatchOutcomeLabel::Done, BatchOutcomeLabel::Cancelled] {
            batches.get_or_create(&BatchLabels { outcome }).inc_by(0);
        }

        Self {
            registry,
            operations,
            delays,
            delay_seconds,
            batches,
            adjustments,
        }
    }

    pub fn encode(&self) -> anyhow::Result<String> {
        let mut buffer = String::new();
        text::encode(&mut buffer, &self.registry)?;

        Ok(buffer)
    }

    fn count_operation(&self, outcome: OperationOutcome) {
        self.operations.get_or_create(&OperationLabels { outcome }).inc();
    }
}

impl ProgressSink for BatchMetrics {
    fn interval_adjusted(&self, _adjustment: &IntervalAdjustment) {
        self.adjustments.inc();
    }

    fn item_succeeded(&self, _position: &Position, _item: &str) {
        self.count_operation(OperationOutcome::Success);
    }

    fn item_failed(&self, _position: &Position, _item: &str, _error: &anyhow::Error) {
        self.count_operation(OperationOutcome::Failure);
    }

    fn delay(&self, position: &Position, duration: Duration) {
        let labels = LevelLabels {
            level: position.depth().to_string(),
        };

        self.delays.get_or_create(&labels).inc();
        self.delay_seconds.get_or_create(&labels).inc_by(duration.as_secs_f64());
    }

    fn batch_finished(&self, report: &BatchReport) {
        let outcome = match report.outcome {
            BatchOutcome::Done => BatchOutcomeLabel::Done,
            BatchOutcome::Cancelled => BatchOutcomeLabel::Cancelled,
        };

        self.batches.get_or_create(&BatchLabels { outcome }).inc();
    }
}
