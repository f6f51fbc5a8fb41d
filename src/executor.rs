use std::{fmt::Display, pin::Pin, time::Duration};

use rand::{SeedableRng, rngs::StdRng};
use tokio_util::sync::CancellationToken;

use crate::{
    progress::{Position, ProgressSink},
    strategy::DelayStrategy,
};

pub trait Operation {
    type Item;

    fn run(&self, item: &Self::Item) -> impl Future<Output = anyhow::Result<()>> + Send;
}

#[cfg_attr(test, mockall::automock)]
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Batch<T> {
    Items(Vec<T>),
    Groups(Vec<Batch<T>>),
}

impl<T> Batch<T> {
    fn width(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Groups(groups) => groups.len(),
        }
    }

    fn leaves(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Groups(groups) => groups.iter().map(Batch::leaves).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSpec<T> {
    root: Batch<T>,
    strategies: Vec<DelayStrategy>,
}

impl<T> BatchSpec<T> {
    pub fn flat(items: Vec<T>, strategy: DelayStrategy) -> Self {
        Self {
            root: Batch::Items(items),
            strategies: vec![strategy],
        }
    }

    pub fn grouped(groups: Vec<Vec<T>>, inner: DelayStrategy, outer: DelayStrategy) -> Self {
        Self {
            root: Batch::Groups(groups.into_iter().map(Batch::Items).collect()),
            strategies: vec![outer, inner],
        }
    }

    pub fn len(&self) -> usize {
        self.root.leaves()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn depth(&self) -> usize {
        self.strategies.len()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TrailingDelay {
    #[default]
    Skip,
    Apply,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    #[default]
    Done,
    Cancelled,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub outcome: BatchOutcome,
    pub succeeded: usize,
    pub failed: usize,
    pub delays: usize,
    pub slept: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Cancelled,
}

type LevelFuture<'a> = Pin<Box<dyn Future<Output = Flow> + Send + 'a>>;

pub struct PacedExecutor<S, P> {
    sleeper: S,
    progress: P,
    rng: StdRng,
    trailing: TrailingDelay,
    cancel: CancellationToken,
}

impl<S, P> PacedExecutor<S, P> {
    pub fn new(sleeper: S, progress: P) -> Self {
        Self {
            sleeper,
            progress,
            rng: StdRng::from_os_rng(),
            trailing: TrailingDelay::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_trailing_delay(mut self, trailing: TrailingDelay) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }
}

impl<S, P> PacedExecutor<S, P>
where
    S: Sleeper + Send + Sync,
    P: ProgressSink + Send + Sync,
{
    #[tracing::instrument(skip_all, fields(items = spec.len(), levels = spec.depth()))]
    pub async fn run<O>(&mut self, spec: &BatchSpec<O::Item>, operation: &O) -> BatchReport
    where
        O: Operation + Sync,
        O::Item: Display + Sync,
    {
        tracing::debug!("starting batch");

        let mut report = BatchReport::default();
        let mut position = Position::default();

        let flow = self
            .run_level(&spec.root, &spec.strategies, operation, &mut position, &mut report)
            .await;

        report.outcome = match flow {
            Flow::Continue => BatchOutcome::Done,
            Flow::Cancelled => BatchOutcome::Cancelled,
        };
        self.progress.batch_finished(&report);

        report
    }

    fn run_level<'a, O>(
        &'a mut self,
        batch: &'a Batch<O::Item>,
        strategies: &'a [DelayStrategy],
        operation: &'a O,
        position: &'a mut Position,
        report: &'a mut BatchReport,
    ) -> LevelFuture<'a>
    where
        O: Operation + Sync,
        O::Item: Display + Sync,
    {
        Box::pin(async move {
            let (strategy, inner) = match strategies.split_first() {
                Some((strategy, inner)) => (Some(strategy), inner),
                None => (None, strategies),
            };

            let width = batch.width();
            for index in 0..width {
                if self.cancel.is_cancelled() {
                    return Flow::Cancelled;
                }

                position.enter(index, width);

                let mut flow = match batch {
                    Batch::Items(items) => {
                        self.run_item(&items[index], operation, position, report).await;
                        Flow::Continue
                    },
                    Batch::Groups(groups) => {
                        self.run_level(&groups[index], inner, operation, position, report).await
                    },
                };

                let is_last = index + 1 == width;
                if let (Flow::Continue, Some(strategy)) = (flow, strategy) {
                    if !is_last || self.trailing == TrailingDelay::Apply {
                        flow = self.pace(strategy, position, report).await;
                    }
                }

                position.leave();

                if flow == Flow::Cancelled {
                    return Flow::Cancelled;
                }
            }

            Flow::Continue
        })
    }

    async fn run_item<O>(&self, item: &O::Item, operation: &O, position: &Position, report: &mut BatchReport)
    where
        O: Operation + Sync,
        O::Item: Display + Sync,
    {
        let label = item.to_string();

        match operation.run(item).await {
            Ok(()) => {
                report.succeeded += 1;
                self.progress.item_succeeded(position, &label);
            },
            Err(err) => {
                report.failed += 1;
                self.progress.item_failed(position, &label, &err);
            },
        }
    }

    async fn pace(&mut self, strategy: &DelayStrategy, position: &Position, report: &mut BatchReport) -> Flow {
        if self.cancel.is_cancelled() {
            return Flow::Cancelled;
        }

        let duration = strategy.draw(&mut self.rng);
        self.progress.delay(position, duration);

        tokio::select! {
            _ = self.sleeper.sleep(duration) => {},
            _ = self.cancel.cancelled() => return Flow::Cancelled,
        }

        report.delays += 1;
        report.slept += duration;

        Flow::Continue
    }
}
