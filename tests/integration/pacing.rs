use std::{sync::Mutex, time::Duration};

use pacer::{
    executor::{BatchOutcome, BatchSpec, Operation, PacedExecutor, TokioSleeper, TrailingDelay},
    progress::TracingProgress,
    resolver::{PacingIntent, Resolver},
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Timeline {
    started: Mutex<Vec<(u32, Duration)>>,
    origin: Mutex<Option<Instant>>,
}

impl Operation for Timeline {
    type Item = u32;

    async fn run(&self, item: &u32) -> anyhow::Result<()> {
        let origin = *self.origin.lock().unwrap().get_or_insert_with(Instant::now);
        self.started.lock().unwrap().push((*item, origin.elapsed()));

        if item % 2 == 1 {
            anyhow::bail!("odd item {item}");
        }

        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn auto_pacing_fills_the_window() {
    let strategy = Resolver::default()
        .resolve(&PacingIntent::auto(5, 10))
        .unwrap()
        .notify(&TracingProgress);

    let operation = Timeline::default();
    let mut executor = PacedExecutor::new(TokioSleeper, TracingProgress).with_seed(3);
    let report = executor.run(&BatchSpec::flat((0..5).collect::<Vec<u32>>(), strategy), &operation).await;

    assert_eq!(report.outcome, BatchOutcome::Done);
    assert_eq!((report.succeeded, report.failed, report.delays), (3, 2, 4));

    let started = operation.started.lock().unwrap();
    assert_eq!(started.iter().map(|(item, _)| *item).collect::<Vec<_>>(), [0, 1, 2, 3, 4]);
    for pair in started.windows(2) {
        let gap = pair[1].1 - pair[0].1;
        assert!(gap >= Duration::from_millis(1600) && gap <= Duration::from_millis(2400), "{gap:?}");
    }
    assert_eq!(started[4].1, report.slept);
}

#[tokio::test(start_paused = true)]
async fn grouped_batch_waits_between_groups() {
    let resolver = Resolver::default();
    let inner = resolver.resolve(&PacingIntent::manual("1")).unwrap().strategy;
    let outer = resolver.resolve(&PacingIntent::manual("10")).unwrap().strategy;

    let operation = Timeline::default();
    let spec = BatchSpec::grouped(vec![vec![0, 1, 2], vec![3, 4, 5]], inner, outer);
    let mut executor = PacedExecutor::new(TokioSleeper, TracingProgress);
    let report = executor.run(&spec, &operation).await;

    let offsets = operation.started.lock().unwrap().iter().map(|(_, at)| at.as_secs()).collect::<Vec<_>>();

    assert_eq!(offsets, [0, 1, 2, 12, 13, 14]);
    assert_eq!(report.outcome, BatchOutcome::Done);
    assert_eq!(report.slept, Duration::from_secs(14));
}

#[tokio::test(start_paused = true)]
async fn trailing_delay_after_last_item() {
    let strategy = Resolver::default().resolve(&PacingIntent::manual("2")).unwrap().strategy;

    let start = Instant::now();
    let mut executor = PacedExecutor::new(TokioSleeper, TracingProgress).with_trailing_delay(TrailingDelay::Apply);
    let report = executor.run(&BatchSpec::flat(vec![0, 2], strategy), &Timeline::default()).await;

    assert_eq!(report.delays, 2);
    assert_eq!(start.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_during_the_next_delay() {
    let strategy = Resolver::default().resolve(&PacingIntent::manual("1")).unwrap().strategy;
    let cancel = CancellationToken::new();

    let token = cancel.clone();
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        token.cancel();
    });

    let operation = Timeline::default();
    let mut executor = PacedExecutor::new(TokioSleeper, TracingProgress).with_cancellation(cancel);
    let report = executor.run(&BatchSpec::flat((0..10).collect::<Vec<u32>>(), strategy), &operation).await;
    canceller.await.unwrap();

    assert_eq!(report.outcome, BatchOutcome::Cancelled);
    assert_eq!(operation.started.lock().unwrap().len(), 3);
    assert_eq!(report.delays, 2);
    assert_eq!(report.slept, Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn cancellation_cuts_a_long_delay_short() {
    let strategy = Resolver::default().resolve(&PacingIntent::manual("600")).unwrap().strategy;
    let cancel = CancellationToken::new();

    let token = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
    });

    let start = Instant::now();
    let operation = Timeline::default();
    let mut executor = PacedExecutor::new(TokioSleeper, TracingProgress).with_cancellation(cancel);
    let report = executor.run(&BatchSpec::flat(vec![0, 2], strategy), &operation).await;

    assert_eq!(report.outcome, BatchOutcome::Cancelled);
    assert_eq!(operation.started.lock().unwrap().len(), 1);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
    assert_eq!(report.slept, Duration::ZERO);
}
