use pacer::{
    command::CommandOperation,
    executor::{BatchOutcome, BatchSpec, PacedExecutor, TokioSleeper},
    metrics::BatchMetrics,
    strategy::DelayStrategy,
};

#[tokio::test(start_paused = true)]
async fn metrics() {
    let items = ["true", "exit 1", "echo ok"].map(String::from).to_vec();
    let spec = BatchSpec::flat(items, DelayStrategy::Manual { min_ms: 1000, max_ms: 1000 });

    let mut executor = PacedExecutor::new(TokioSleeper, BatchMetrics::new());
    let report = executor.run(&spec, &CommandOperation::new("sh")).await;

    assert_eq!(report.outcome, BatchOutcome::Done);
    assert_eq!((report.succeeded, report.failed, report.delays), (2, 1, 2));

    let result = executor.progress().encode().unwrap();
    let lines = result.lines().collect::<Vec<_>>();

    assert!(lines.contains(&"# TYPE pacer_operations counter"));
    assert!(lines.contains(&"pacer_operations_total{outcome=\"success\"} 2"));
    assert!(lines.contains(&"pacer_operations_total{outcome=\"failure\"} 1"));
    assert!(lines.contains(&"pacer_delays_total{level=\"1\"} 2"));
    assert!(lines.contains(&"pacer_batches_total{outcome=\"done\"} 1"));
    assert_eq!(lines.last(), Some(&"# EOF"));
}

#[tokio::test(start_paused = true)]
async fn shell_not_found() {
    let spec = BatchSpec::flat(vec!["true".to_string()], DelayStrategy::Manual { min_ms: 900, max_ms: 900 });

    let mut executor = PacedExecutor::new(TokioSleeper, BatchMetrics::new());
    let report = executor.run(&spec, &CommandOperation::new("shell_not_found")).await;

    assert_eq!(report.outcome, BatchOutcome::Done);
    assert_eq!(report.failed, 1);

    let result = executor.progress().encode().unwrap();

    assert!(result.contains("pacer_operations_total{outcome=\"failure\"} 1"));
}
