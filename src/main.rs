use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;
use tokio::signal::unix::{self, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use pacer::{
    cli::{Cli, Log},
    command::CommandOperation,
    executor::{BatchOutcome, BatchSpec, PacedExecutor, TokioSleeper, TrailingDelay},
    metrics::BatchMetrics,
    parser::{Parser, batch::BatchFileParser},
    progress::TracingProgress,
    resolver::Resolver,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    match run(cli).await {
        Ok(BatchOutcome::Done) => ExitCode::SUCCESS,
        Ok(BatchOutcome::Cancelled) => ExitCode::from(130),
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<BatchOutcome> {
    let input = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let groups = BatchFileParser.parse(&input)?;

    for flag in cli.items.ignored_flags().into_iter().chain(cli.groups.ignored_flags()) {
        tracing::warn!("{flag} has no effect with the selected pacing, ignoring it");
    }

    let resolver = Resolver::new(cli.jitter)?;
    let progress = (TracingProgress, BatchMetrics::new());

    let spec = if cli.groups.is_enabled() {
        let items = groups.iter().map(Vec::len).sum();
        let inner = resolver.resolve(&cli.items.intent(items))?.notify(&progress);
        let outer = resolver.resolve(&cli.groups.intent(groups.len()))?.notify(&progress);
        tracing::info!(%inner, %outer, groups = groups.len(), "pacing items and groups");

        BatchSpec::grouped(groups, inner, outer)
    } else {
        let items = groups.into_iter().flatten().collect::<Vec<_>>();
        let strategy = resolver.resolve(&cli.items.intent(items.len()))?.notify(&progress);
        tracing::info!(%strategy, "pacing items");

        BatchSpec::flat(items, strategy)
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let trailing = if cli.trailing_delay {
        TrailingDelay::Apply
    } else {
        TrailingDelay::Skip
    };

    let mut executor = PacedExecutor::new(TokioSleeper, progress)
        .with_trailing_delay(trailing)
        .with_cancellation(cancel);
    if let Some(seed) = cli.seed {
        executor = executor.with_seed(seed);
    }

    let report = executor.run(&spec, &CommandOperation::new(cli.shell)).await;

    if let Some(path) = &cli.metrics_output {
        let (_, metrics) = executor.progress();
        std::fs::write(path, metrics.encode()?)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
    }

    Ok(report.outcome)
}

fn init_tracing(log: &Log) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log {
        Log::Plain => registry.with(fmt::layer()).init(),
        Log::Json => registry.with(fmt::layer().json()).init(),
    }
}

async fn cancel_on_signal(cancel: CancellationToken) {
    let (mut sigint, mut sigterm) = match (unix::signal(SignalKind::interrupt()), unix::signal(SignalKind::terminate())) {
        (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
        (Err(err), _) | (_, Err(err)) => {
            tracing::warn!("failed to install signal handlers: {err}");
            return;
        },
    };

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    tracing::warn!("stopping after the current operation, signal again to exit now");
    cancel.cancel();

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    std::process::exit(130);
}
