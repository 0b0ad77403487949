//! Replay binary for `recordframe`.
//!
//! Reads a captured stream from a file or standard input, feeds it through the
//! reassembler and progress aggregator, and prints the final counters.

mod cli;

use std::{num::NonZeroUsize, process::ExitCode, time::Duration};

use clap::Parser;
use recordframe::{IngestConfig, ProgressSnapshot, StreamOutcome, export, stream::fragments};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn ingest_config(cli: &cli::Cli) -> IngestConfig {
    let mut config = IngestConfig::new()
        .with_success_code(cli.success_code)
        .with_history_limit(cli.history_limit.and_then(NonZeroUsize::new))
        .with_idle_timeout(cli.idle_timeout_secs.map(Duration::from_secs));
    if let Some(limit) = cli.max_pending_bytes.and_then(NonZeroUsize::new) {
        config = config.with_max_pending_bytes(limit);
    }
    config
}

fn report(snapshot: &ProgressSnapshot) {
    println!(
        "processed {} records: {} succeeded, {} failed ({:.1}% complete)",
        snapshot.processed(),
        snapshot.success_count(),
        snapshot.failure_count(),
        snapshot.percent_complete()
    );
}

async fn run(cli: cli::Cli) -> Result<(), BoxError> {
    let (mut consumer, progress) = ingest_config(&cli).build();

    let reader: Box<dyn AsyncRead + Unpin + Send> = match &cli.input {
        Some(path) => Box::new(tokio::fs::File::open(path).await?),
        None => Box::new(tokio::io::stdin()),
    };

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut watch = progress.subscribe();
    let reporter = tokio::spawn(async move {
        while let Some(snapshot) = watch.changed().await {
            tracing::debug!(
                processed = snapshot.processed(),
                total = ?snapshot.declared_total(),
                percent = snapshot.percent_complete(),
                "progress"
            );
        }
    });

    let outcome = consumer.run(fragments(reader), &cancel).await;
    reporter.abort();

    report(&progress.snapshot());
    if let Some(path) = &cli.export {
        let format = export::ExportFormat::from_path(path);
        let document = export::render(format, &progress.history_snapshot())?;
        tokio::fs::write(path, document).await?;
        tracing::info!(path = %path.display(), ?format, "history exported");
    }

    if let StreamOutcome::Cancelled(_) = outcome? {
        tracing::info!("replay interrupted");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "replay failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroUsize, time::Duration};

    use clap::Parser;

    use super::{cli::Cli, ingest_config};

    #[test]
    fn cli_options_map_onto_ingest_config() {
        let cli = Cli::parse_from([
            "recordframe",
            "--success-code",
            "201",
            "--history-limit",
            "3",
            "--max-pending-bytes",
            "512",
            "--idle-timeout-secs",
            "9",
        ]);
        let config = ingest_config(&cli);

        assert_eq!(config.progress().success_code(), 201);
        assert_eq!(config.progress().history_limit(), NonZeroUsize::new(3));
        assert_eq!(config.reassembler().max_pending_bytes().get(), 512);
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(9)));
    }

    #[test]
    fn zero_limits_fall_back_to_defaults() {
        let cli = Cli::parse_from([
            "recordframe",
            "--history-limit",
            "0",
            "--max-pending-bytes",
            "0",
        ]);
        let config = ingest_config(&cli);

        assert!(config.progress().history_limit().is_none());
        assert_eq!(
            config.reassembler().max_pending_bytes(),
            recordframe::frame::DEFAULT_MAX_PENDING_BYTES
        );
    }
}
