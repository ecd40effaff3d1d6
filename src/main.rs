mod cli;
mod config;
mod kubernetes;
mod output;
mod pipeline;
mod stats;
mod stdin;
mod types;
mod utils;

use clap::Parser;
use std::io::IsTerminal;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info};

use cli::Cli;
use config::Settings;
use kubernetes::{PodFollower, TailContext, initialize_client};
use output::RecordWriter;
use stats::PipelineStats;
use stdin::PodAttribution;
use types::RawLogLine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the records, so diagnostics always go to stderr
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::load(&cli)?;
    debug!("Effective settings: {:?}", settings);

    let (line_tx, line_rx) = mpsc::channel::<RawLogLine>(cli.buffer_size);
    let stats = Arc::new(Mutex::new(PipelineStats::default()));

    let color = std::io::stdout().is_terminal();
    let writer = tokio::spawn(output::run_writer(
        line_rx,
        settings.metadata.clone(),
        RecordWriter::new(std::io::stdout(), cli.format, color),
        stats.clone(),
    ));

    // Both sources drop their senders on return, which lets the writer drain and stop.
    let source_result = if cli.stdin {
        run_stdin_mode(&cli, line_tx).await
    } else {
        run_cluster_mode(&cli, &settings, line_tx).await
    };
    writer.await??;

    stats.lock().await.log_summary();
    source_result
}

async fn run_stdin_mode(cli: &Cli, line_tx: mpsc::Sender<RawLogLine>) -> anyhow::Result<()> {
    let attribution = match (&cli.pod_name, cli.pod_prefix) {
        (Some(pod), _) => PodAttribution::Fixed(pod.clone()),
        (None, true) => PodAttribution::Prefixed,
        (None, false) => {
            anyhow::bail!("--stdin needs either --pod-name or --pod-prefix");
        }
    };

    info!("Reading log lines from stdin");
    tokio::select! {
        result = stdin::read_lines(tokio::io::stdin(), attribution, line_tx) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
        }
    }
    Ok(())
}

async fn run_cluster_mode(
    cli: &Cli,
    settings: &Settings,
    line_tx: mpsc::Sender<RawLogLine>,
) -> anyhow::Result<()> {
    let client = initialize_client(cli.context.as_deref()).await?;
    let follower = PodFollower::new(TailContext {
        client,
        namespace: settings.namespace.clone(),
        container: settings.container.clone(),
        tx: line_tx,
        tail: cli.tail,
    });

    info!(
        "Following pods matching {} in namespace {}",
        settings.selector, settings.namespace
    );
    let result = tokio::select! {
        result = follower.watch(&settings.selector) => {
            if let Err(err) = &result {
                error!("Pod watcher stopped: {}", err);
            }
            result
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
            Ok(())
        }
    };
    follower.shutdown().await;
    result
}
