use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per line
    Json,
    /// Colored human-readable lines
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "argo-log-enricher")]
#[command(about = "Classify and enrich Argo workflow pod logs into structured records")]
pub struct Cli {
    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Namespace to watch (default: argo)
    #[arg(short = 'n', long)]
    pub namespace: Option<String>,

    /// Label selector for workflow pods (default: workflows.argoproj.io/workflow)
    #[arg(short = 'l', long)]
    pub selector: Option<String>,

    /// Container name (all containers if omitted)
    #[arg(short = 'c', long)]
    pub container: Option<String>,

    /// Kubeconfig context
    #[arg(long)]
    pub context: Option<String>,

    /// Number of existing lines to fetch per container before following
    #[arg(long)]
    pub tail: Option<i64>,

    /// Read lines from stdin instead of the cluster
    #[arg(long)]
    pub stdin: bool,

    /// Pod name to attribute stdin lines to
    #[arg(long, requires = "stdin", conflicts_with = "pod_prefix")]
    pub pod_name: Option<String>,

    /// Stdin lines are prefixed with the pod name: `<pod> <message>`
    #[arg(long, requires = "stdin")]
    pub pod_prefix: bool,

    /// Cluster label stamped on every record
    #[arg(long)]
    pub cluster: Option<String>,

    /// Environment label stamped on every record
    #[arg(long)]
    pub environment: Option<String>,

    /// Log source label stamped on every record
    #[arg(long)]
    pub log_source: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Capacity of the line channel between sources and the writer
    #[arg(long, default_value_t = 1000)]
    pub buffer_size: usize,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
