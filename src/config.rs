use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

use crate::cli::Cli;
use crate::types::RecordMetadata;

pub const DEFAULT_CLUSTER: &str = "on-prem";
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_LOG_SOURCE: &str = "argo-workflows";
pub const DEFAULT_NAMESPACE: &str = "argo";
pub const DEFAULT_SELECTOR: &str = "workflows.argoproj.io/workflow";

/// On-disk YAML configuration. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub metadata: MetadataSection,
    #[serde(default)]
    pub kubernetes: KubernetesSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetadataSection {
    pub cluster: Option<String>,
    pub environment: Option<String>,
    pub log_source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KubernetesSection {
    pub namespace: Option<String>,
    pub selector: Option<String>,
    pub container: Option<String>,
}

impl ConfigFile {
    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid YAML in config file {}", path.display()))
    }
}

/// Effective settings after layering CLI flags over the config file over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub metadata: RecordMetadata,
    pub namespace: String,
    pub selector: String,
    pub container: Option<String>,
}

impl Settings {
    pub fn resolve(cli: &Cli, file: ConfigFile) -> Self {
        fn pick(flag: &Option<String>, file: Option<String>, default: &str) -> String {
            flag.clone().or(file).unwrap_or_else(|| default.to_string())
        }

        Settings {
            metadata: RecordMetadata {
                cluster: pick(&cli.cluster, file.metadata.cluster, DEFAULT_CLUSTER),
                environment: pick(
                    &cli.environment,
                    file.metadata.environment,
                    DEFAULT_ENVIRONMENT,
                ),
                log_source: pick(&cli.log_source, file.metadata.log_source, DEFAULT_LOG_SOURCE),
            },
            namespace: pick(&cli.namespace, file.kubernetes.namespace, DEFAULT_NAMESPACE),
            selector: pick(&cli.selector, file.kubernetes.selector, DEFAULT_SELECTOR),
            container: cli.container.clone().or(file.kubernetes.container),
        }
    }

    /// Read `--config` if given and merge it with the command line.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Ok(Self::resolve(cli, file))
    }
}
