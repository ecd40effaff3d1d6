use serde::{Deserialize, Serialize};

/// One line of container output as handed over by a source.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLogLine {
    pub message: String,
    pub pod_name: String,
    pub timestamp: String,
    pub namespace: Option<String>,
    pub container: Option<String>,
}

impl RawLogLine {
    /// Line stamped with the current time, for sources that don't carry their own.
    pub fn now(pod_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pod_name: pod_name.into(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            namespace: None,
            container: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    Timing,
    Completion,
    Error,
    Progress,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Timing => "timing",
            LogType::Completion => "completion",
            LogType::Error => "error",
            LogType::Progress => "progress",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed labels stamped on every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMetadata {
    pub cluster: String,
    pub environment: String,
    pub log_source: String,
}

/// Structured document produced for every raw line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_type: Option<LogType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    /// JSON body of a `CRON TIMING RECORD` line, when it parses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<serde_json::Value>,
    pub message: String,
    pub pod_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    pub cluster: String,
    pub environment: String,
    pub log_source: String,
}
