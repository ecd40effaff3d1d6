use crate::types::{EnrichedRecord, LogType};
use std::collections::BTreeMap;
use tracing::info;

/// Running totals over the records written in one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub total: u64,
    pub by_log_type: BTreeMap<LogType, u64>,
    pub unclassified: u64,
    pub by_workflow: BTreeMap<String, WorkflowStats>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowStats {
    pub records: u64,
    pub errors: u64,
    pub durations_seen: u64,
    pub total_duration_seconds: f64,
}

impl PipelineStats {
    pub fn record(&mut self, record: &EnrichedRecord) {
        self.total += 1;
        match record.log_type {
            Some(t) => *self.by_log_type.entry(t).or_default() += 1,
            None => self.unclassified += 1,
        }

        if let Some(workflow) = &record.workflow_name {
            let wf = self.by_workflow.entry(workflow.clone()).or_default();
            wf.records += 1;
            if record.log_type == Some(LogType::Error) {
                wf.errors += 1;
            }
            if let Some(secs) = record.duration_seconds {
                wf.durations_seen += 1;
                wf.total_duration_seconds += secs;
            }
        }
    }

    pub fn count(&self, log_type: LogType) -> u64 {
        self.by_log_type.get(&log_type).copied().unwrap_or(0)
    }

    pub fn log_summary(&self) {
        info!(
            "Enriched {} records: {} timing, {} completion, {} error, {} progress, {} unclassified",
            self.total,
            self.count(LogType::Timing),
            self.count(LogType::Completion),
            self.count(LogType::Error),
            self.count(LogType::Progress),
            self.unclassified
        );
        for (name, wf) in &self.by_workflow {
            info!(
                "  {}: {} records, {} errors, {:.1}s across {} timed lines",
                name, wf.records, wf.errors, wf.total_duration_seconds, wf.durations_seen
            );
        }
    }
}
