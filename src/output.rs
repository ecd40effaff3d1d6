use crate::cli::OutputFormat;
use crate::pipeline;
use crate::stats::PipelineStats;
use crate::types::{EnrichedRecord, RawLogLine, RecordMetadata};
use crate::utils::workflow_color;
use crossterm::style::Stylize;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// Render one record, without the trailing newline. `color` only affects the
/// pretty format.
pub fn format_record(
    record: &EnrichedRecord,
    format: OutputFormat,
    color: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(record)?),
        OutputFormat::Pretty => Ok(format_pretty(record, color)),
    }
}

fn format_pretty(record: &EnrichedRecord, color: bool) -> String {
    let workflow = record.workflow_name.as_deref().unwrap_or(&record.pod_name);
    let label = match &record.task_name {
        Some(task) => format!("[{}/{}]", workflow, task),
        None => format!("[{}]", workflow),
    };
    let prefix = if color {
        label.with(workflow_color(workflow)).to_string()
    } else {
        label
    };

    let mut tags = Vec::new();
    if let Some(t) = record.log_type {
        tags.push(t.to_string());
    }
    if let Some(step) = record.step_number {
        tags.push(format!("step={}", step));
    }
    if let Some(secs) = record.duration_seconds {
        tags.push(format!("duration={}s", secs));
    }

    if tags.is_empty() {
        format!("{} {}", prefix, record.message)
    } else {
        format!("{} ({}) {}", prefix, tags.join(" "), record.message)
    }
}

pub struct RecordWriter<W> {
    out: W,
    format: OutputFormat,
    color: bool,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W, format: OutputFormat, color: bool) -> Self {
        Self { out, format, color }
    }

    pub fn write(&mut self, record: &EnrichedRecord) -> anyhow::Result<()> {
        let line = format_record(record, self.format, self.color)?;
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Single consumer: enrich each line in arrival order and write it out.
/// Runs until every sender is dropped, so nothing already queued is lost.
pub async fn run_writer<W: Write>(
    mut line_rx: mpsc::Receiver<RawLogLine>,
    metadata: RecordMetadata,
    mut writer: RecordWriter<W>,
    stats: Arc<Mutex<PipelineStats>>,
) -> anyhow::Result<RecordWriter<W>> {
    while let Some(line) = line_rx.recv().await {
        let record = pipeline::enrich(&line, &metadata);
        writer.write(&record)?;
        stats.lock().await.record(&record);
    }
    writer.out.flush()?;
    Ok(writer)
}
