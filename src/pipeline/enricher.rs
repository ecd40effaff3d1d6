use crate::pipeline::classifier::classify;
use crate::pipeline::extractor::{extract_fields, extract_timing_payload};
use crate::pipeline::pod_name::parse_pod_name;
use crate::types::{EnrichedRecord, LogType, RawLogLine, RecordMetadata};

/// Turn one raw line into its indexed document.
///
/// Never fails: anything that doesn't match is simply left out of the record,
/// and the original message is always carried through verbatim.
pub fn enrich(line: &RawLogLine, metadata: &RecordMetadata) -> EnrichedRecord {
    let identity = parse_pod_name(&line.pod_name);
    let log_type = classify(&line.message);
    let fields = extract_fields(&line.message);

    let timing = match log_type {
        Some(LogType::Timing) => extract_timing_payload(&line.message),
        _ => None,
    };

    EnrichedRecord {
        timestamp: line.timestamp.clone(),
        workflow_name: identity.workflow_name,
        task_name: identity.task_name,
        log_type,
        step_number: fields.step_number,
        duration_seconds: fields.duration_seconds,
        duration_minutes: fields.duration_seconds.map(|s| s / 60.0),
        timing,
        message: line.message.clone(),
        pod_name: line.pod_name.clone(),
        namespace: line.namespace.clone(),
        container: line.container.clone(),
        cluster: metadata.cluster.clone(),
        environment: metadata.environment.clone(),
        log_source: metadata.log_source.clone(),
    }
}
