use regex::Regex;
use std::sync::LazyLock;

/// Workflow name up to and including the numeric generation counter.
static WORKFLOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z0-9][a-z0-9.-]*?-[0-9]+)(?:-|$)").unwrap());

/// Task slug sitting between the counter and the trailing hex hash.
static TASK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9.-]*?-[0-9]+-([a-z0-9][a-z0-9-]*?)-[0-9a-f]{5,}$").unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodIdentity {
    pub workflow_name: Option<String>,
    pub task_name: Option<String>,
}

/// Split an Argo pod name of the form `<workflow>-<counter>-<task-slug>-<hash>`.
///
/// Pods that don't follow the convention (system pods, deployments) come back
/// with both fields unset.
pub fn parse_pod_name(pod_name: &str) -> PodIdentity {
    let workflow_name = WORKFLOW_RE
        .captures(pod_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    let task_name = TASK_RE
        .captures(pod_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace('-', " "));

    PodIdentity {
        workflow_name,
        task_name,
    }
}
