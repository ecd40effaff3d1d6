use regex::Regex;
use std::sync::LazyLock;

static STEP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Step (\d+):").unwrap());

// The number must start a token: nothing word-like, `.` or `,` right before it, so
// `1,234.5s` or `v1.2.3s` never yield a fragment. `seconds` comes before `s` in the
// alternation or `3 seconds` stops at the `s` and then fails the word boundary.
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w.,])(\d+(?:\.\d+)?|\.\d+) ?(?:seconds|s)\b").unwrap()
});

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtractedFields {
    pub step_number: Option<u32>,
    pub duration_seconds: Option<f64>,
}

/// Pull the step number and first duration out of a free-text message.
pub fn extract_fields(message: &str) -> ExtractedFields {
    ExtractedFields {
        step_number: extract_step_number(message),
        duration_seconds: extract_duration_seconds(message),
    }
}

pub fn extract_step_number(message: &str) -> Option<u32> {
    let caps = STEP_RE.captures(message)?;
    caps.get(1)?.as_str().parse().ok()
}

pub fn extract_duration_seconds(message: &str) -> Option<f64> {
    let caps = DURATION_RE.captures(message)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    value.is_finite().then_some(value)
}

/// JSON object embedded in a timing record line, e.g.
/// `CRON TIMING RECORD: {"task": "collect", "duration_seconds": 12.5}`.
pub fn extract_timing_payload(message: &str) -> Option<serde_json::Value> {
    let start = message.find('{')?;
    let end = message.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(&message[start..=end]) {
        Ok(value @ serde_json::Value::Object(_)) => Some(value),
        _ => None,
    }
}
