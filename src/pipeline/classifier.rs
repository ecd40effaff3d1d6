use crate::types::LogType;

pub const TIMING_MARKER: &str = "CRON TIMING RECORD";
pub const SUCCESS_MARKERS: &[&str] = &["✅"];
pub const ERROR_MARKERS: &[&str] = &["❌", "ERROR"];
pub const PROGRESS_MARKERS: &[&str] = &["🔍", "📅", "🔧", "🎨", "🤖", "📊", "💾"];

fn contains_any(message: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| message.contains(m))
}

/// Assign a coarse category from textual markers. The checks run in priority
/// order and the first hit wins, so a timing record that also carries a
/// success glyph is still `Timing`.
pub fn classify(message: &str) -> Option<LogType> {
    if message.contains(TIMING_MARKER) {
        Some(LogType::Timing)
    } else if contains_any(message, SUCCESS_MARKERS) {
        Some(LogType::Completion)
    } else if contains_any(message, ERROR_MARKERS) {
        Some(LogType::Error)
    } else if contains_any(message, PROGRESS_MARKERS) {
        Some(LogType::Progress)
    } else {
        None
    }
}
