use chrono::{DateTime, FixedOffset};
use crossterm::style::Color;

/// Turn one `read_until(b'\n')` buffer into text. Invalid UTF-8 is replaced
/// rather than rejected so a bad byte never costs a record.
pub fn decode_line(buf: &[u8]) -> String {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    let buf = buf.strip_suffix(b"\r").unwrap_or(buf);
    String::from_utf8_lossy(buf).into_owned()
}

/// Split the RFC 3339 prefix the kubelet adds when logs are requested with
/// `timestamps=true`. Returns the parsed time, the prefix as written, and the
/// message, or `None` if the line has no such prefix.
pub fn split_kubelet_timestamp(line: &str) -> Option<(DateTime<FixedOffset>, &str, &str)> {
    let (timestamp, message) = line.split_once(' ')?;
    let at = DateTime::parse_from_rfc3339(timestamp).ok()?;
    Some((at, timestamp, message))
}

/// Split a `<pod-name> <message>` line. A line with a single token is a pod
/// with an empty message.
pub fn split_pod_prefix(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    if line.is_empty() {
        return None;
    }
    match line.split_once(char::is_whitespace) {
        Some((pod, message)) => Some((pod, message)),
        None => Some((line, "")),
    }
}

const WORKFLOW_PALETTE: [Color; 10] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
    Color::AnsiValue(208),
    Color::AnsiValue(141),
    Color::AnsiValue(114),
    Color::AnsiValue(75),
    Color::AnsiValue(203),
];

/// Color for a workflow's prefix in pretty output. FNV-1a keeps the choice
/// stable across runs, so a workflow looks the same in every terminal.
pub fn workflow_color(workflow: &str) -> Color {
    let hash = workflow
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
        });
    WORKFLOW_PALETTE[(hash % WORKFLOW_PALETTE.len() as u64) as usize]
}
