use crate::types::RawLogLine;
use crate::utils::{decode_line, split_pod_prefix};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// How stdin lines are attributed to a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodAttribution {
    /// Every line belongs to this pod.
    Fixed(String),
    /// Each line starts with the pod name.
    Prefixed,
}

impl PodAttribution {
    /// Blank lines in prefixed mode still produce a line, with an empty pod name.
    pub fn to_raw_line(&self, line: &str) -> RawLogLine {
        match self {
            PodAttribution::Fixed(pod) => RawLogLine::now(pod.as_str(), line),
            PodAttribution::Prefixed => match split_pod_prefix(line) {
                Some((pod, message)) => RawLogLine::now(pod, message),
                None => RawLogLine::now("", line),
            },
        }
    }
}

/// Forward every line of `reader` to `tx` until EOF. Returns the number of
/// lines sent.
pub async fn read_lines<R>(
    reader: R,
    attribution: PodAttribution,
    tx: mpsc::Sender<RawLogLine>,
) -> anyhow::Result<u64>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut sent = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = decode_line(&buf);
        if tx.send(attribution.to_raw_line(&line)).await.is_err() {
            break;
        }
        sent += 1;
    }
    debug!("stdin reached EOF after {} lines", sent);
    Ok(sent)
}
