use crate::types::RawLogLine;
use crate::utils::{decode_line, split_kubelet_timestamp};
use chrono::{DateTime, FixedOffset, Utc};
use futures::io::{AsyncBufRead, AsyncBufReadExt};
use futures::{TryStreamExt, stream::StreamExt};
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::watcher::{Config as WatcherConfig, Event, watcher};
use kube::{Api, Client, ResourceExt, api::LogParams, config};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerKey {
    pub pod_name: String,
    pub container_name: String,
}

/// What every follow task needs to reach the API and hand lines on.
#[derive(Clone)]
pub struct TailContext {
    pub client: Client,
    pub namespace: String,
    pub container: Option<String>,
    pub tx: mpsc::Sender<RawLogLine>,
    pub tail: Option<i64>,
}

pub async fn initialize_client(context: Option<&str>) -> anyhow::Result<Client> {
    let config = match context {
        Some(ctx) => config::Config::from_kubeconfig(&config::KubeConfigOptions {
            context: Some(ctx.to_string()),
            ..Default::default()
        })
        .await
        .map_err(|e| anyhow::anyhow!("Context '{}' not found in kubeconfig: {}", ctx, e))?,
        None => config::Config::infer().await?,
    };
    let client = Client::try_from(config)?;
    info!("Using context: {}", context.unwrap_or("current"));
    Ok(client)
}

/// Whether a pod in `phase` gets its containers followed. Pods already
/// finished when the watcher starts are history and are skipped; pods seen
/// finishing later are still read so a short task isn't missed.
pub fn should_follow(phase: &str, initial_listing: bool) -> bool {
    match phase {
        "Pending" | "Running" => true,
        "Succeeded" | "Failed" => !initial_listing,
        _ => false,
    }
}

/// Where a container's log has been read up to, so a reconnect can skip the
/// lines it already delivered.
///
/// Kubelet timestamps have nanosecond resolution but may still repeat, so the
/// cursor counts how many lines it has emitted at the latest timestamp and
/// skips that many again when the same instant is replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeCursor {
    last: Option<DateTime<FixedOffset>>,
    emitted_at_last: usize,
    seen_at_last: usize,
}

impl ResumeCursor {
    pub fn is_fresh(&self) -> bool {
        self.last.is_none()
    }

    /// `sinceSeconds` for the next request: enough to cover the last line
    /// delivered, rounded up.
    pub fn since_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        let last = self.last?;
        let elapsed = now.signed_duration_since(last.with_timezone(&Utc));
        Some(elapsed.num_seconds().max(0) + 1)
    }

    /// Call before reading a new stream.
    pub fn begin_replay(&mut self) {
        self.seen_at_last = 0;
    }

    /// Decide whether a line stamped `at` is new. Lines without a timestamp
    /// can't be placed and are always let through.
    pub fn admit(&mut self, at: Option<DateTime<FixedOffset>>) -> bool {
        let Some(at) = at else {
            return true;
        };
        match self.last {
            Some(last) if at < last => false,
            Some(last) if at == last => {
                self.seen_at_last += 1;
                if self.seen_at_last <= self.emitted_at_last {
                    false
                } else {
                    self.emitted_at_last += 1;
                    true
                }
            }
            _ => {
                self.last = Some(at);
                self.emitted_at_last = 1;
                self.seen_at_last = 1;
                true
            }
        }
    }
}

pub fn to_raw_line(
    line: &str,
    pod_name: &str,
    namespace: &str,
    container_name: &str,
) -> (RawLogLine, Option<DateTime<FixedOffset>>) {
    let (mut raw, at) = match split_kubelet_timestamp(line) {
        Some((at, timestamp, message)) => (
            RawLogLine {
                message: message.to_string(),
                pod_name: pod_name.to_string(),
                timestamp: timestamp.to_string(),
                namespace: None,
                container: None,
            },
            Some(at),
        ),
        None => (RawLogLine::now(pod_name, line), None),
    };
    raw.namespace = Some(namespace.to_string());
    raw.container = Some(container_name.to_string());
    (raw, at)
}

enum StreamEnd {
    Eof,
    Failed,
    ReceiverGone,
}

/// Owns the follow tasks for every workflow pod container in one namespace.
pub struct PodFollower {
    ctx: TailContext,
    tasks: Arc<Mutex<HashMap<ContainerKey, JoinHandle<()>>>>,
}

impl PodFollower {
    pub fn new(ctx: TailContext) -> Self {
        Self {
            ctx,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Watch pods matching `selector` until the watch fails.
    pub async fn watch(&self, selector: &str) -> anyhow::Result<()> {
        let pods_api: Api<Pod> = Api::namespaced(self.ctx.client.clone(), &self.ctx.namespace);
        let cfg = WatcherConfig::default().labels(selector);
        debug!(
            "Watching pods matching {} in namespace {}",
            selector, self.ctx.namespace
        );

        let mut stream = watcher(pods_api, cfg).boxed();
        while let Some(event) = stream.try_next().await? {
            match event {
                Event::InitApply(pod) => self.on_pod(pod, true).await,
                Event::Apply(pod) => self.on_pod(pod, false).await,
                Event::Delete(pod) => self.forget_pod(&pod.name_any()).await,
                Event::Init => debug!("Listing workflow pods in {}", self.ctx.namespace),
                Event::InitDone => info!("Workflow pod listing complete in {}", self.ctx.namespace),
            }
        }
        Ok(())
    }

    async fn on_pod(&self, pod: Pod, initial_listing: bool) {
        let name = pod.name_any();
        let phase = pod
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .unwrap_or("Unknown");
        if !should_follow(phase, initial_listing) {
            return;
        }

        let containers: Vec<String> = match &self.ctx.container {
            Some(c) => vec![c.clone()],
            None => pod
                .spec
                .as_ref()
                .map(|spec| spec.containers.iter().map(|c| c.name.clone()).collect())
                .unwrap_or_default(),
        };

        // A finished follow task stays in the map so the container isn't read twice.
        let mut tasks = self.tasks.lock().await;
        for container_name in containers {
            let key = ContainerKey {
                pod_name: name.clone(),
                container_name,
            };
            if tasks.contains_key(&key) {
                continue;
            }
            info!("Following {}/{} ({})", key.pod_name, key.container_name, phase);
            let handle = tokio::spawn(follow_container(
                self.ctx.clone(),
                key.pod_name.clone(),
                key.container_name.clone(),
            ));
            tasks.insert(key, handle);
        }
    }

    /// The pod object is gone, and its logs with it.
    async fn forget_pod(&self, pod_name: &str) {
        info!("Pod deleted: {}", pod_name);
        self.tasks.lock().await.retain(|key, handle| {
            let gone = key.pod_name == pod_name;
            if gone {
                handle.abort();
            }
            !gone
        });
    }

    /// Stop every follow task and wait for them, so that all senders are
    /// dropped once this returns.
    pub async fn shutdown(self) {
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().await.drain().map(|(_, h)| h).collect();
        for handle in &tasks {
            handle.abort();
        }
        for handle in tasks {
            let _ = handle.await;
        }
    }
}

/// Follow one container's log until it has terminated and been read to EOF.
async fn follow_container(ctx: TailContext, pod_name: String, container_name: String) {
    let api: Api<Pod> = Api::namespaced(ctx.client.clone(), &ctx.namespace);
    let mut cursor = ResumeCursor::default();

    loop {
        let params = LogParams {
            follow: true,
            container: Some(container_name.clone()),
            timestamps: true,
            tail_lines: if cursor.is_fresh() { ctx.tail } else { None },
            since_seconds: cursor.since_seconds(Utc::now()),
            ..Default::default()
        };
        cursor.begin_replay();

        let end = match api.log_stream(&pod_name, &params).await {
            Ok(stream) => {
                forward_lines(stream, &mut cursor, &ctx, &pod_name, &container_name).await
            }
            Err(e) => {
                if let kube::Error::Api(err) = &e
                    && err.code == 404
                {
                    info!("Pod {} not found, stopping {}", pod_name, container_name);
                    return;
                }
                // Also the normal answer while the container is still being created.
                debug!(
                    "No log stream for {}/{} yet: {}",
                    pod_name, container_name, e
                );
                StreamEnd::Failed
            }
        };

        match end {
            StreamEnd::ReceiverGone => return,
            StreamEnd::Eof if container_terminated(&api, &pod_name, &container_name).await => {
                debug!("{}/{} terminated and fully read", pod_name, container_name);
                return;
            }
            StreamEnd::Eof | StreamEnd::Failed => {}
        }
        tokio::time::sleep(RETRY_DELAY).await;
    }
}

async fn forward_lines<R>(
    stream: R,
    cursor: &mut ResumeCursor,
    ctx: &TailContext,
    pod_name: &str,
    container_name: &str,
) -> StreamEnd
where
    R: AsyncBufRead,
{
    let mut reader = Box::pin(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => return StreamEnd::Eof,
            Ok(_) => {
                let line = decode_line(&buf);
                let (raw, at) = to_raw_line(&line, pod_name, &ctx.namespace, container_name);
                if !cursor.admit(at) {
                    continue;
                }
                if ctx.tx.send(raw).await.is_err() {
                    return StreamEnd::ReceiverGone;
                }
            }
            Err(e) => {
                warn!(
                    "Log stream for {}/{} broke: {}, resuming",
                    pod_name, container_name, e
                );
                return StreamEnd::Failed;
            }
        }
    }
}

async fn container_terminated(api: &Api<Pod>, pod_name: &str, container_name: &str) -> bool {
    match api.get(pod_name).await {
        Ok(pod) => pod
            .status
            .and_then(|s| s.container_statuses)
            .unwrap_or_default()
            .iter()
            .any(|cs| {
                cs.name == container_name
                    && cs.state.as_ref().is_some_and(|st| st.terminated.is_some())
            }),
        Err(kube::Error::Api(err)) if err.code == 404 => true,
        Err(e) => {
            debug!("Could not check {} status: {}", pod_name, e);
            false
        }
    }
}
