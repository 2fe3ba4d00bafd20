//! Request/response front end for the coordinator.
//!
//! Callers hold a cloneable [`SimplifierHandle`] and talk to a single
//! [`SimplifierService`] task over an `mpsc` channel. Replies travel back on
//! `oneshot` channels and every awaited reply is bounded by a timeout. Each
//! request is handled in its own task, so a slow remote call does not hold up
//! the queue.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use focusflow_config::ServiceConfig;
use focusflow_protocols::{BatchItem, BatchResult, Grade, SimplifyOutcome};

use crate::coordinator::Coordinator;
use crate::error::ServiceError;
use crate::precompute::PrecomputeRegistry;

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;

/// Service tuning.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub channel_capacity: usize,
    pub reply_timeout: Duration,
    /// Start a precompute job after each authoritative `simplify_text`.
    pub precompute_enabled: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            reply_timeout: Duration::from_secs(120),
            precompute_enabled: true,
        }
    }
}

impl ServiceOptions {
    pub fn from_config(config: &ServiceConfig, precompute_enabled: bool) -> Self {
        Self {
            channel_capacity: config.channel_capacity.max(1),
            reply_timeout: Duration::from_secs(config.reply_timeout_secs),
            precompute_enabled,
        }
    }
}

/// One message to the service.
#[derive(Debug)]
enum Request {
    SimplifyText {
        text: String,
        grade: Grade,
        page_id: String,
        reply: oneshot::Sender<SimplifyOutcome>,
    },
    SimplifyBatch {
        items: Vec<BatchItem>,
        grade: Grade,
        page_id: String,
        reply: oneshot::Sender<Vec<BatchResult>>,
    },
    PreCacheBatch {
        items: Vec<BatchItem>,
        grade: Grade,
        page_id: String,
    },
    PreCache {
        items: Vec<BatchItem>,
        grade: Grade,
        page_id: String,
    },
    CheckCache {
        text: String,
        grade: Grade,
        reply: oneshot::Sender<bool>,
    },
    Probe {
        reply: oneshot::Sender<bool>,
    },
    SetBackendUrl {
        url: String,
        reply: oneshot::Sender<bool>,
    },
}

impl Request {
    fn verb(&self) -> &'static str {
        match self {
            Self::SimplifyText { .. } => "simplifyText",
            Self::SimplifyBatch { .. } => "simplifyBatch",
            Self::PreCacheBatch { .. } => "preCacheBatch",
            Self::PreCache { .. } => "preCache",
            Self::CheckCache { .. } => "checkCache",
            Self::Probe { .. } => "probe",
            Self::SetBackendUrl { .. } => "setBackendUrl",
        }
    }
}

/// Cloneable client side of the service.
#[derive(Debug, Clone)]
pub struct SimplifierHandle {
    tx: mpsc::Sender<Request>,
    reply_timeout: Duration,
}

impl SimplifierHandle {
    async fn send(&self, request: Request) -> Result<(), ServiceError> {
        self.tx.send(request).await.map_err(|_| ServiceError::Closed)
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;

        match tokio::time::timeout(self.reply_timeout, rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(ServiceError::ReplyDropped),
            Err(_) => Err(ServiceError::Timeout(self.reply_timeout)),
        }
    }

    pub async fn simplify_text(
        &self,
        text: impl Into<String>,
        grade: Grade,
        page_id: impl Into<String>,
    ) -> Result<SimplifyOutcome, ServiceError> {
        let (text, page_id) = (text.into(), page_id.into());
        self.call(|reply| Request::SimplifyText {
            text,
            grade,
            page_id,
            reply,
        })
        .await
    }

    pub async fn simplify_batch(
        &self,
        items: Vec<BatchItem>,
        grade: Grade,
        page_id: impl Into<String>,
    ) -> Result<Vec<BatchResult>, ServiceError> {
        let page_id = page_id.into();
        self.call(|reply| Request::SimplifyBatch {
            items,
            grade,
            page_id,
            reply,
        })
        .await
    }

    /// Fire-and-forget: returns once the request is queued.
    pub async fn pre_cache_batch(
        &self,
        items: Vec<BatchItem>,
        grade: Grade,
        page_id: impl Into<String>,
    ) -> Result<(), ServiceError> {
        self.send(Request::PreCacheBatch {
            items,
            grade,
            page_id: page_id.into(),
        })
        .await
    }

    /// Fire-and-forget: probes, then warms the cache in chunks.
    pub async fn pre_cache(
        &self,
        items: Vec<BatchItem>,
        grade: Grade,
        page_id: impl Into<String>,
    ) -> Result<(), ServiceError> {
        self.send(Request::PreCache {
            items,
            grade,
            page_id: page_id.into(),
        })
        .await
    }

    pub async fn check_cache(
        &self,
        text: impl Into<String>,
        grade: Grade,
    ) -> Result<bool, ServiceError> {
        let text = text.into();
        self.call(|reply| Request::CheckCache { text, grade, reply })
            .await
    }

    pub async fn probe(&self) -> Result<bool, ServiceError> {
        self.call(|reply| Request::Probe { reply }).await
    }

    /// Point the remote client at another service. Replies `false` when the
    /// URL was rejected and the old one is still in use.
    pub async fn set_backend_url(&self, url: impl Into<String>) -> Result<bool, ServiceError> {
        let url = url.into();
        self.call(|reply| Request::SetBackendUrl { url, reply }).await
    }

    /// Whether the service task has stopped reading requests.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// State shared by the per-request tasks.
#[derive(Clone)]
struct Worker {
    coordinator: Coordinator,
    jobs: PrecomputeRegistry,
    precompute_enabled: bool,
}

impl Worker {
    async fn handle(self, request: Request) {
        let verb = request.verb();
        debug!(verb, "Handling request");

        match request {
            Request::SimplifyText {
                text,
                grade,
                page_id,
                reply,
            } => {
                let outcome = self.coordinator.simplify_one(&text, grade, &page_id).await;
                if outcome.is_authoritative() && self.precompute_enabled {
                    let job = self.coordinator.spawn_precompute(text, grade, page_id);
                    self.jobs.replace(job);
                }
                respond(verb, reply, outcome);
            }
            Request::SimplifyBatch {
                items,
                grade,
                page_id,
                reply,
            } => {
                let results = self.coordinator.simplify_batch(&items, grade, &page_id).await;
                respond(verb, reply, results);
            }
            Request::PreCacheBatch {
                items,
                grade,
                page_id,
            } => {
                self.coordinator.pre_cache_batch(&items, grade, &page_id).await;
            }
            Request::PreCache {
                items,
                grade,
                page_id,
            } => {
                self.coordinator.pre_cache(&items, grade, &page_id).await;
            }
            Request::CheckCache { text, grade, reply } => {
                let found = self.coordinator.check_cache(&text, grade).await;
                respond(verb, reply, found);
            }
            Request::Probe { reply } => {
                respond(verb, reply, self.coordinator.probe().await);
            }
            Request::SetBackendUrl { url, reply } => {
                let accepted = match self.coordinator.remote().set_base_url(&url) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(url = %url, error = %e, "Backend URL rejected");
                        false
                    }
                };
                respond(verb, reply, accepted);
            }
        }
    }
}

fn respond<T>(verb: &str, reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        debug!(verb, "Caller went away before the reply");
    }
}

/// Owns the coordinator and serves requests until every handle is dropped.
pub struct SimplifierService {
    rx: mpsc::Receiver<Request>,
    worker: Worker,
}

impl SimplifierService {
    pub fn new(coordinator: Coordinator, options: ServiceOptions) -> (Self, SimplifierHandle) {
        let (tx, rx) = mpsc::channel(options.channel_capacity.max(1));
        let service = Self {
            rx,
            worker: Worker {
                coordinator,
                jobs: PrecomputeRegistry::new(),
                precompute_enabled: options.precompute_enabled,
            },
        };
        let handle = SimplifierHandle {
            tx,
            reply_timeout: options.reply_timeout,
        };
        (service, handle)
    }

    /// Create and start the service on the current runtime.
    pub fn spawn(
        coordinator: Coordinator,
        options: ServiceOptions,
    ) -> (SimplifierHandle, JoinHandle<()>) {
        let (service, handle) = Self::new(coordinator, options);
        (handle, tokio::spawn(service.run()))
    }

    /// Precompute jobs started by this service, one per page.
    pub fn jobs(&self) -> PrecomputeRegistry {
        self.worker.jobs.clone()
    }

    pub async fn run(mut self) {
        info!("Simplifier service started");
        while let Some(request) = self.rx.recv().await {
            tokio::spawn(self.worker.clone().handle(request));
        }

        let pending = self.worker.jobs.len();
        if pending > 0 {
            debug!(pending, "Cancelling precompute jobs on shutdown");
        }
        self.worker.jobs.cancel_all();
        info!("Simplifier service stopped");
    }
}
