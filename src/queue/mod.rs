//! Request queue and rate limiter
//!
//! A single background loop drains a FIFO queue under a rolling
//! request-count window. At most one dispatch is in flight at a time;
//! retryable failures re-enter at the *front* of the queue after a jittered
//! exponential delay, so retries are prioritized over fresh arrivals. That
//! front-requeue is an accepted starvation tradeoff: a persistently failing
//! entry can delay fresh arrivals for up to
//! `max_retries` backoff periods.

mod dispatch;
mod types;


pub use types::RateLimitState;

use crate::config::QueueConfig;
use crate::error::{AiError, Result};
use crate::providers::ProviderAdapter;
use crate::types::{AIRequest, AIResponse};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, Notify};
use tracing::debug;
use types::QueuedRequest;

/// Shared state between the queue handle and its dispatch loop.
pub(crate) struct QueueInner {
    pub(crate) config: QueueConfig,
    pub(crate) entries: Mutex<VecDeque<QueuedRequest>>,
    pub(crate) window: Mutex<RateLimitState>,
    pub(crate) notify: Notify,
    pub(crate) shutdown: AtomicBool,
}

/// Handle to the shared rate-limited request queue.
///
/// Cloning shares the same queue and dispatch loop.
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<QueueInner>,
}

impl RequestQueue {
    /// Creates the queue and spawns its dispatch loop.
    pub fn new(config: QueueConfig) -> Self {
        let rpm = config.rpm;
        let inner = Arc::new(QueueInner {
            config,
            entries: Mutex::new(VecDeque::new()),
            window: Mutex::new(RateLimitState::new(rpm)),
            notify: Notify::new(),
            shutdown: AtomicBool::new(false),
        });

        tokio::spawn(dispatch::run(Arc::clone(&inner)));

        Self { inner }
    }

    /// Enqueues a request for execution on the given adapter.
    ///
    /// The returned future settles when the request either succeeds, fails
    /// with a non-retryable classification, or exhausts its retry budget.
    pub async fn enqueue(
        &self,
        request: AIRequest,
        adapter: Arc<dyn ProviderAdapter>,
    ) -> Result<AIResponse> {
        if self.inner.shutdown.load(Ordering::SeqCst) {
            return Err(AiError::invalid_request("request queue is shut down"));
        }

        let (tx, rx) = oneshot::channel();
        let entry = QueuedRequest::new(request, adapter, tx);
        let id = entry.id;

        {
            let mut entries = self.inner.entries.lock().await;
            entries.push_back(entry);
            debug!(%id, depth = entries.len(), "request enqueued");
        }
        self.inner.notify.notify_one();

        rx.await
            .map_err(|_| AiError::invalid_request("request queue shut down before settlement"))?
    }

    /// Number of entries waiting for dispatch (excludes the one in flight).
    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.lock().await.is_empty()
    }

    /// Stops the dispatch loop. Pending entries settle with an error.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }
}
