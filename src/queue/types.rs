//! Queue entry and rate-limit window records

use crate::error::Result;
use crate::providers::ProviderAdapter;
use crate::types::{AIRequest, AIResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use uuid::Uuid;

/// Length of the rate-limit window.
pub(crate) const WINDOW: Duration = Duration::from_secs(60);

/// One queued execution. Owned exclusively by the queue; destroyed when the
/// caller's future settles.
pub(crate) struct QueuedRequest {
    pub id: Uuid,
    pub request: AIRequest,
    pub adapter: Arc<dyn ProviderAdapter>,
    pub result_tx: oneshot::Sender<Result<AIResponse>>,
    pub timestamp: Instant,
    pub retry_count: u32,
}

impl QueuedRequest {
    pub fn new(
        request: AIRequest,
        adapter: Arc<dyn ProviderAdapter>,
        result_tx: oneshot::Sender<Result<AIResponse>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            adapter,
            result_tx,
            timestamp: Instant::now(),
            retry_count: 0,
        }
    }

    /// Builds the replacement record used for a requeue: same id, request,
    /// and settlement channel, incremented retry count, fresh timestamp.
    pub fn into_retry(self) -> Self {
        Self {
            timestamp: Instant::now(),
            retry_count: self.retry_count + 1,
            ..self
        }
    }
}

/// Request-count window with a fixed 60 s reset.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    pub request_count: u32,
    pub window_start: Instant,
    pub rpm: u32,
}

impl RateLimitState {
    pub fn new(rpm: u32) -> Self {
        Self {
            request_count: 0,
            window_start: Instant::now(),
            rpm,
        }
    }

    /// Tries to account for one execution beginning now.
    ///
    /// Returns `Ok(())` and increments the counter when quota remains, or
    /// `Err(wait)` with the bounded duration until the window resets.
    pub fn try_begin(&mut self, now: Instant) -> std::result::Result<(), Duration> {
        if now.duration_since(self.window_start) >= WINDOW {
            self.request_count = 0;
            self.window_start = now;
        }

        if self.request_count < self.rpm {
            self.request_count += 1;
            Ok(())
        } else {
            Err(WINDOW.saturating_sub(now.duration_since(self.window_start)))
        }
    }

}
