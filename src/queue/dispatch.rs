//! Background dispatch loop
//!
//! Sole consumer of queue order and sole writer of the rate-limit window.
//! Executing the popped entry inline keeps exactly one dispatch in flight.

use super::types::QueuedRequest;
use super::QueueInner;
use crate::config::QueueConfig;
use crate::error::AiError;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

pub(crate) async fn run(inner: Arc<QueueInner>) {
    loop {
        if inner.shutdown.load(Ordering::SeqCst) {
            drain(&inner).await;
            return;
        }

        let entry = inner.entries.lock().await.pop_front();
        let Some(entry) = entry else {
            // Idle: wake on new work or on the next tick.
            tokio::select! {
                _ = inner.notify.notified() => {}
                _ = tokio::time::sleep(inner.config.tick()) => {}
            }
            continue;
        };

        // Window accounting happens when an execution begins, so the rpm
        // bound holds regardless of how the execution ends.
        let quota = {
            let mut window = inner.window.lock().await;
            window.try_begin(Instant::now())
        };

        if let Err(wait) = quota {
            debug!(wait_ms = wait.as_millis() as u64, "rate window exhausted");
            inner.entries.lock().await.push_front(entry);
            // Bounded sleep until the window resets; a shutdown or enqueue
            // notification may wake it early, the re-check handles both.
            tokio::select! {
                _ = inner.notify.notified() => {}
                _ = tokio::time::sleep(wait) => {}
            }
            continue;
        }

        execute(&inner, entry).await;
    }
}

/// Runs one entry to completion and settles or requeues it.
async fn execute(inner: &Arc<QueueInner>, entry: QueuedRequest) {
    let result = entry.adapter.execute(&entry.request).await;

    match result {
        Ok(response) => {
            debug!(id = %entry.id, retries = entry.retry_count, "request settled");
            let _ = entry.result_tx.send(Ok(response));
        }
        Err(err) if !err.is_retryable() => {
            debug!(id = %entry.id, code = %err.code(), "non-retryable failure");
            let _ = entry.result_tx.send(Err(err));
        }
        Err(err) if entry.retry_count >= inner.config.max_retries => {
            warn!(
                id = %entry.id,
                attempts = entry.retry_count + 1,
                code = %err.code(),
                "retry budget exhausted"
            );
            let _ = entry.result_tx.send(Err(err));
        }
        Err(err) => {
            let delay = backoff_delay(&inner.config, entry.retry_count, err.retry_after_ms());
            debug!(
                id = %entry.id,
                attempt = entry.retry_count + 1,
                delay_ms = delay.as_millis() as u64,
                code = %err.code(),
                "requeueing after backoff"
            );

            let retry = entry.into_retry();
            let inner = Arc::clone(inner);
            // A timer task re-inserts at the front so the loop stays free to
            // dispatch other entries during the backoff.
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                inner.entries.lock().await.push_front(retry);
                inner.notify.notify_one();
            });
        }
    }
}

/// `base * 2^attempt * (1 ± jitter)`, capped, floored by any provider hint.
fn backoff_delay(config: &QueueConfig, attempt: u32, hint_ms: Option<u64>) -> Duration {
    let exp = config
        .base_delay_ms
        .saturating_mul(1u64 << attempt.min(16))
        .min(config.max_delay_ms);

    let spread = (rand::random::<f64>() * 2.0 - 1.0) * config.jitter;
    let jittered = (exp as f64 * (1.0 + spread)).max(0.0) as u64;

    Duration::from_millis(jittered.max(hint_ms.unwrap_or(0)).min(config.max_delay_ms))
}

/// Settles everything still queued when the loop stops.
async fn drain(inner: &Arc<QueueInner>) {
    let mut entries = inner.entries.lock().await;
    while let Some(entry) = entries.pop_front() {
        let _ = entry
            .result_tx
            .send(Err(AiError::invalid_request("request queue is shut down")));
    }
}
