//! Provider routing
//!
//! The router owns the configured adapters and the notion of a "current"
//! provider. Requests flow through the shared queue; the response cache
//! short-circuits at this boundary (read before dispatch, write after
//! success, no lock spanning the call).

mod health;


pub use health::ProviderHealth;

use crate::cache::{KeyOptions, ResponseCache};
use crate::config::PipelineConfig;
use crate::error::{AiError, Result};
use crate::providers::{AnthropicAdapter, OpenAiAdapter, ProviderAdapter};
use crate::queue::RequestQueue;
use crate::types::{AIRequest, AIResponse, ProviderKind, ProviderSubstitution};
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes requests to the current provider, with a transactional fallback
/// mode that always restores the original selection.
pub struct ProviderRouter {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
    /// Mutated only inside the scoped fallback transaction. Sync lock:
    /// never held across an await.
    current: RwLock<ProviderKind>,
    fallback: ProviderKind,
    queue: RequestQueue,
    cache: Arc<ResponseCache>,
    key_options: KeyOptions,
}

impl ProviderRouter {
    /// Wires a router from explicit parts. Useful for tests and custom
    /// adapter sets.
    pub fn new(
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        current: ProviderKind,
        fallback: ProviderKind,
        queue: RequestQueue,
        cache: Arc<ResponseCache>,
    ) -> Result<Self> {
        let adapters: HashMap<_, _> = adapters.into_iter().map(|a| (a.kind(), a)).collect();
        if !adapters.contains_key(&current) {
            return Err(AiError::invalid_request(format!(
                "current provider {current} is not configured"
            )));
        }
        if !adapters.contains_key(&fallback) {
            return Err(AiError::invalid_request(format!(
                "fallback provider {fallback} is not configured"
            )));
        }

        Ok(Self {
            adapters,
            current: RwLock::new(current),
            fallback,
            queue,
            cache,
            key_options: KeyOptions::default(),
        })
    }

    /// Builds the standard two-provider router from configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let queue = RequestQueue::new(config.queue.clone());
        let cache = Arc::new(ResponseCache::new(config.cache.clone()));
        let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
            Arc::new(OpenAiAdapter::new(config.openai.clone())?),
            Arc::new(AnthropicAdapter::new(config.anthropic.clone())?),
        ];
        Self::new(
            adapters,
            config.default_provider,
            config.fallback_provider,
            queue,
            cache,
        )
    }

    /// The provider requests are currently dispatched to.
    pub fn current_provider(&self) -> ProviderKind {
        *self.current.read()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    fn adapter(&self, kind: ProviderKind) -> Result<Arc<dyn ProviderAdapter>> {
        self.adapters
            .get(&kind)
            .cloned()
            .ok_or_else(|| AiError::invalid_request(format!("provider {kind} is not configured")))
    }

    /// Dispatches to the current provider through the queue, consulting the
    /// cache on the way in and populating it on success.
    pub async fn process_request(&self, request: AIRequest) -> Result<AIResponse> {
        request.validate()?;

        let key = self.cache.generate_key(&request, self.key_options);
        if let Some(cached) = self.cache.get(&key) {
            debug!(key = %key.as_str(), "serving response from cache");
            return Ok(cached);
        }

        let kind = *self.current.read();
        let adapter = self.adapter(kind)?;
        let response = self.queue.enqueue(request, adapter).await?;

        self.cache.set(key, response.clone(), None);
        Ok(response)
    }

    /// Attempts the current provider; on failure, switches to the configured
    /// alternate for exactly one retry, then restores the original provider
    /// regardless of outcome. If the fallback also fails, the *original*
    /// error is re-raised.
    pub async fn process_request_with_fallback(&self, request: AIRequest) -> Result<AIResponse> {
        let original = *self.current.read();

        let first = self.process_request(request.clone()).await;
        let original_err = match first {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if self.fallback == original {
            return Err(original_err);
        }

        warn!(
            from = %original,
            to = %self.fallback,
            error = %original_err,
            "provider failed, attempting fallback"
        );

        // Scoped switch: the guard restores `original` on drop, so the
        // selection is reverted even if the caller stops awaiting mid-call.
        let second = {
            let _restore = FallbackScope::enter(&self.current, original, self.fallback);
            self.process_request(request).await
        };

        match second {
            Ok(response) => {
                info!(used = %self.fallback, "fallback provider answered");
                Ok(response.with_substitution(ProviderSubstitution {
                    original,
                    used: self.fallback,
                }))
            }
            Err(fallback_err) => {
                warn!(error = %fallback_err, "fallback provider also failed");
                Err(original_err)
            }
        }
    }

    /// Probes every configured provider with a minimal request.
    ///
    /// Probes run directly against the adapters, bypassing the queue so they
    /// consume no caller quota, and never mutate the current selection.
    pub async fn get_service_health(&self) -> HashMap<ProviderKind, ProviderHealth> {
        let probes = self.adapters.iter().map(|(kind, adapter)| async move {
            (*kind, health::probe(adapter.as_ref()).await)
        });
        join_all(probes).await.into_iter().collect()
    }
}

/// Switches the current provider for the lifetime of the guard and writes
/// the original back in `Drop`, which also runs when the fallback future is
/// dropped before completion.
struct FallbackScope<'a> {
    current: &'a RwLock<ProviderKind>,
    original: ProviderKind,
}

impl<'a> FallbackScope<'a> {
    fn enter(
        current: &'a RwLock<ProviderKind>,
        original: ProviderKind,
        fallback: ProviderKind,
    ) -> Self {
        *current.write() = fallback;
        Self { current, original }
    }
}

impl Drop for FallbackScope<'_> {
    fn drop(&mut self) {
        *self.current.write() = self.original;
    }
}
