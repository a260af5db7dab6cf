//! Provider adapters
//!
//! Each adapter translates the provider-agnostic [`AIRequest`] into one
//! backend family's wire format, executes it under a timeout, and parses the
//! wire response back into the canonical [`AIResponse`]. Failures map into
//! the shared taxonomy so the queue's retry policy treats every backend the
//! same way.

mod anthropic;
mod openai;
pub(crate) mod parse;
pub(crate) mod prompt;

pub use anthropic::AnthropicAdapter;
pub use openai::OpenAiAdapter;

use crate::error::Result;
use crate::types::{AIRequest, AIResponse, ProviderKind};
use async_trait::async_trait;

/// Unified interface over interchangeable LLM backends.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider name used in logs and health reports.
    fn name(&self) -> &'static str;

    /// Which backend family this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Executes one request against the backend.
    ///
    /// Implementations validate the request, build the wire body, send it
    /// under the configured timeout, and parse the response. All failures
    /// come back as classified [`AiError`](crate::error::AiError)s.
    async fn execute(&self, request: &AIRequest) -> Result<AIResponse>;
}
