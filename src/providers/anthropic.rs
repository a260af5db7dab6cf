//! Anthropic-style adapter (messages wire format, API-key header auth)

use super::openai::{map_transport_error, retry_after_ms};
use super::parse;
use super::prompt;
use super::ProviderAdapter;
use crate::config::ProviderConfig;
use crate::error::{AiError, Result};
use crate::types::{AIRequest, AIResponse, ProviderKind};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::{json, Value};
use tokio::time::timeout;
use tracing::debug;

const API_VERSION: &str = "2023-06-01";
const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Adapter for messages-compatible endpoints.
#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    config: ProviderConfig,
    http: Client,
}

impl AnthropicAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        let http = ClientBuilder::new()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| AiError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn build_body(&self, request: &AIRequest) -> Value {
        let assembled = prompt::assemble(request);

        let mut body = json!({
            "model": self.config.model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "messages": [{ "role": "user", "content": assembled.user }],
        });

        if let Some(system) = assembled.system {
            body["system"] = Value::String(system);
        }

        body
    }

    fn parse_response(&self, request: &AIRequest, body: &str) -> Result<AIResponse> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AiError::parse(format!("malformed response body: {e}")))?;

        let content = value["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter_map(|b| b["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let request_id = value["id"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        // No logprobs on this wire shape; the fixed default applies.
        parse::finalize(request, content, parse::DEFAULT_CONFIDENCE, request_id)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn execute(&self, request: &AIRequest) -> Result<AIResponse> {
        request.validate()?;

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::auth("no API key configured for anthropic"))?;

        let body = self.build_body(request);
        debug!(model = %self.config.model, "dispatching anthropic request");

        let send = self
            .http
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send();

        let response = timeout(self.config.request_timeout(), send)
            .await
            .map_err(|_| AiError::timeout("anthropic request exceeded timeout"))?
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let retry_after = retry_after_ms(&response);
        let text = response
            .text()
            .await
            .map_err(|e| AiError::network(format!("failed to read response body: {e}")))?;

        if status != 200 {
            return Err(match status {
                429 => AiError::rate_limit(format!("status 429: {text}"), retry_after),
                _ => AiError::from_status(status, &text),
            });
        }

        self.parse_response(request, &text)
    }
}
