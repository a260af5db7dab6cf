//! OpenAI-style adapter (chat-completion wire format, bearer auth)

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

/// Adapter for chat-completion-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    config: ProviderConfig,
    http: Client,
}

impl OpenAiAdapter {
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
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_body(&self, request: &AIRequest) -> Value {
        let assembled = prompt::assemble(request);

        let mut messages = Vec::new();
        if let Some(system) = assembled.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": assembled.user }));

        json!({
            "model": self.config.model,
            "messages": messages,
            "logprobs": true,
        })
    }

    fn parse_response(&self, request: &AIRequest, body: &str) -> Result<AIResponse> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AiError::parse(format!("malformed response body: {e}")))?;

        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        let logprobs: Vec<f64> = value["choices"][0]["logprobs"]["content"]
            .as_array()
            .map(|tokens| {
                tokens
                    .iter()
                    .filter_map(|t| t["logprob"].as_f64())
                    .collect()
            })
            .unwrap_or_default();

        let request_id = value["id"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        parse::finalize(
            request,
            content,
            parse::confidence_from_logprobs(&logprobs),
            request_id,
        )
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn execute(&self, request: &AIRequest) -> Result<AIResponse> {
        request.validate()?;

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AiError::auth("no API key configured for openai"))?;

        let body = self.build_body(request);
        debug!(model = %self.config.model, "dispatching openai request");

        let send = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send();

        let response = timeout(self.config.request_timeout(), send)
            .await
            .map_err(|_| AiError::timeout("openai request exceeded timeout"))?
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

/// Maps reqwest transport failures into the taxonomy.
pub(crate) fn map_transport_error(err: reqwest::Error) -> AiError {
    if err.is_timeout() {
        AiError::timeout(format!("request timed out: {err}"))
    } else {
        AiError::network(format!("network error: {err}"))
    }
}

/// Retry-After header in milliseconds, when present and parseable.
pub(crate) fn retry_after_ms(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(|secs| secs * 1_000)
}
