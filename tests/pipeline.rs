//! End-to-end pipeline tests against mocked provider endpoints.
//!
//! These exercise the real HTTP adapters, queue, router, and cache
//! together, with wiremock standing in for the upstream APIs.

use pagepilot::{
    AiError, AnthropicAdapter, ErrorCode, OpenAiAdapter, ProviderAdapter, ProviderConfig,
    ProviderKind, ProviderRouter, QueueConfig, RequestQueue, ResponseCache,
};
use pagepilot::{AIRequest, CacheConfig, TaskType, WebsiteContext};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(prompt: &str) -> AIRequest {
    AIRequest::new(
        prompt,
        WebsiteContext::new("example.com", "news"),
        TaskType::Summarize,
    )
}

fn fast_queue() -> RequestQueue {
    RequestQueue::new(QueueConfig {
        rpm: 10_000,
        max_retries: 2,
        base_delay_ms: 1,
        max_delay_ms: 5,
        jitter: 0.0,
        tick_ms: 1,
    })
}

fn openai_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "logprobs": {
                "content": [
                    { "token": "a", "logprob": -0.1 },
                    { "token": "b", "logprob": -0.3 }
                ]
            },
            "finish_reason": "stop"
        }]
    })
}

fn anthropic_body(content: &str) -> serde_json::Value {
    json!({
        "id": "msg-test",
        "content": [
            { "type": "text", "text": content }
        ],
        "stop_reason": "end_turn"
    })
}

#[tokio::test]
async fn openai_adapter_speaks_chat_completions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "logprobs": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body("summary text")))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = OpenAiAdapter::new(
        ProviderConfig::openai()
            .with_api_key("sk-test")
            .with_base_url(server.uri()),
    )
    .unwrap();

    let response = adapter.execute(&request("Summarize this")).await.unwrap();
    assert_eq!(response.content, "summary text");
    assert!(response.confidence > 0.0 && response.confidence < 1.0);
}

#[tokio::test]
async fn anthropic_adapter_speaks_messages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_body("claude says hi")))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = AnthropicAdapter::new(
        ProviderConfig::anthropic()
            .with_api_key("sk-ant-test")
            .with_base_url(server.uri()),
    )
    .unwrap();

    let response = adapter.execute(&request("Summarize this")).await.unwrap();
    assert_eq!(response.content, "claude says hi");
}

#[tokio::test]
async fn rate_limit_response_carries_retry_hint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429).insert_header("retry-after", "3"),
        )
        .mount(&server)
        .await;

    let adapter = OpenAiAdapter::new(
        ProviderConfig::openai()
            .with_api_key("sk-test")
            .with_base_url(server.uri()),
    )
    .unwrap();

    let err = adapter.execute(&request("hi")).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::RateLimit);
    assert_eq!(err.retry_after_ms(), Some(3_000));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn queue_retries_server_errors_until_budget() {
    let server = MockServer::start().await;

    // Always 500; with max_retries=2 the queue should try 3 times total.
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let adapter: Arc<dyn ProviderAdapter> = Arc::new(
        OpenAiAdapter::new(
            ProviderConfig::openai()
                .with_api_key("sk-test")
                .with_base_url(server.uri()),
        )
        .unwrap(),
    );

    let queue = fast_queue();
    let err = queue.enqueue(request("hi"), adapter).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ServerError);
    queue.shutdown();
}

#[tokio::test]
async fn router_falls_back_and_reports_substitution() {
    let primary = MockServer::start().await;
    let secondary = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&primary)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_body("fallback wins")))
        .expect(1)
        .mount(&secondary)
        .await;

    let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
        Arc::new(
            OpenAiAdapter::new(
                ProviderConfig::openai()
                    .with_api_key("sk-test")
                    .with_base_url(primary.uri()),
            )
            .unwrap(),
        ),
        Arc::new(
            AnthropicAdapter::new(
                ProviderConfig::anthropic()
                    .with_api_key("sk-ant-test")
                    .with_base_url(secondary.uri()),
            )
            .unwrap(),
        ),
    ];

    let queue = RequestQueue::new(QueueConfig {
        rpm: 10_000,
        max_retries: 0,
        base_delay_ms: 1,
        max_delay_ms: 5,
        jitter: 0.0,
        tick_ms: 1,
    });
    let router = ProviderRouter::new(
        adapters,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        queue,
        Arc::new(ResponseCache::new(CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })),
    )
    .unwrap();

    let response = router
        .process_request_with_fallback(request("hi"))
        .await
        .unwrap();
    assert_eq!(response.content, "fallback wins");
    let substitution = response.substitution.unwrap();
    assert_eq!(substitution.original, ProviderKind::OpenAi);
    assert_eq!(substitution.used, ProviderKind::Anthropic);

    // The switch is scoped to the failed call.
    assert_eq!(router.current_provider(), ProviderKind::OpenAi);
}

#[tokio::test]
async fn identical_requests_hit_cache_not_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_body("cached answer")))
        .expect(1)
        .mount(&server)
        .await;

    let adapters: Vec<Arc<dyn ProviderAdapter>> = vec![
        Arc::new(
            OpenAiAdapter::new(
                ProviderConfig::openai()
                    .with_api_key("sk-test")
                    .with_base_url(server.uri()),
            )
            .unwrap(),
        ),
        Arc::new(
            AnthropicAdapter::new(ProviderConfig::anthropic().with_api_key("sk-ant-test"))
                .unwrap(),
        ),
    ];

    let router = ProviderRouter::new(
        adapters,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        fast_queue(),
        Arc::new(ResponseCache::new(CacheConfig::default())),
    )
    .unwrap();

    let first = router.process_request(request("same prompt")).await.unwrap();
    let second = router.process_request(request("same prompt")).await.unwrap();
    assert_eq!(first.content, second.content);
    assert_eq!(router.cache().stats().hits, 1);
}

#[tokio::test]
async fn auth_failures_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let adapter: Arc<dyn ProviderAdapter> = Arc::new(
        OpenAiAdapter::new(
            ProviderConfig::openai()
                .with_api_key("bad-key")
                .with_base_url(server.uri()),
        )
        .unwrap(),
    );

    let queue = fast_queue();
    let err = queue.enqueue(request("hi"), adapter).await.unwrap_err();
    assert!(matches!(err, AiError::Auth { .. }));
    queue.shutdown();
}
