//! # pagepilot
//!
//! AI request execution pipeline and task orchestrator for a browser-hosted
//! assistant. A user-defined task (a prompt template bound to URL patterns)
//! is resolved, templated against the active page's context, and executed
//! against one of several interchangeable LLM providers through a shared
//! rate-limited queue, with automatic provider fallback, bounded retries with
//! exponential backoff, response caching, and content sanitization.
//!
//! ## Architecture
//!
//! ```text
//! caller -> TaskOrchestrator -> ProviderRouter -> RequestQueue -> ProviderAdapter -> HTTPS
//!                |                    |
//!           (templating,         (cache read/write,
//!            enrichment)          scoped fallback)
//! ```
//!
//! External collaborators (task storage, DOM extraction, auxiliary context)
//! are consumed through traits so the pipeline stays testable in isolation.

pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod queue;
pub mod router;
pub mod security;
pub mod types;

pub use cache::{KeyOptions, ResponseCache};
pub use config::{CacheConfig, PipelineConfig, ProviderConfig, QueueConfig};
pub use error::{AiError, ErrorCode, Result};
pub use orchestrator::{
    ContentExtractor, ContextBundleBuilder, ExecutionContext, ExecutionOptions, TaskOrchestrator,
    TaskStore,
};
pub use providers::{AnthropicAdapter, OpenAiAdapter, ProviderAdapter};
pub use queue::RequestQueue;
pub use router::{ProviderHealth, ProviderRouter};
pub use types::{
    AIConstraints, AIRequest, AIResponse, OutputFormat, ProviderKind, ProviderSubstitution,
    SecurityLevel, TaskDefinition, TaskResult, TaskType, WebsiteContext,
};
