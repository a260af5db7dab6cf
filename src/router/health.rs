//! Provider availability probes

use crate::providers::ProviderAdapter;
use crate::types::{AIRequest, TaskType, WebsiteContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ephemeral availability snapshot for one provider. Refreshed per probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub available: bool,
    pub last_test: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Minimal request used to exercise a provider end to end.
fn probe_request() -> AIRequest {
    AIRequest::new(
        "ping",
        WebsiteContext::new("health.internal", "probe").with_page_type("healthcheck"),
        TaskType::Generate,
    )
}

pub(super) async fn probe(adapter: &dyn ProviderAdapter) -> ProviderHealth {
    debug!(provider = adapter.name(), "probing provider health");
    match adapter.execute(&probe_request()).await {
        Ok(_) => ProviderHealth {
            available: true,
            last_test: Utc::now(),
            error: None,
        },
        Err(err) => ProviderHealth {
            available: false,
            last_test: Utc::now(),
            error: Some(err.to_string()),
        },
    }
}
