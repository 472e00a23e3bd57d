use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One web search result, normalized across providers.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
}

/// Web search collaborator. Resolves to `None` when the provider cannot be
/// reached, rejects the request, or is not configured; the failure is logged
/// by the implementation. Calls are bounded by the configured HTTP timeout
/// times the retry attempts.
#[async_trait]
pub trait WebSearchConnector: Send + Sync {
    async fn search(&self, query: &str, count: u32) -> Option<Vec<SearchHit>>;
}
