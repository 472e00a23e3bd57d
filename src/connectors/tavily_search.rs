//! Tavily search API connector.

use super::config::SearchServiceConfig;
use super::errors::ConnectorError;
use super::http::{build_client, send_json};
use super::search::{SearchHit, WebSearchConnector};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize, Default)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

pub struct TavilySearchClient {
    base_url: String,
    api_key: Option<String>,
    retry_attempts: usize,
    http_client: reqwest::Client,
}

impl TavilySearchClient {
    pub fn new(config: &SearchServiceConfig) -> Result<Self, ConnectorError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            retry_attempts: config.retry_attempts,
            http_client: build_client(config.timeout_secs)?,
        })
    }

    async fn query(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, ConnectorError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ConnectorError::NotConfigured("TAVILY_API_KEY is not set".to_string()))?;

        let url = format!("{}/search", self.base_url);
        let body = TavilyRequest {
            api_key,
            query,
            max_results: count,
            search_depth: "basic",
        };
        let response: TavilyResponse = send_json("tavily_search", self.retry_attempts, || {
            self.http_client.post(&url).json(&body)
        })
        .await?;

        Ok(response
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect())
    }
}

#[async_trait]
impl WebSearchConnector for TavilySearchClient {
    async fn search(&self, query: &str, count: u32) -> Option<Vec<SearchHit>> {
        match self.query(query, count).await {
            Ok(hits) => {
                tracing::debug!(hits = hits.len(), "Tavily search completed");
                Some(hits)
            }
            Err(err) => {
                tracing::error!("Tavily search failed: {}", err);
                None
            }
        }
    }
}
