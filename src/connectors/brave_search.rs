//! Brave Search web API connector.

use super::config::SearchServiceConfig;
use super::errors::ConnectorError;
use super::http::{build_client, send_json};
use super::search::{SearchHit, WebSearchConnector};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
struct BraveResponse {
    #[serde(default)]
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize, Default)]
struct BraveWebResults {
    #[serde(default)]
    results: Vec<BraveResult>,
}

#[derive(Debug, Deserialize)]
struct BraveResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    description: String,
}

pub struct BraveSearchClient {
    base_url: String,
    api_key: Option<String>,
    retry_attempts: usize,
    http_client: reqwest::Client,
}

impl BraveSearchClient {
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
            .ok_or_else(|| ConnectorError::NotConfigured("BRAVE_API_KEY is not set".to_string()))?;

        let url = format!("{}/res/v1/web/search", self.base_url);
        let count = count.to_string();
        let response: BraveResponse = send_json("brave_search", self.retry_attempts, || {
            self.http_client
                .get(&url)
                .query(&[("q", query), ("count", count.as_str())])
                .header("Accept", "application/json")
                .header("X-Subscription-Token", api_key)
        })
        .await?;

        Ok(response
            .web
            .unwrap_or_default()
            .results
            .into_iter()
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.description,
            })
            .collect())
    }
}

#[async_trait]
impl WebSearchConnector for BraveSearchClient {
    async fn search(&self, query: &str, count: u32) -> Option<Vec<SearchHit>> {
        match self.query(query, count).await {
            Ok(hits) => {
                tracing::debug!(hits = hits.len(), "Brave search completed");
                Some(hits)
            }
            Err(err) => {
                tracing::error!("Brave search failed: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String, api_key: Option<&str>) -> SearchServiceConfig {
        SearchServiceConfig {
            base_url,
            timeout_secs: 5,
            retry_attempts: 1,
            api_key: api_key.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn results_are_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .and(query_param("q", "rust async"))
            .and(query_param("count", "3"))
            .and(header("X-Subscription-Token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "web": {"results": [
                    {"title": "Async Book", "url": "https://rust-lang.github.io/async-book/", "description": "Asynchronous Programming in Rust"}
                ]}
            })))
            .mount(&server)
            .await;

        let client = BraveSearchClient::new(&config(server.uri(), Some("secret"))).unwrap();
        let hits = client.search("rust async", 3).await.unwrap();
        assert_eq!(
            hits,
            vec![SearchHit {
                title: "Async Book".to_string(),
                url: "https://rust-lang.github.io/async-book/".to_string(),
                snippet: "Asynchronous Programming in Rust".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn response_without_web_section_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/res/v1/web/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "search"})))
            .mount(&server)
            .await;

        let client = BraveSearchClient::new(&config(server.uri(), Some("secret"))).unwrap();
        assert_eq!(client.search("nothing", 5).await, Some(vec![]));
    }

    #[tokio::test]
    async fn missing_api_key_is_absent_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = BraveSearchClient::new(&config(server.uri(), None)).unwrap();
        assert!(client.search("rust", 5).await.is_none());
    }
}
