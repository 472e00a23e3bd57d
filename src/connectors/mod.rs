//! External Service Connectors
//!
//! Adapters for the services the tools query: the National Weather Service
//! and two web search providers. Tools only see the traits, never the HTTP
//! clients, so tests can swap in fakes.
//!
//! ## Architecture Pattern
//!
//! 1. Define trait in `{service}.rs` → allows faking in tests
//! 2. Implement HTTP client in same file
//! 3. Configuration in `config.rs`
//! 4. Every failure is logged inside the connector and surfaces as `None`
//!
//! ## Testing
//!
//! ```ignore
//! struct NoAlerts;
//!
//! #[async_trait]
//! impl WeatherConnector for NoAlerts {
//!     async fn active_alerts(&self, _state: &str) -> Option<AlertsResponse> {
//!         Some(AlertsResponse::default())
//!     }
//!     // ...
//! }
//! ```

pub mod brave_search;
pub mod config;
pub mod errors;
mod http;
pub mod search;
pub mod tavily_search;
pub mod weather_service;

pub use brave_search::BraveSearchClient;
pub use config::{ConnectorConfig, SearchServiceConfig, WeatherServiceConfig};
pub use errors::ConnectorError;
pub use search::{SearchHit, WebSearchConnector};
pub use tavily_search::TavilySearchClient;
pub use weather_service::{WeatherConnector, WeatherServiceClient};

use std::sync::Arc;

/// The collaborators handed to the tool handlers.
#[derive(Clone)]
pub struct Collaborators {
    pub weather: Arc<dyn WeatherConnector>,
    pub brave_search: Arc<dyn WebSearchConnector>,
    pub tavily_search: Arc<dyn WebSearchConnector>,
}

/// Build the HTTP collaborators from configuration.
pub fn init(config: &ConnectorConfig) -> Result<Collaborators, ConnectorError> {
    if config.brave_search.api_key.is_none() {
        tracing::warn!("BRAVE_API_KEY not set; brave-web-search will return no results");
    }
    if config.tavily_search.api_key.is_none() {
        tracing::warn!("TAVILY_API_KEY not set; tavily-web-search will return no results");
    }

    Ok(Collaborators {
        weather: Arc::new(WeatherServiceClient::new(&config.weather)?),
        brave_search: Arc::new(BraveSearchClient::new(&config.brave_search)?),
        tavily_search: Arc::new(TavilySearchClient::new(&config.tavily_search)?),
    })
}
