use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Configuration for external service connectors
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConnectorConfig {
    #[validate]
    pub weather: WeatherServiceConfig,
    #[validate]
    pub brave_search: SearchServiceConfig,
    #[validate]
    pub tavily_search: SearchServiceConfig,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            weather: WeatherServiceConfig::default(),
            brave_search: SearchServiceConfig::brave(),
            tavily_search: SearchServiceConfig::tavily(),
        }
    }
}

/// National Weather Service API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WeatherServiceConfig {
    /// Base URL for the NWS API (e.g., https://api.weather.gov)
    #[validate(min_length = 1)]
    pub base_url: String,
    /// NWS rejects requests without a User-Agent
    #[validate(min_length = 1)]
    pub user_agent: String,
    /// HTTP request timeout in seconds
    #[validate(minimum = 1)]
    #[validate(maximum = 120)]
    pub timeout_secs: u64,
}

impl Default for WeatherServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weather.gov".to_string(),
            user_agent: format!("toolgate/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
        }
    }
}

/// Web search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchServiceConfig {
    #[validate(min_length = 1)]
    pub base_url: String,
    /// HTTP request timeout in seconds
    #[validate(minimum = 1)]
    #[validate(maximum = 120)]
    pub timeout_secs: u64,
    /// Number of attempts for transient (5xx, connection) failures
    #[validate(minimum = 1)]
    #[validate(maximum = 5)]
    pub retry_attempts: usize,
    /// API key (from env: BRAVE_API_KEY / TAVILY_API_KEY)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl SearchServiceConfig {
    pub fn brave() -> Self {
        Self {
            base_url: "https://api.search.brave.com".to_string(),
            timeout_secs: 10,
            retry_attempts: 2,
            api_key: None,
        }
    }

    pub fn tavily() -> Self {
        Self {
            base_url: "https://api.tavily.com".to_string(),
            timeout_secs: 15,
            retry_attempts: 2,
            api_key: None,
        }
    }
}
