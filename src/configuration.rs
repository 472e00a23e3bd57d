use crate::connectors::ConnectorConfig;
use serde_valid::Validate;

#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct Settings {
    #[validate(min_length = 1)]
    pub app_host: String,
    pub app_port: u16,
    /// Name announced in the handshake `server_info`
    #[validate(min_length = 1)]
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Interval between keep-alive comments on open channels
    #[validate(minimum = 1)]
    #[validate(maximum = 300)]
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    #[validate]
    #[serde(default)]
    pub connectors: ConnectorConfig,
}

fn default_server_name() -> String {
    "toolgate".to_string()
}

fn default_keep_alive_secs() -> u64 {
    15
}

impl Settings {
    /// Attach provider API keys from the environment. Keys never come from
    /// the configuration file.
    fn load_secrets(&mut self) {
        self.connectors.brave_search.api_key = secret_from_env("BRAVE_API_KEY");
        self.connectors.tavily_search.api_key = secret_from_env("TAVILY_API_KEY");
    }
}

fn secret_from_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .set_default("app_host", "127.0.0.1")?
        .set_default("app_port", 8000)?
        // .json, .toml, .yaml, .yml
        .add_source(config::File::with_name("configuration").required(false))
        // APP__APP_PORT=9000, APP__CONNECTORS__WEATHER__TIMEOUT_SECS=5
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;
    config.load_secrets();

    config
        .validate()
        .map_err(|err| config::ConfigError::Message(format!("invalid configuration: {}", err)))?;

    Ok(config)
}
