pub mod weather;
pub mod web_search;

pub use weather::{GetAlertsTool, GetForecastTool};
pub use web_search::{ResultLimits, WebSearchTool};

use std::sync::Arc;

use crate::connectors::Collaborators;
use crate::mcp::errors::RegistryError;
use crate::mcp::registry::ToolRegistry;

/// Register the built-in tools. Order here is the order advertised in the
/// handshake.
pub fn build_registry(collaborators: &Collaborators) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    registry.register(
        GetAlertsTool::NAME,
        GetAlertsTool::DESCRIPTION,
        GetAlertsTool::schema(),
        Arc::new(GetAlertsTool::new(collaborators.weather.clone())),
    )?;
    registry.register(
        GetForecastTool::NAME,
        GetForecastTool::DESCRIPTION,
        GetForecastTool::schema(),
        Arc::new(GetForecastTool::new(collaborators.weather.clone())),
    )?;
    registry.register(
        WebSearchTool::BRAVE,
        WebSearchTool::BRAVE_DESCRIPTION,
        WebSearchTool::schema(WebSearchTool::BRAVE_LIMITS),
        Arc::new(WebSearchTool::new(collaborators.brave_search.clone())),
    )?;
    registry.register(
        WebSearchTool::TAVILY,
        WebSearchTool::TAVILY_DESCRIPTION,
        WebSearchTool::schema(WebSearchTool::TAVILY_LIMITS),
        Arc::new(WebSearchTool::new(collaborators.tavily_search.clone())),
    )?;

    tracing::info!(tools = registry.count(), "Tool registry initialized");
    Ok(registry)
}
