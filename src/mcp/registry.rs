use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

use super::errors::{RegistryError, ToolError};
use super::protocol::{Tool, ToolContent};
use super::schema::{ParamSchema, ValidatedParams};

/// Trait for tool handlers
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with parameters that already passed the tool's schema.
    ///
    /// Collaborator outages are expected to come back as an empty-result
    /// message; an `Err` is reserved for faults the handler itself detects.
    async fn execute(&self, params: ValidatedParams) -> Result<ToolContent, ToolError>;
}

/// A registered tool. Immutable once registered.
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub schema: ParamSchema,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    /// Capability entry advertised in the handshake
    pub fn capability(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.schema.to_json_schema(),
        }
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Tool registry managing all available tools.
///
/// Populated once at startup, then shared read-only behind an `Arc`.
/// Iteration follows registration order, which is what the handshake
/// advertises.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<ToolDefinition>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A duplicate name is a programming error and is
    /// reported so startup can abort.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        schema: ParamSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.tools.contains_key(name) {
            tracing::error!(tool = %name, "Duplicate tool registration");
            return Err(RegistryError::DuplicateTool(name.to_string()));
        }

        self.tools.insert(
            name.to_string(),
            Arc::new(ToolDefinition {
                name: name.to_string(),
                description: description.to_string(),
                schema,
                handler,
            }),
        );
        tracing::debug!(tool = %name, "Registered tool");
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<ToolDefinition>> {
        self.tools.get(name).cloned()
    }

    /// All tools in registration order
    pub fn list_all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values().map(|t| t.as_ref())
    }

    /// Capability list for the handshake
    pub fn list_tools(&self) -> Vec<Tool> {
        self.list_all().map(ToolDefinition::capability).collect()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }
}
