use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version announced in the handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Event category used for every frame on the push channel. Frames are told
/// apart by the `type` field of their payload.
pub const EVENT_CATEGORY: &str = "mcp";

/// Tool capability as advertised in the handshake
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value, // JSON Schema for parameters
}

/// Server information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerCapabilities {
    pub tools: Vec<Tool>,
}

/// Tool execution result content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        ToolContent::Text { text: text.into() }
    }
}

/// Result body of a delivered tool response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallToolResponse {
    pub content: Vec<ToolContent>,
}

impl CallToolResponse {
    pub fn new(content: ToolContent) -> Self {
        Self {
            content: vec![content],
        }
    }

    /// Text of the first content block, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.iter().find_map(|c| match c {
            ToolContent::Text { text } => Some(text.as_str()),
        })
    }
}

/// Machine-readable classification of a rejected or failed invocation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    MissingClientId,
    InvalidClientId,
    UnknownTool,
    InvalidParameters,
    ToolError,
    InvalidRequest,
}

/// JSON payload of a pushed event, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    McpHandshakeResponse {
        protocol_version: String,
        server_info: ServerInfo,
        capabilities: ServerCapabilities,
    },
    ClientIdAssigned {
        client_id: String,
    },
    ToolResponse {
        id: String,
        tool_name: String,
        result: CallToolResponse,
    },
    Error {
        id: String,
        tool_name: String,
        error_type: ErrorType,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        errors: Option<Vec<String>>,
    },
}

/// Body of the invocation endpoint.
///
/// Every field is defaulted so that a well-formed body with a missing
/// `client_id` is reported as such instead of failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default)]
    pub client_id: Option<String>,
}

impl InvocationRequest {
    /// The client token, treating a blank string the same as an absent one.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Synchronous reply for an accepted invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationAccepted {
    pub id: String,
    pub status: String,
}

impl InvocationAccepted {
    pub fn processing(id: String) -> Self {
        Self {
            id,
            status: "processing".to_string(),
        }
    }
}

/// Synchronous reply for a rejected invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationErrorReply {
    pub id: String,
    pub status: String,
    pub error_type: ErrorType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}
