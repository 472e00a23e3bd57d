use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

use super::protocol::{ErrorType, InvocationErrorReply};
use super::schema::ValidationErrors;

/// Why an invocation did not produce a tool result.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No session token in the request
    #[error("client_id is required")]
    MissingClientId,
    /// Token does not name a live session
    #[error("Unknown or expired client_id: {0}")]
    InvalidClientId(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] ValidationErrors),
    /// Handler could not run or signalled a fault
    #[error("Tool execution failed: {0}")]
    ToolExecution(String),
}

impl GatewayError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            Self::MissingClientId => ErrorType::MissingClientId,
            Self::InvalidClientId(_) => ErrorType::InvalidClientId,
            Self::UnknownTool(_) => ErrorType::UnknownTool,
            Self::InvalidParameters(_) => ErrorType::InvalidParameters,
            Self::ToolExecution(_) => ErrorType::ToolError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ToolExecution(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Individual violated constraints, for parameter failures only.
    pub fn violations(&self) -> Option<Vec<String>> {
        match self {
            Self::InvalidParameters(errors) => Some(errors.messages()),
            _ => None,
        }
    }

    /// Whether the client also receives this failure as a pushed event.
    /// Transport-level failures have no session to push to.
    pub fn is_pushed(&self) -> bool {
        !matches!(self, Self::MissingClientId | Self::InvalidClientId(_))
    }
}

/// Synchronous rejection of an invocation, rendered as the endpoint's reply.
#[derive(Debug, thiserror::Error)]
#[error("invocation {id} rejected: {error}")]
pub struct InvocationRejected {
    pub id: String,
    #[source]
    pub error: GatewayError,
}

impl InvocationRejected {
    pub fn new(id: &str, error: GatewayError) -> Self {
        Self {
            id: id.to_string(),
            error,
        }
    }

    pub fn reply(&self) -> InvocationErrorReply {
        InvocationErrorReply {
            id: self.id.clone(),
            status: "error".to_string(),
            error_type: self.error.error_type(),
            message: self.error.to_string(),
            errors: self.error.violations(),
        }
    }
}

impl ResponseError for InvocationRejected {
    fn status_code(&self) -> StatusCode {
        self.error.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.reply())
    }
}

/// Fault raised by a tool handler.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ToolError(pub String);

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool `{0}` is already registered")]
    DuplicateTool(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::schema::Violation;

    #[test]
    fn transport_errors_are_not_pushed() {
        assert!(!GatewayError::MissingClientId.is_pushed());
        assert!(!GatewayError::InvalidClientId("x".into()).is_pushed());
        assert!(GatewayError::UnknownTool("x".into()).is_pushed());
        assert!(GatewayError::ToolExecution("boom".into()).is_pushed());
    }

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(
            GatewayError::UnknownTool("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::ToolExecution("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn reply_lists_violations() {
        let errors = ValidationErrors(vec![
            Violation {
                field: "latitude".into(),
                message: "must be between -90 and 90 (got 999)".into(),
            },
            Violation {
                field: "longitude".into(),
                message: "is required".into(),
            },
        ]);
        let rejected = InvocationRejected::new("req-1", errors.into());
        let reply = rejected.reply();

        assert_eq!(reply.id, "req-1");
        assert_eq!(reply.status, "error");
        assert_eq!(reply.error_type, ErrorType::InvalidParameters);
        assert_eq!(reply.errors.as_ref().map(Vec::len), Some(2));
        assert!(reply.message.contains("latitude"));
        assert!(reply.message.contains("longitude"));
    }
}
