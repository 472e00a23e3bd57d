//! The protocol gateway.
//!
//! Two transport legs meet here: the long-lived push channel opened by
//! [`Gateway::open_channel`] and short-lived invocation requests handled by
//! [`Gateway::invoke`]. They are correlated only through the session token
//! the client echoes back as `client_id`.

use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use super::errors::{GatewayError, InvocationRejected};
use super::framer::{frame, Event};
use super::protocol::{
    CallToolResponse, EventPayload, InvocationAccepted, InvocationRequest, ServerCapabilities,
    ServerInfo, EVENT_CATEGORY, PROTOCOL_VERSION,
};
use super::registry::{ToolDefinition, ToolRegistry};
use super::schema::ValidatedParams;
use super::session::{ChannelStream, Session, SessionRegistry};

pub struct Gateway {
    tools: Arc<ToolRegistry>,
    sessions: Arc<SessionRegistry>,
    server_info: ServerInfo,
    keep_alive: Option<Duration>,
}

impl Gateway {
    /// The registry is frozen from here on; the gateway only reads it.
    pub fn new(tools: ToolRegistry, server_info: ServerInfo) -> Self {
        Self {
            tools: Arc::new(tools),
            sessions: Arc::new(SessionRegistry::new()),
            server_info,
            keep_alive: None,
        }
    }

    /// Emit a keep-alive comment on idle channels every `period`.
    pub fn with_keep_alive(mut self, period: Duration) -> Self {
        self.keep_alive = Some(period);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// First event on every channel: server identity plus all capabilities.
    pub fn handshake(&self) -> EventPayload {
        EventPayload::McpHandshakeResponse {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: self.server_info.clone(),
            capabilities: ServerCapabilities {
                tools: self.tools.list_tools(),
            },
        }
    }

    /// Open a push channel: allocate a session and queue the handshake and
    /// identity assignment, in that order, ahead of anything else.
    ///
    /// The returned stream is the channel body. Dropping it closes the
    /// session.
    pub fn open_channel(&self) -> ChannelStream {
        let (session, frames) = self.sessions.open();
        let stream = ChannelStream::new(
            session.token().to_string(),
            frames,
            self.keep_alive,
            self.sessions.clone(),
        );

        push(&self.sessions, &session, &self.handshake());
        push(
            &self.sessions,
            &session,
            &EventPayload::ClientIdAssigned {
                client_id: session.token().to_string(),
            },
        );

        stream
    }

    /// Decide an invocation synchronously, and on acceptance run the tool in
    /// the background.
    ///
    /// Checks run in a fixed order and stop at the first failure. Once this
    /// returns `Ok`, exactly one terminal event (result or error) will be
    /// pushed for the request id, unless the session closes first.
    pub fn invoke(
        &self,
        request: InvocationRequest,
    ) -> Result<InvocationAccepted, InvocationRejected> {
        let token = match request.client_id() {
            Some(token) => token.to_string(),
            None => return Err(self.reject(&request, None, GatewayError::MissingClientId)),
        };

        let session = match self.sessions.get(&token) {
            Some(session) => session,
            None => {
                return Err(self.reject(&request, None, GatewayError::InvalidClientId(token)))
            }
        };

        let tool = match self.tools.get(&request.tool_name) {
            Some(tool) => tool,
            None => {
                let error = GatewayError::UnknownTool(request.tool_name.clone());
                return Err(self.reject(&request, Some(session.as_ref()), error));
            }
        };

        let params = match tool.schema.validate(&request.parameters) {
            Ok(params) => params,
            Err(errors) => {
                return Err(self.reject(&request, Some(session.as_ref()), errors.into()))
            }
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                let error = GatewayError::ToolExecution(format!("cannot schedule tool: {}", err));
                return Err(self.reject(&request, Some(session.as_ref()), error));
            }
        };

        let span = tracing::info_span!(
            "tool_invocation",
            id = %request.id,
            tool = %tool.name,
            client_id = %token
        );
        span.in_scope(|| tracing::info!("Invocation accepted"));

        runtime.spawn(
            run_tool(self.sessions.clone(), token, request.id.clone(), tool, params)
                .instrument(span),
        );

        Ok(InvocationAccepted::processing(request.id))
    }

    fn reject(
        &self,
        request: &InvocationRequest,
        session: Option<&Session>,
        error: GatewayError,
    ) -> InvocationRejected {
        tracing::warn!(
            id = %request.id,
            tool = %request.tool_name,
            error_type = ?error.error_type(),
            "Invocation rejected: {}",
            error
        );

        if let Some(session) = session.filter(|_| error.is_pushed()) {
            push(
                &self.sessions,
                session,
                &error_event(&request.id, &request.tool_name, &error),
            );
        }

        InvocationRejected::new(&request.id, error)
    }
}

async fn run_tool(
    sessions: Arc<SessionRegistry>,
    token: String,
    request_id: String,
    tool: Arc<ToolDefinition>,
    params: ValidatedParams,
) {
    let outcome = AssertUnwindSafe(tool.handler.execute(params))
        .catch_unwind()
        .await;

    let payload = match outcome {
        Ok(Ok(content)) => {
            tracing::info!("Tool executed successfully");
            EventPayload::ToolResponse {
                id: request_id,
                tool_name: tool.name.clone(),
                result: CallToolResponse::new(content),
            }
        }
        Ok(Err(err)) => {
            tracing::error!("Tool execution failed: {}", err);
            error_event(
                &request_id,
                &tool.name,
                &GatewayError::ToolExecution(err.to_string()),
            )
        }
        Err(_) => {
            tracing::error!("Tool handler panicked");
            error_event(
                &request_id,
                &tool.name,
                &GatewayError::ToolExecution("tool handler panicked".to_string()),
            )
        }
    };

    // A session closed while the tool ran is terminal; the result is dropped.
    match sessions.get(&token) {
        Some(session) => {
            push(&sessions, &session, &payload);
        }
        None => tracing::warn!("Session closed before delivery, discarding tool result"),
    }
}

fn error_event(request_id: &str, tool_name: &str, error: &GatewayError) -> EventPayload {
    EventPayload::Error {
        id: request_id.to_string(),
        tool_name: tool_name.to_string(),
        error_type: error.error_type(),
        message: error.to_string(),
        errors: error.violations(),
    }
}

/// Frame and queue one event. A payload that fails to serialize is dropped
/// without touching the session; a dead channel closes the session.
fn push(sessions: &SessionRegistry, session: &Session, payload: &EventPayload) -> bool {
    let event = Event::new(session.next_message_id(), EVENT_CATEGORY, payload);

    let bytes = match frame(&event) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(client_id = %session.token(), "Dropping push: {}", err);
            return false;
        }
    };

    match session.send(bytes) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("Push failed: {}", err);
            sessions.close(session.token());
            false
        }
    }
}
