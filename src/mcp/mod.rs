pub mod errors;
pub mod framer;
pub mod gateway;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod session;
pub mod tools;

pub use errors::{GatewayError, InvocationRejected, RegistryError, ToolError};
pub use gateway::Gateway;
pub use protocol::*;
pub use registry::{ToolDefinition, ToolHandler, ToolRegistry};
pub use schema::{ParamField, ParamKind, ParamSchema, ValidatedParams, ValidationErrors};
pub use session::{ChannelStream, Session, SessionRegistry};
