use crate::mcp::{Gateway, InvocationRejected, InvocationRequest};
use actix_web::{post, web, HttpResponse};

/// Accept a tool invocation. The tool result arrives later on the push
/// channel named by `client_id`.
#[tracing::instrument(
    name = "Invoke tool.",
    skip(gateway, request),
    fields(id = %request.id, tool = %request.tool_name)
)]
#[post("/invoke")]
pub async fn invoke_handler(
    gateway: web::Data<Gateway>,
    request: web::Json<InvocationRequest>,
) -> Result<HttpResponse, InvocationRejected> {
    let accepted = gateway.invoke(request.into_inner())?;
    Ok(HttpResponse::Accepted().json(accepted))
}
