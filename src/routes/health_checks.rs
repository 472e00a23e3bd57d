use crate::mcp::Gateway;
use actix_web::{get, web, HttpResponse};
use serde::Serialize;

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    sessions: usize,
    tools: usize,
}

#[tracing::instrument(name = "Health check.", skip(gateway))]
#[get("")]
pub async fn health_check(gateway: web::Data<Gateway>) -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus {
        status: "ok",
        sessions: gateway.sessions().len(),
        tools: gateway.tools().count(),
    })
}
