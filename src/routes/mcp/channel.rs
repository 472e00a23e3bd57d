use crate::mcp::Gateway;
use actix_web::http::header;
use actix_web::{get, web, HttpResponse};

/// Open the push channel. The response body stays open until the client
/// disconnects; the session is closed when actix drops the body stream.
#[tracing::instrument(name = "Open push channel.", skip(gateway))]
#[get("/sse")]
pub async fn channel_handler(gateway: web::Data<Gateway>) -> HttpResponse {
    let stream = gateway.open_channel();
    tracing::info!(client_id = %stream.token(), "Push channel opened");

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(stream)
}
