use crate::configuration::Settings;
use crate::connectors::{self, Collaborators};
use crate::mcp::{self, Gateway, ServerInfo};
use crate::routes;
use actix_cors::Cors;
use actix_web::{dev::Server, error, web, App, HttpResponse, HttpServer};
use std::net::TcpListener;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to initialize connectors: {0}")]
    Connectors(#[from] connectors::ConnectorError),
    #[error("failed to register tools: {0}")]
    Registry(#[from] mcp::RegistryError),
}

/// Assemble a gateway over the given collaborators.
pub fn build_gateway(
    settings: &Settings,
    collaborators: &Collaborators,
) -> Result<Gateway, StartupError> {
    let tools = mcp::tools::build_registry(collaborators)?;
    let server_info = ServerInfo {
        name: settings.server_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Ok(Gateway::new(tools, server_info)
        .with_keep_alive(Duration::from_secs(settings.keep_alive_secs)))
}

/// Assemble a gateway over the HTTP collaborators described by `settings`.
pub fn build_gateway_from_settings(settings: &Settings) -> Result<Gateway, StartupError> {
    let collaborators = connectors::init(&settings.connectors)?;
    build_gateway(settings, &collaborators)
}

pub fn run(listener: TcpListener, gateway: Gateway) -> Result<Server, std::io::Error> {
    let gateway = web::Data::new(gateway);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let reply = serde_json::json!({
            "id": "",
            "status": "error",
            "error_type": mcp::ErrorType::InvalidRequest,
            "message": format!("Invalid request body: {}", err),
        });
        tracing::warn!("Malformed invocation body: {}", err);
        error::InternalError::from_response(err, HttpResponse::BadRequest().json(reply)).into()
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(
                web::scope("/mcp")
                    .service(routes::mcp::channel_handler)
                    .service(routes::mcp::invoke_handler),
            )
            .app_data(json_config.clone())
            .app_data(gateway.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
