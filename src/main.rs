use std::net::TcpListener;
use toolgate::configuration::get_configuration;
use toolgate::startup::{build_gateway_from_settings, run};
use toolgate::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("toolgate".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration().expect("Failed to read configuration.");

    let gateway = match build_gateway_from_settings(&settings) {
        Ok(gateway) => gateway,
        Err(err) => {
            tracing::error!("Startup aborted: {}", err);
            std::process::exit(1);
        }
    };

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!(
        tools = gateway.tools().count(),
        "Start server at {:?}",
        &address
    );
    let listener =
        TcpListener::bind(&address).expect(&format!("failed to bind to {}", settings.app_port));

    run(listener, gateway)?.await
}
