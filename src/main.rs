use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use genia_gateway::config::Settings;
use genia_gateway::logging;
use genia_gateway::routes::{self, AppState};
use genia_gateway::services::ForwardingService;
use std::sync::Arc;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    logging::init(&settings.logging);

    info!("Starting {} v{}...", settings.service.name, env!("CARGO_PKG_VERSION"));

    let forwarding = match ForwardingService::new(&settings.upstream) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Failed to create upstream HTTP client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
        }
    };

    info!(
        "Forwarding to {} service at {} (timeout: {}s)",
        settings.upstream.name,
        forwarding.base_url(),
        settings.upstream.timeout_secs
    );

    let app_state = AppState {
        forwarding,
        service_name: settings.service.name.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
