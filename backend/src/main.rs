use std::sync::Arc;

use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use log::{error, info};

use plantrx_backend::config::{ServerConfig, DEFAULT_LOG_FILTER};
use plantrx_backend::inference::TractLoader;
use plantrx_backend::routes;
use plantrx_backend::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    info!("starting plant-rx backend");
    info!("plant model:    {}", config.models.plant.display());
    info!("toxicity model: {}", config.models.toxicity.display());
    info!("other model:    {}", config.models.other.display());
    info!("plant details:  {}", config.details_csv.display());

    // Models load lazily on the first prediction.
    let state = web::Data::new(AppState::new(&config, Arc::new(TractLoader)));

    let bind_address = config.bind_address();
    info!("listening on http://{} with {} workers", bind_address, config.workers);
    info!("   GET  /                - landing page");
    info!("   POST /predict         - plant identification");
    info!("   POST /toxic-check     - toxicity check");
    info!("   GET  /plant-details   - plant locations");
    info!("   GET  /api/health      - health check");
    info!("   GET  /api/models      - model cache status");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(routes::cors())
            .app_data(state.clone())
            .configure(routes::configure)
            .default_service(web::route().to(routes::not_found))
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await
}
