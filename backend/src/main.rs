use actix_web::{error::InternalError, web, App, HttpResponse, HttpServer};
use backend::datasource::{Gateway, SurrealConnector};
use backend::error::ApiError;
use backend::metrics::Metrics;
use backend::query::QueryHistory;
use backend::settings::SettingsStore;
use log::{error, info, warn};
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match backend::config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    if let Err(e) = Metrics::init_global() {
        warn!("Metrics disabled: {}", e);
    }

    let connector = match SurrealConnector::new(Duration::from_secs(config.data_source.timeout_seconds)) {
        Ok(connector) => connector,
        Err(e) => {
            error!("Failed to build the database client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    // The database is contacted per request, so an offline server does not block startup
    let gateway = web::Data::new(Gateway::new(
        connector,
        SettingsStore::new(config.data_source.settings.clone()),
        config.data_source.collections.clone(),
    ));
    let history = web::Data::new(QueryHistory::new());
    let cors_origins = config.server.cors_origins.clone();

    info!("Starting server on {}:{}", config.server.host, config.server.port);

    HttpServer::new(move || {
        App::new()
            .wrap(backend::middleware::Logger)
            .wrap(backend::middleware::cors_middleware(&cors_origins))
            .app_data(
                web::JsonConfig::default()
                    .limit(256 * 1024)
                    .error_handler(|err, _req| {
                        let body = ApiError::bad_request(&format!("Invalid JSON body: {}", err));
                        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
                    }),
            )
            .app_data(gateway.clone())
            .app_data(history.clone())
            .service(backend::health::health_check)
            .service(backend::health::detailed_health_check)
            .service(backend::metrics::metrics_handler)
            .service(backend::openapi::openapi_json)
            .configure(backend::statistics::controller::configure)
            .configure(backend::players::controller::configure)
            .configure(backend::users::controller::configure)
            .configure(backend::tables::controller::configure)
            .configure(backend::query::controller::configure)
            .configure(backend::settings::controller::configure)
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
