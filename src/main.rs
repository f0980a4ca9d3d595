use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use grubsync_engine::config::Settings;
use grubsync_engine::core::Recommender;
use grubsync_engine::routes::{self, AppState};
use grubsync_engine::services::{CachedGeocoder, GoogleGeocoder, PgPreferenceStore, YelpClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle path extraction errors
pub fn handle_path_error(err: error::PathError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path: {}", err),
        status_code: 400,
    }
    .into()
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| io_error("Configuration error", e))?;

    // LOG_LEVEL / LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }

    info!("Starting GrubSync recommendation engine...");

    let db_max_conn = settings.database.max_connections.unwrap_or(10);
    let store = Arc::new(
        PgPreferenceStore::connect(
            &settings.database.url,
            db_max_conn,
            settings.database.min_connections.unwrap_or(1),
            settings.database.acquire_timeout_secs.unwrap_or(5),
            settings.database.idle_timeout_secs.unwrap_or(600),
        )
        .await
        .map_err(|e| io_error("PostgreSQL connection error", e))?,
    );

    info!("PostgreSQL preference store initialized (max: {} connections)", db_max_conn);

    let google = GoogleGeocoder::new(
        settings.google.endpoint.clone(),
        settings.google.api_key.clone(),
        Duration::from_secs(settings.google.timeout_secs.unwrap_or(10)),
    )
    .map_err(|e| io_error("Geocoder client error", e))?;

    let geocoder = Arc::new(CachedGeocoder::new(
        Arc::new(google),
        settings.cache.geocode_capacity,
        settings.cache.geocode_ttl_secs,
    ));

    info!(
        "Geocode cache initialized ({} entries, TTL: {}s)",
        settings.cache.geocode_capacity, settings.cache.geocode_ttl_secs
    );

    let yelp = Arc::new(
        YelpClient::new(
            settings.yelp.endpoint.clone(),
            settings.yelp.api_key.clone(),
            Duration::from_secs(settings.yelp.timeout_secs.unwrap_or(10)),
        )
        .map_err(|e| io_error("Business search client error", e))?,
    );

    let recommender = Arc::new(Recommender::new(
        store.clone(),
        geocoder,
        yelp,
        settings.search.clone(),
        settings.scoring.clone(),
    ));

    info!("Recommender initialized with search settings: {:?}", settings.search);

    let app_state = AppState { recommender, store };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
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
