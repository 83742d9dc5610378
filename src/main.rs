use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use nyoom::config::{SelectionPolicy, Settings};
use nyoom::core::{
    CandidateSelector, FallbackCatalog, LocationProvider, LocationResolver, PlaceSearch, RandomSelector,
    SuggestionOptions, SuggestionResolver, ToggleSelector,
};
use nyoom::models::Coordinate;
use nyoom::routes::{self, AppState};
use nyoom::services::{
    CachedPlaceSearch, HttpGeocoder, HttpLocationProvider, NoLocationProvider, PlacesClient, PreferenceStore,
    StaticPermission,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
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
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting Nyoom suggestion service...");

    // Preference store
    let store = Arc::new(
        PreferenceStore::open(&settings.storage.data_dir, &settings.storage.namespace)
            .await
            .map_err(|e| startup_error("Failed to open preference store", e))?,
    );

    // Location resolver
    let location_timeout = Duration::from_secs(settings.location.timeout_secs);

    let provider: Arc<dyn LocationProvider> = match &settings.location.provider_endpoint {
        Some(endpoint) => Arc::new(
            HttpLocationProvider::new(endpoint.clone(), location_timeout)
                .map_err(|e| startup_error("Failed to create location client", e))?,
        ),
        None => {
            warn!("No location provider configured; device location will be unavailable");
            Arc::new(NoLocationProvider)
        }
    };

    let mut location = LocationResolver::new(
        Arc::new(StaticPermission::new(settings.location.device_permission)),
        provider,
        Coordinate::new(settings.location.default_latitude, settings.location.default_longitude),
        location_timeout,
    );

    if let Some(endpoint) = &settings.location.geocoder_endpoint {
        let geocoder = HttpGeocoder::new(endpoint.clone(), location_timeout)
            .map_err(|e| startup_error("Failed to create geocoder client", e))?;
        location = location.with_geocoder(Arc::new(geocoder));
        info!("Geocoder enabled: {}", endpoint);
    }

    // Place search
    let search_timeout = Duration::from_secs(settings.places.timeout_secs);

    if settings.places.api_key.is_empty() {
        warn!("No places API key configured; food searches will fail with PermissionDenied");
    }

    let places = PlacesClient::new(settings.places.endpoint.clone(), settings.places.api_key.clone(), search_timeout)
        .map_err(|e| startup_error("Failed to create places client", e))?
        .with_language(settings.places.language_code.clone());

    let search: Arc<dyn PlaceSearch> = if settings.cache.enabled {
        info!(
            "Place cache enabled ({} entries, TTL: {}s)",
            settings.cache.capacity, settings.cache.ttl_secs
        );
        Arc::new(CachedPlaceSearch::new(Arc::new(places), settings.cache.capacity, settings.cache.ttl_secs))
    } else {
        Arc::new(places)
    };

    let options = SuggestionOptions {
        radius_meters: settings.places.radius_meters,
        max_results: settings.places.max_results,
        timeout: search_timeout,
    };

    info!("Suggestion resolver initialized with {:?}", options);

    // Fallback catalog
    let selector: Arc<dyn CandidateSelector> = match settings.suggestions.selection {
        SelectionPolicy::Toggle => Arc::new(ToggleSelector),
        SelectionPolicy::Random => Arc::new(RandomSelector),
    };

    let app_state = AppState {
        store,
        location: Arc::new(location),
        suggestions: SuggestionResolver::new(search, options),
        catalog: Arc::new(FallbackCatalog::new(selector)),
        mode: settings.suggestions.mode,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(2);

    info!("Starting HTTP server on {}:{} (mode: {:?})", host, port, app_state.mode);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
