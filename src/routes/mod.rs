// Route exports
pub mod location;
pub mod preferences;
pub mod suggestions;

use crate::config::SuggestionMode;
use crate::core::{FallbackCatalog, LocationResolver, SuggestionResolver};
use crate::models::{ErrorResponse, HealthResponse, ResolutionError};
use crate::services::PreferenceStore;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PreferenceStore>,
    pub location: Arc<LocationResolver>,
    pub suggestions: SuggestionResolver,
    pub catalog: Arc<FallbackCatalog>,
    pub mode: SuggestionMode,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(preferences::configure)
            .configure(location::configure)
            .configure(suggestions::configure),
    );
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Render a resolution failure with its user-facing message and retry hint
pub fn resolution_error_response(error: &ResolutionError) -> HttpResponse {
    let (mut builder, code) = match error {
        ResolutionError::PermissionDenied => (HttpResponse::Forbidden(), 403),
        ResolutionError::Timeout => (HttpResponse::GatewayTimeout(), 504),
        ResolutionError::ProviderError(_) => (HttpResponse::BadGateway(), 502),
        ResolutionError::NoResultsFound => (HttpResponse::NotFound(), 404),
    };

    builder.json(ErrorResponse {
        error: error.to_string(),
        message: error.user_message().to_string(),
        status_code: code,
        retry: error.retry_action(),
    })
}

pub fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
        retry: None,
    })
}
