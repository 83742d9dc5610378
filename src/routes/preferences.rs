use super::{bad_request, AppState};
use crate::models::{ErrorResponse, PreferenceSet, SavePreferencesRequest};
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{web, HttpResponse, Responder};
use std::convert::Infallible;
use tokio_stream::StreamExt;
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/preferences", web::get().to(get_preferences))
        .route("/preferences", web::put().to(save_preferences))
        .route("/preferences/stream", web::get().to(stream_preferences));
}

/// GET /api/v1/preferences
async fn get_preferences(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.store.get())
}

/// Save preferences endpoint
///
/// PUT /api/v1/preferences
///
/// Request body (display names; unknown names are stored as entered):
/// ```json
/// {
///   "cuisines": ["Italian"],
///   "atmospheres": ["Casual"],
///   "favoriteDishes": ["Pizza"]
/// }
/// ```
async fn save_preferences(
    state: web::Data<AppState>,
    req: web::Json<SavePreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for save_preferences request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();
    match state
        .store
        .save_display(req.cuisines, req.atmospheres, req.favorite_dishes)
        .await
    {
        Ok(saved) => {
            tracing::info!("Preferences saved ({} cuisines)", saved.cuisines.len());
            HttpResponse::Ok().json(saved)
        }
        Err(e) => {
            tracing::error!("Failed to save preferences: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to save preferences".to_string(),
                message: e.to_string(),
                status_code: 500,
                retry: None,
            })
        }
    }
}

/// One `data:` event carrying a snapshot
fn event_frame(snapshot: &PreferenceSet) -> web::Bytes {
    let json = serde_json::to_string(snapshot).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize preference snapshot: {}", e);
        "{}".to_string()
    });
    web::Bytes::from(format!("data: {}\n\n", json))
}

/// Server-sent events feed of preference snapshots
///
/// GET /api/v1/preferences/stream
async fn stream_preferences(state: web::Data<AppState>) -> impl Responder {
    let events = state
        .store
        .subscribe()
        .map(|snapshot: PreferenceSet| Ok::<_, Infallible>(event_frame(&snapshot)));

    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(events)
}
