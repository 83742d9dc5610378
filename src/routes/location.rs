use super::{bad_request, resolution_error_response, AppState};
use crate::core::ManualLocation;
use crate::models::{Coordinate, LocationResponse, LocationState, ManualLocationRequest, ResolutionError};
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/location", web::get().to(get_location))
        .route("/location/manual", web::post().to(manual_location))
        .route("/location/device", web::post().to(device_location))
        .route("/location/retry", web::post().to(retry_location));
}

fn render_state(state: LocationState) -> LocationResponse {
    let message = match &state {
        LocationState::Failed { error } => Some(error.user_message().to_string()),
        LocationState::Idle => Some("No location available.".to_string()),
        _ => None,
    };
    LocationResponse { state, message }
}

fn respond(outcome: Result<Coordinate, ResolutionError>, state: LocationState) -> HttpResponse {
    match outcome {
        Ok(_) => HttpResponse::Ok().json(render_state(state)),
        Err(e) => resolution_error_response(&e),
    }
}

/// GET /api/v1/location
async fn get_location(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(render_state(state.location.state()))
}

/// Manual location endpoint
///
/// POST /api/v1/location/manual
///
/// Request body, any of (a body that does not parse is rejected with 400):
/// ```json
/// { "latitude": 47.61, "longitude": -122.33 }
/// { "address": "1519 14th Ave, Seattle" }
/// {}
/// ```
async fn manual_location(
    state: web::Data<AppState>,
    req: web::Json<ManualLocationRequest>,
) -> impl Responder {
    let req = req.into_inner();

    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let entry = match (req.latitude, req.longitude, req.address) {
        (Some(lat), Some(lon), _) => ManualLocation::Coordinate(Coordinate::new(lat, lon)),
        (Some(_), None, _) | (None, Some(_), _) => {
            return bad_request(
                "Validation failed",
                "latitude and longitude must be given together".to_string(),
            );
        }
        (None, None, Some(address)) => ManualLocation::Address(address),
        (None, None, None) => ManualLocation::Unspecified,
    };

    let outcome = state.location.resolve_manual(entry).await;
    respond(outcome, state.location.state())
}

/// POST /api/v1/location/device
async fn device_location(state: web::Data<AppState>) -> impl Responder {
    let outcome = state.location.resolve_device().await;
    respond(outcome, state.location.state())
}

/// POST /api/v1/location/retry
async fn retry_location(state: web::Data<AppState>) -> impl Responder {
    let outcome = state.location.retry().await;
    respond(outcome, state.location.state())
}
