use super::{bad_request, resolution_error_response, AppState};
use crate::config::SuggestionMode;
use crate::core::{deep_link, distance_km};
use crate::models::{
    Coordinate, ErrorResponse, RerollQuery, SuggestionCategory, SuggestionSource, SuggestionView, SuggestionsResponse,
    VenueCandidate,
};
use actix_web::{web, HttpResponse, Responder};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/suggestions/{category}", web::post().to(suggest))
        .route("/fallback/{category}", web::get().to(reroll));
}

/// Render a candidate for display, filling placeholders for missing fields
pub fn render(candidate: &VenueCandidate, origin: Option<Coordinate>) -> SuggestionView {
    let distance = match (origin, candidate.coordinate) {
        (Some(from), Some(to)) => Some(distance_km(&from, &to)),
        _ => None,
    };

    SuggestionView {
        id: candidate.id.clone(),
        name: candidate.display_name().to_string(),
        address: candidate.display_address().to_string(),
        coordinate: candidate.coordinate,
        distance_km: distance,
        deep_link: deep_link(candidate),
    }
}

fn parse_category(raw: &str) -> Result<SuggestionCategory, HttpResponse> {
    raw.parse::<SuggestionCategory>()
        .map_err(|e| bad_request("Invalid category", e))
}

fn fallback_response(
    state: &AppState,
    category: SuggestionCategory,
    roll: u32,
    origin: Option<Coordinate>,
) -> HttpResponse {
    let picked = if roll == 0 {
        state.catalog.primary(category)
    } else {
        state.catalog.reroll(category, roll)
    };

    HttpResponse::Ok().json(SuggestionsResponse {
        category,
        source: SuggestionSource::Fallback,
        suggestions: picked.map(|c| render(c, origin)).into_iter().collect(),
    })
}

/// Suggestions endpoint
///
/// POST /api/v1/suggestions/{category}
///
/// Food in dynamic mode searches the places provider with the saved cuisine
/// preferences around the resolved location. Drinks, and everything in
/// prototype mode, come from the fallback catalog.
async fn suggest(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let category = match parse_category(&path) {
        Ok(category) => category,
        Err(response) => return response,
    };

    let origin = state.location.coordinate();

    if state.mode == SuggestionMode::Prototype || category == SuggestionCategory::Drinks {
        tracing::debug!("Serving fallback suggestion for {}", category.as_str());
        return fallback_response(&state, category, 0, origin);
    }

    let Some(origin) = origin else {
        return HttpResponse::Conflict().json(ErrorResponse {
            error: "Location not resolved".to_string(),
            message: "No location available.".to_string(),
            status_code: 409,
            retry: None,
        });
    };

    let preferences = state.store.get();
    tracing::info!(
        "Resolving {} suggestions at {} for {} cuisines",
        category.as_str(),
        origin,
        preferences.cuisines.len()
    );

    match state.suggestions.resolve(origin, &preferences.cuisines).await {
        Ok(candidates) => HttpResponse::Ok().json(SuggestionsResponse {
            category,
            source: SuggestionSource::Places,
            suggestions: candidates.iter().map(|c| render(c, Some(origin))).collect(),
        }),
        Err(e) => {
            tracing::warn!("Suggestion resolution failed: {}", e);
            resolution_error_response(&e)
        }
    }
}

/// Re-roll endpoint
///
/// GET /api/v1/fallback/{category}?roll=1
async fn reroll(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RerollQuery>,
) -> impl Responder {
    match parse_category(&path) {
        Ok(category) => fallback_response(&state, category, query.roll, state.location.coordinate()),
        Err(response) => response,
    }
}
