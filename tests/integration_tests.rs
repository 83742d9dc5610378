// Integration tests for Nyoom

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use nyoom::config::SuggestionMode;
use nyoom::core::{
    FallbackCatalog, LocationProvider, LocationResolver, ManualLocation, PermissionGate, SuggestionOptions,
    SuggestionResolver,
};
use nyoom::models::{Coordinate, LocationState, PreferenceSet, ResolutionError};
use nyoom::routes::{configure_routes, AppState};
use nyoom::services::{HttpGeocoder, HttpLocationProvider, PlacesClient, PreferenceStore, StaticPermission};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

const SEARCH_PATH: &str = "/v1/places:searchNearby";

fn nue_body() -> String {
    json!({
        "places": [{
            "id": "ChIJz91V-s1qkFQRTaAOUkM_jKo",
            "displayName": { "text": "Nue", "languageCode": "en" },
            "formattedAddress": "1519 14th Ave, Seattle, WA 98122",
            "location": { "latitude": 47.6147255, "longitude": -122.3144481 },
            "types": ["restaurant", "food"]
        }]
    })
    .to_string()
}

fn cuisines(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn places_resolver(url: String, key: &str) -> SuggestionResolver {
    let client = PlacesClient::new(url, key.to_string(), Duration::from_secs(5)).unwrap();
    SuggestionResolver::new(Arc::new(client), SuggestionOptions::default())
}

struct Unreachable;

#[async_trait]
impl LocationProvider for Unreachable {
    async fn last_known(&self) -> Result<Option<Coordinate>, ResolutionError> {
        Err(ResolutionError::ProviderError("no device".to_string()))
    }
}

struct Granted;

#[async_trait]
impl PermissionGate for Granted {
    async fn request(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn test_nue_scenario_against_places_api() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", SEARCH_PATH)
        .match_header("x-goog-api-key", "test-key")
        .match_header("x-goog-fieldmask", mockito::Matcher::Regex("places.displayName".to_string()))
        .match_body(mockito::Matcher::PartialJson(json!({
            "includedTypes": ["italian_restaurant"],
            "maxResultCount": 1,
            "locationRestriction": { "circle": {
                "center": { "latitude": 47.61, "longitude": -122.33 },
                "radius": 5000.0
            }}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(nue_body())
        .create_async()
        .await;

    let resolver = places_resolver(server.url(), "test-key");
    let result = resolver
        .resolve(Coordinate::new(47.61, -122.33), &cuisines(&["italian_restaurant"]))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].display_name(), "Nue");
    assert_eq!(result[0].display_address(), "1519 14th Ave, Seattle, WA 98122");
}

#[tokio::test]
async fn test_empty_cuisines_make_no_network_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", SEARCH_PATH).expect(0).create_async().await;

    let resolver = places_resolver(server.url(), "test-key");
    let result = resolver.resolve(Coordinate::new(47.61, -122.33), &BTreeSet::new()).await;

    assert_eq!(result, Err(ResolutionError::NoResultsFound));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_provider_answers_map_to_errors() {
    let mut server = mockito::Server::new_async().await;
    let _empty = server
        .mock("POST", SEARCH_PATH)
        .match_header("x-goog-api-key", "empty")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let _forbidden = server
        .mock("POST", SEARCH_PATH)
        .match_header("x-goog-api-key", "revoked")
        .with_status(403)
        .create_async()
        .await;
    let _broken = server
        .mock("POST", SEARCH_PATH)
        .match_header("x-goog-api-key", "broken")
        .with_status(500)
        .create_async()
        .await;

    let here = Coordinate::new(47.61, -122.33);
    let italian = cuisines(&["italian_restaurant"]);

    assert_eq!(
        places_resolver(server.url(), "empty").resolve(here, &italian).await,
        Err(ResolutionError::NoResultsFound)
    );
    assert_eq!(
        places_resolver(server.url(), "revoked").resolve(here, &italian).await,
        Err(ResolutionError::PermissionDenied)
    );
    assert!(matches!(
        places_resolver(server.url(), "broken").resolve(here, &italian).await,
        Err(ResolutionError::ProviderError(_))
    ));
}

#[tokio::test]
async fn test_missing_display_fields_are_kept() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", SEARCH_PATH)
        .with_status(200)
        .with_body(json!({ "places": [{ "id": "anon" }] }).to_string())
        .create_async()
        .await;

    let result = places_resolver(server.url(), "k")
        .resolve(Coordinate::new(47.61, -122.33), &cuisines(&["thai"]))
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].display_name(), "Unknown Restaurant");
    assert_eq!(result[0].display_address(), "Unknown Address");
}

#[tokio::test]
async fn test_http_location_provider_flow() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/json")
        .with_status(200)
        .with_body(r#"{"status":"success","lat":47.61,"lon":-122.33}"#)
        .create_async()
        .await;

    let provider = HttpLocationProvider::new(format!("{}/json", server.url()), Duration::from_secs(5)).unwrap();
    let resolver = LocationResolver::new(
        Arc::new(StaticPermission::new(true)),
        Arc::new(provider),
        Coordinate::new(0.0, 0.0),
        Duration::from_secs(5),
    );

    let coordinate = resolver.resolve_device().await.unwrap();
    assert_eq!(coordinate, Coordinate::new(47.61, -122.33));
    assert_eq!(resolver.state(), LocationState::Resolved { coordinate });
}

#[tokio::test]
async fn test_device_error_then_manual_entry() {
    let resolver = LocationResolver::new(
        Arc::new(Granted),
        Arc::new(Unreachable),
        Coordinate::new(0.0, 0.0),
        Duration::from_secs(5),
    );

    assert!(matches!(resolver.resolve_device().await, Err(ResolutionError::ProviderError(_))));
    assert!(matches!(resolver.state(), LocationState::Failed { .. }));

    let coordinate = resolver
        .resolve_manual(ManualLocation::Coordinate(Coordinate::new(47.61, -122.33)))
        .await
        .unwrap();
    assert_eq!(resolver.state(), LocationState::Resolved { coordinate });
}

#[tokio::test]
async fn test_geocoder_against_nominatim_shape() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/search")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("q".to_string(), "Capitol Hill, Seattle".to_string()),
            mockito::Matcher::UrlEncoded("format".to_string(), "json".to_string()),
        ]))
        .with_status(200)
        .with_body(r#"[{"lat":"47.6253","lon":"-122.3222","display_name":"Capitol Hill"}]"#)
        .create_async()
        .await;

    let geocoder = HttpGeocoder::new(server.url(), Duration::from_secs(5)).unwrap();
    let resolver = LocationResolver::new(
        Arc::new(StaticPermission::new(false)),
        Arc::new(Unreachable),
        Coordinate::new(0.0, 0.0),
        Duration::from_secs(5),
    )
    .with_geocoder(Arc::new(geocoder));

    let coordinate = resolver
        .resolve_manual(ManualLocation::Address("Capitol Hill, Seattle".to_string()))
        .await
        .unwrap();
    assert_eq!(coordinate, Coordinate::new(47.6253, -122.3222));
}

async fn app_state(places_url: String, dir: &tempfile::TempDir, mode: SuggestionMode) -> AppState {
    AppState {
        store: Arc::new(PreferenceStore::open(dir.path(), "user_preferences").await.unwrap()),
        location: Arc::new(LocationResolver::new(
            Arc::new(StaticPermission::new(false)),
            Arc::new(Unreachable),
            Coordinate::new(0.0, 0.0),
            Duration::from_secs(5),
        )),
        suggestions: places_resolver(places_url, "test-key"),
        catalog: Arc::new(FallbackCatalog::default()),
        mode,
    }
}

#[actix_web::test]
async fn test_http_flow_preferences_location_suggestions() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", SEARCH_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(nue_body())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = app_state(server.url(), &dir, SuggestionMode::Dynamic).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    // Suggestions before a location is known
    let req = test::TestRequest::post().uri("/api/v1/suggestions/food").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Save preferences by display name
    let req = test::TestRequest::put()
        .uri("/api/v1/preferences")
        .set_json(json!({ "cuisines": ["Italian"], "atmospheres": ["Casual"], "favoriteDishes": [] }))
        .to_request();
    let saved: PreferenceSet = test::call_and_read_body_json(&app, req).await;
    assert!(saved.cuisines.contains("italian_restaurant"));

    // Device location is not permitted
    let req = test::TestRequest::post().uri("/api/v1/location/device").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["retry"], "request_permission");

    // Manual entry instead
    let req = test::TestRequest::post()
        .uri("/api/v1/location/manual")
        .set_json(json!({ "latitude": 47.61, "longitude": -122.33 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "resolved");

    let req = test::TestRequest::post().uri("/api/v1/suggestions/food").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["source"], "places");
    assert_eq!(body["suggestions"][0]["name"], "Nue");
    assert_eq!(body["suggestions"][0]["address"], "1519 14th Ave, Seattle, WA 98122");
    assert!(body["suggestions"][0]["deepLink"].as_str().unwrap().starts_with("geo:"));
}

#[actix_web::test]
async fn test_http_drinks_and_reroll_use_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state("http://127.0.0.1:9".to_string(), &dir, SuggestionMode::Dynamic).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::post().uri("/api/v1/suggestions/drinks").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["suggestions"][0]["name"], "Montana");

    let req = test::TestRequest::get().uri("/api/v1/fallback/drinks?roll=1").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["suggestions"][0]["name"], "Zig Zag Café");

    let req = test::TestRequest::get().uri("/api/v1/fallback/drinks?roll=2").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["suggestions"][0]["name"], "Montana");

    let req = test::TestRequest::get().uri("/api/v1/fallback/brunch").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_http_prototype_mode_and_empty_preferences() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", SEARCH_PATH).expect(0).create_async().await;

    let dir = tempfile::tempdir().unwrap();
    let dynamic = app_state(server.url(), &dir, SuggestionMode::Dynamic).await;
    dynamic
        .location
        .resolve_manual(ManualLocation::Coordinate(Coordinate::new(47.61, -122.33)))
        .await
        .unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(dynamic)).configure(configure_routes)).await;

    // Nothing saved yet, so no search happens
    let req = test::TestRequest::post().uri("/api/v1/suggestions/food").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    mock.assert_async().await;

    let other_dir = tempfile::tempdir().unwrap();
    let prototype = app_state(server.url(), &other_dir, SuggestionMode::Prototype).await;
    let app = test::init_service(App::new().app_data(web::Data::new(prototype)).configure(configure_routes)).await;

    let req = test::TestRequest::post().uri("/api/v1/suggestions/food").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["suggestions"][0]["name"], "Nue");
}

#[actix_web::test]
async fn test_http_manual_location_validation() {
    let dir = tempfile::tempdir().unwrap();
    let state = app_state("http://127.0.0.1:9".to_string(), &dir, SuggestionMode::Dynamic).await;
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/location/manual")
        .set_json(json!({ "latitude": 123.0, "longitude": 0.0 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/location/manual")
        .set_json(json!({ "latitude": 47.61 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // Coordinates sent as strings do not parse
    let req = test::TestRequest::post()
        .uri("/api/v1/location/manual")
        .set_json(json!({ "latitude": "47.61", "longitude": "-122.33" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // Neither does a body that is not JSON
    let req = test::TestRequest::post()
        .uri("/api/v1/location/manual")
        .insert_header(("content-type", "text/plain"))
        .set_payload("47.61,-122.33")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    // No geocoder wired in: an address resolves to the default coordinate
    let req = test::TestRequest::post()
        .uri("/api/v1/location/manual")
        .set_json(json!({ "address": "Seattle" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["coordinate"]["latitude"], 0.0);

    // An empty object is the explicit "no input" entry
    let req = test::TestRequest::post()
        .uri("/api/v1/location/manual")
        .set_json(json!({}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "resolved");
}

#[actix_web::test]
async fn test_http_failed_device_fetch_keeps_manual_location() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", SEARCH_PATH)
        .match_body(mockito::Matcher::PartialJson(json!({
            "locationRestriction": { "circle": { "center": { "latitude": 47.61, "longitude": -122.33 } } }
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(nue_body())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = app_state(server.url(), &dir, SuggestionMode::Dynamic).await;
    state.store.save_display(vec!["Japanese"], Vec::<&str>::new(), Vec::<&str>::new()).await.unwrap();
    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/location/manual")
        .set_json(json!({ "latitude": 47.61, "longitude": -122.33 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // Device permission is denied after the manual entry
    let req = test::TestRequest::post().uri("/api/v1/location/device").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get().uri("/api/v1/location").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["state"], "failed");

    // Suggestions still search around the manual coordinate
    let req = test::TestRequest::post().uri("/api/v1/suggestions/food").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["suggestions"][0]["name"], "Nue");
}
