//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::compose::RenderPlan;
use crate::directions::{workflow, DirectionsErrorKind};
use crate::error::Error;
use crate::geo::GeoLookup;
use crate::place::Place;
use crate::server::state::{spawn_enrichment, spawn_implicit_route, AppState};
use crate::session::{DirectionsPhase, DirectionsState, SessionSnapshot};
use crate::store::{NewFavorite, NewPlace, NewVisit, StoredPlace};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/search", get(search_handler))
        .route("/api/select", post(select_handler))
        .route("/api/view", get(view_handler))
        .route("/api/session", get(session_handler))
        .route("/api/favorites", post(favorite_handler))
        .route("/api/directions", post(directions_handler))
        .route("/api/directions/mode", post(enter_directions_handler).delete(exit_directions_handler))
        .route("/api/reverse", get(reverse_handler))
        .route("/api/places", get(places_handler).post(create_place_handler))
        .route("/api/places/:id", get(place_handler))
        .route("/api/places/:id/locationHistory", post(add_visit_handler))
        .route("/api/places/:id/favoriteLocations", post(add_favorite_handler))
        .route("/api/places/:id/favoriteLocations/:fav_id", delete(remove_favorite_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    status: StatusCode,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::Lookup(_) => (StatusCode::BAD_GATEWAY, "LOOKUP_ERROR"),
            Error::Directions(e) if e.kind == DirectionsErrorKind::LocationNotFound => {
                (StatusCode::UNPROCESSABLE_ENTITY, "LOCATION_NOT_FOUND")
            }
            Error::Directions(_) => (StatusCode::BAD_GATEWAY, "DIRECTIONS_ERROR"),
            Error::InvalidPlace(_) => (StatusCode::BAD_REQUEST, "INVALID_PLACE"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            status,
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server is running
    pub running: bool,
    /// Server version
    pub version: String,
    /// Current selection generation
    pub generation: u64,
    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let generation = state.session.read().await.generation();
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        generation,
        uptime_secs: state.uptime_secs(),
    })
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

/// Search results plus the map they produce
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub term: String,
    pub results: Vec<Place>,
    pub plan: RenderPlan,
}

/// Search for places
///
/// GET /api/search?q=
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let results = state.geo.search_by_term(&query.q).await?;

    let mut session = state.session.write().await;
    session.apply_search(&query.q, results);

    Ok(Json(SearchResponse {
        term: query.q,
        results: session.search_results().to_vec(),
        plan: session.render_plan(),
    }))
}

#[derive(Debug, Serialize)]
pub struct SelectResponse {
    pub generation: u64,
    /// Whether a route to the previous selection is being fetched
    pub implicit_route: bool,
    pub plan: RenderPlan,
}

/// Select a place; enrichment streams into the session afterwards
///
/// POST /api/select
async fn select_handler(
    State(state): State<Arc<AppState>>,
    Json(place): Json<Place>,
) -> Result<Json<SelectResponse>, ApiError> {
    place.validate()?;

    let (selection, plan) = {
        let mut session = state.session.write().await;
        let selection = session.select(place.clone());
        (selection, session.render_plan())
    };

    spawn_enrichment(state.clone(), &place, selection.generation);
    if let Some((from, to)) = selection.implicit_route {
        spawn_implicit_route(state.clone(), selection.generation, from, to);
    }

    Ok(Json(SelectResponse {
        generation: selection.generation,
        implicit_route: selection.implicit_route.is_some(),
        plan,
    }))
}

/// Current render plan
///
/// GET /api/view
async fn view_handler(State(state): State<Arc<AppState>>) -> Json<RenderPlan> {
    Json(state.session.read().await.render_plan())
}

/// Whole session state
///
/// GET /api/session
async fn session_handler(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.read().await.snapshot())
}

/// Add a favorite; duplicates are kept
///
/// POST /api/favorites
async fn favorite_handler(
    State(state): State<Arc<AppState>>,
    Json(place): Json<Place>,
) -> Result<(StatusCode, Json<Vec<Place>>), ApiError> {
    place.validate()?;
    let mut session = state.session.write().await;
    session.favorite(place);
    Ok((StatusCode::CREATED, Json(session.favorites().to_vec())))
}

/// Enter directions mode
///
/// POST /api/directions/mode
async fn enter_directions_handler(State(state): State<Arc<AppState>>) -> Json<DirectionsState> {
    let mut session = state.session.write().await;
    session.enter_directions_mode();
    Json(session.directions().clone())
}

/// Leave directions mode, dropping any route
///
/// DELETE /api/directions/mode
async fn exit_directions_handler(State(state): State<Arc<AppState>>) -> Json<DirectionsState> {
    let mut session = state.session.write().await;
    session.exit_directions_mode();
    Json(session.directions().clone())
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRequest {
    pub origin: String,
    pub destination: String,
}

#[derive(Debug, Serialize)]
pub struct DirectionsResponse {
    pub directions: DirectionsState,
    pub plan: RenderPlan,
}

/// Request directions between two place names
///
/// POST /api/directions
///
/// The session lock is released while geocoding and routing run.
async fn directions_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DirectionsRequest>,
) -> Result<Json<DirectionsResponse>, ApiError> {
    let ticket = workflow::begin(&mut *state.session.write().await, &req.origin, &req.destination);

    let resolved = state.workflow.resolve(&req.origin, &req.destination).await;
    let pair = workflow::accept_resolution(&mut *state.session.write().await, ticket, resolved);

    if let Some((from, to)) = pair {
        let outcome = state.workflow.route(from, to).await;
        workflow::finish(&mut *state.session.write().await, ticket, outcome);
    }

    let session = state.session.read().await;
    let directions = session.directions().clone();
    if let DirectionsPhase::Failed { error } = directions.phase.clone() {
        return Err(Error::Directions(error).into());
    }

    Ok(Json(DirectionsResponse {
        directions,
        plan: session.render_plan(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReverseResponse {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Name for a coordinate; falls back to the default location
///
/// GET /api/reverse?lat=&lon=
async fn reverse_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReverseQuery>,
) -> Json<ReverseResponse> {
    let name = state.reverse.reverse_geocode(query.lat, query.lon).await;
    Json(ReverseResponse {
        name,
        lat: query.lat,
        lon: query.lon,
    })
}

/// List saved places
///
/// GET /api/places
async fn places_handler(State(state): State<Arc<AppState>>) -> Json<Vec<StoredPlace>> {
    Json(state.store.lock().await.list().to_vec())
}

/// Get a saved place
///
/// GET /api/places/:id
async fn place_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoredPlace>, ApiError> {
    let store = state.store.lock().await;
    store
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::NotFound(format!("Place not found: {}", id)).into())
}

/// Save a new place
///
/// POST /api/places
async fn create_place_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewPlace>,
) -> Result<(StatusCode, Json<StoredPlace>), ApiError> {
    let mut store = state.store.lock().await;
    let place = store.commit(|s| s.create(req).cloned())?;
    Ok((StatusCode::CREATED, Json(place)))
}

/// Record a visit
///
/// POST /api/places/:id/locationHistory
async fn add_visit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<NewVisit>,
) -> Result<(StatusCode, Json<StoredPlace>), ApiError> {
    let mut store = state.store.lock().await;
    let place = store.commit(|s| s.add_visit(&id, req).cloned())?;
    Ok((StatusCode::CREATED, Json(place)))
}

/// Add a favorite location to a saved place
///
/// POST /api/places/:id/favoriteLocations
async fn add_favorite_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<NewFavorite>,
) -> Result<(StatusCode, Json<StoredPlace>), ApiError> {
    let mut store = state.store.lock().await;
    let place = store.commit(|s| s.add_favorite(&id, req).cloned())?;
    Ok((StatusCode::CREATED, Json(place)))
}

/// Remove a favorite location
///
/// DELETE /api/places/:id/favoriteLocations/:fav_id
async fn remove_favorite_handler(
    State(state): State<Arc<AppState>>,
    Path((id, fav_id)): Path<(String, String)>,
) -> Result<Json<StoredPlace>, ApiError> {
    let mut store = state.store.lock().await;
    let place = store.commit(|s| s.remove_favorite(&id, &fav_id).cloned())?;
    Ok(Json(place))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::PlaceStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    /// Every upstream points at a closed local port
    fn offline_config() -> Config {
        let mut config = Config::default();
        let dead = "http://127.0.0.1:9".to_string();
        config.endpoints.nominatim = dead.clone();
        config.endpoints.reverse_geocode = dead.clone();
        config.endpoints.directions = dead.clone();
        config.endpoints.weather = dead.clone();
        config.endpoints.wiki_rest = dead.clone();
        config.endpoints.wiki_api = dead;
        config
    }

    fn create_test_state() -> (Arc<AppState>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = PlaceStore::load_from(temp_dir.path().join("places.json")).unwrap();
        (Arc::new(AppState::new(offline_config(), store)), temp_dir)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn paris() -> serde_json::Value {
        serde_json::json!({
            "title": "Paris",
            "description": "Capital of France",
            "longitude": 2.3522,
            "latitude": 48.8566
        })
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (state, _temp) = create_test_state();
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/api/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let status: StatusResponse = serde_json::from_slice(&body).unwrap();

        assert!(status.running);
        assert_eq!(status.generation, 0);
    }

    #[tokio::test]
    async fn test_empty_view_is_placeholder() {
        let (state, _temp) = create_test_state();
        let (status, body) = send(create_router(state), "GET", "/api/view", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["viewport"]["kind"], "placeholder");
        assert_eq!(body["markers"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_search_upstream_failure_is_lookup_error() {
        let (state, _temp) = create_test_state();
        let (status, body) = send(create_router(state), "GET", "/api/search?q=Paris", None).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "LOOKUP_ERROR");
    }

    #[tokio::test]
    async fn test_select_centers_on_place() {
        let (state, _temp) = create_test_state();
        let app = create_router(state.clone());

        let (status, body) = send(app.clone(), "POST", "/api/select", Some(paris())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["generation"], 1);
        assert_eq!(body["implicit_route"], false);
        assert_eq!(body["plan"]["viewport"]["kind"], "center");
        assert_eq!(body["plan"]["viewport"]["zoom"], 12);

        let (_, session) = send(app, "GET", "/api/session", None).await;
        assert_eq!(session["history"][0]["title"], "Paris");
    }

    #[tokio::test]
    async fn test_select_rejects_half_coordinates() {
        let (state, _temp) = create_test_state();
        let place = serde_json::json!({ "title": "Nowhere", "longitude": 2.0 });

        let (status, body) = send(create_router(state), "POST", "/api/select", Some(place)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PLACE");
    }

    #[tokio::test]
    async fn test_favorites_keep_duplicates() {
        let (state, _temp) = create_test_state();
        let app = create_router(state);

        send(app.clone(), "POST", "/api/favorites", Some(paris())).await;
        let (status, body) = send(app, "POST", "/api/favorites", Some(paris())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_directions_mode_toggle() {
        let (state, _temp) = create_test_state();
        let app = create_router(state);

        let (_, body) = send(app.clone(), "POST", "/api/directions/mode", None).await;
        assert_eq!(body["active"], true);

        let (_, body) = send(app, "DELETE", "/api/directions/mode", None).await;
        assert_eq!(body["active"], false);
        assert_eq!(body["phase"]["state"], "idle");
    }

    #[tokio::test]
    async fn test_directions_with_blank_origin() {
        let (state, _temp) = create_test_state();
        let app = create_router(state);
        let req = serde_json::json!({ "origin": " ", "destination": "" });

        let (status, body) = send(app.clone(), "POST", "/api/directions", Some(req)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "LOCATION_NOT_FOUND");

        let (_, session) = send(app, "GET", "/api/session", None).await;
        assert_eq!(session["directions"]["phase"]["state"], "failed");
    }

    #[tokio::test]
    async fn test_reverse_falls_back() {
        let (state, _temp) = create_test_state();
        let (status, body) = send(create_router(state), "GET", "/api/reverse?lat=1.5&lon=2.5", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Dubai");
        assert_eq!(body["lat"], 1.5);
    }

    #[tokio::test]
    async fn test_place_store_crud() {
        let (state, _temp) = create_test_state();
        let app = create_router(state);

        let new_place = serde_json::json!({ "name": "Home", "longitude": 55.27, "latitude": 25.2 });
        let (status, created) = send(app.clone(), "POST", "/api/places", Some(new_place)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let visit = serde_json::json!({ "longitude": 55.3, "latitude": 25.21 });
        let (status, place) =
            send(app.clone(), "POST", &format!("/api/places/{}/locationHistory", id), Some(visit)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(place["locationHistory"].as_array().map(Vec::len), Some(1));

        let favorite = serde_json::json!({ "longitude": 55.28, "latitude": 25.19, "name": "Cafe" });
        let (_, place) =
            send(app.clone(), "POST", &format!("/api/places/{}/favoriteLocations", id), Some(favorite)).await;
        let fav_id = place["favoriteLocations"][0]["id"].as_str().unwrap().to_string();

        let (status, place) = send(
            app.clone(),
            "DELETE",
            &format!("/api/places/{}/favoriteLocations/{}", id, fav_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(place["favoriteLocations"], serde_json::json!([]));

        let (_, list) = send(app, "GET", "/api/places", None).await;
        assert_eq!(list.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_place_store_requires_name() {
        let (state, _temp) = create_test_state();
        let new_place = serde_json::json!({ "longitude": 55.27, "latitude": 25.2 });

        let (status, body) = send(create_router(state), "POST", "/api/places", Some(new_place)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_PLACE");
    }

    #[test]
    fn test_directions_errors_map_by_kind() {
        use crate::constants::messages::LOCATIONS_NOT_FOUND;
        use crate::directions::DirectionsError;

        let miss = ApiError::from(Error::Directions(DirectionsError::locations_not_found()));
        assert_eq!(miss.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(miss.code, "LOCATION_NOT_FOUND");

        let echoed = ApiError::from(Error::Directions(DirectionsError::from_upstream(Some(LOCATIONS_NOT_FOUND))));
        assert_eq!(echoed.status, StatusCode::BAD_GATEWAY);
        assert_eq!(echoed.code, "DIRECTIONS_ERROR");
        assert_eq!(echoed.error, LOCATIONS_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_no_place_behind() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let store = PlaceStore::load_from(blocker.join("places.json")).unwrap();
        let app = create_router(Arc::new(AppState::new(offline_config(), store)));

        let new_place = serde_json::json!({ "name": "Home", "longitude": 55.27, "latitude": 25.2 });
        let (status, body) = send(app.clone(), "POST", "/api/places", Some(new_place)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "STORE_ERROR");

        let (_, list) = send(app, "GET", "/api/places", None).await;
        assert_eq!(list, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_place_is_404() {
        let (state, _temp) = create_test_state();
        let app = create_router(state);

        let (status, body) = send(app.clone(), "GET", "/api/places/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let visit = serde_json::json!({ "longitude": 1.0, "latitude": 1.0 });
        let (status, _) = send(app, "POST", "/api/places/missing/locationHistory", Some(visit)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
