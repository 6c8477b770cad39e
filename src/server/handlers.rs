use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::location::geo::valid_coords;
use crate::location::search::clamp_limit;
use crate::location::{
    project_to_box, CascadeController, DistanceEngine, ExactMatchResolver, Level, LocationError,
    SearchScope, SearchType, BOTSWANA_BOUNDS,
};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    success: bool,
    error: String,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<u64>,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
    request_id: Option<u64>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into(), request_id: None }
    }

    /// Echo the caller's request id in the error body.
    fn with_request_id(mut self, request_id: Option<u64>) -> Self {
        self.request_id = request_id;
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            success: false,
            error: self.message,
            code: self.status.as_u16(),
            request_id: self.request_id,
        };
        let mut response = (self.status, Json(body)).into_response();
        response
            .headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}

impl From<LocationError> for ApiError {
    fn from(e: LocationError) -> Self {
        let status = match &e {
            LocationError::QueryTooShort { .. } | LocationError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            LocationError::NotFound { .. } => StatusCode::NOT_FOUND,
            LocationError::Integrity(_) | LocationError::Dataset { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, e.to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(rejection.status(), rejection.body_text())
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError::new(status, msg)
}

fn missing_coords() -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "Provide 'lat' and 'lng' parameters")
}

fn check_coords(lat: f64, lng: f64) -> Result<(), ApiError> {
    if !valid_coords(lat, lng) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid coordinates. Lat: -90..90, Lng: -180..180",
        ));
    }
    Ok(())
}

// ─── GET /locations/districts ────────────────────────────────────

pub async fn districts(State(state): State<Arc<AppState>>) -> Response {
    let data = state.store.districts();
    Json(json!({ "success": true, "data": data, "count": data.len() })).into_response()
}

// ─── GET /locations/districts/{id}/settlements ───────────────────

pub async fn district_settlements(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let listing = state.store.settlements_in(id)?;
    let count = listing.settlements.len();
    tracing::debug!(
        district = %listing.district.name,
        count,
        "GET /locations/districts/{{id}}/settlements"
    );
    Ok(Json(json!({ "success": true, "data": listing, "count": count })).into_response())
}

// ─── GET /locations/settlements/{id}/wards ───────────────────────

pub async fn settlement_wards(
    State(state): State<Arc<AppState>>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(id) = id?;
    let listing = state.store.wards_in(id)?;
    let count = listing.wards.len();
    tracing::debug!(
        settlement = %listing.settlement.name,
        count,
        "GET /locations/settlements/{{id}}/wards"
    );
    Ok(Json(json!({ "success": true, "data": listing, "count": count })).into_response())
}

// ─── GET /locations/search ───────────────────────────────────────

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<usize>,
    pub request_id: Option<u64>,
    pub district_id: Option<u32>,
    pub settlement_id: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse<'a> {
    success: bool,
    data: crate::location::GroupedResults<'a>,
    query: String,
    #[serde(rename = "type")]
    kind: SearchType,
    total_results: usize,
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<u64>,
}

#[derive(Deserialize)]
struct RequestTag {
    request_id: Option<u64>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            // Salvage the id from an otherwise malformed query string.
            let request_id = Query::<RequestTag>::try_from_uri(&uri)
                .ok()
                .and_then(|Query(tag)| tag.request_id);
            return Err(ApiError::from(rejection).with_request_id(request_id));
        }
    };
    run_search(&state, &params).map_err(|e| e.with_request_id(params.request_id))
}

fn run_search(state: &AppState, params: &SearchParams) -> Result<Response, ApiError> {
    let start = Instant::now();

    let query = params.q.as_deref().unwrap_or("");
    let kind: SearchType = params.kind.as_deref().unwrap_or("all").parse()?;
    let limit = clamp_limit(params.limit.unwrap_or(state.default_limit));
    let scope = SearchScope {
        district_id: params.district_id,
        settlement_id: params.settlement_id,
    };

    let data = state.index.search_scoped(query, kind, limit, scope)?;
    let total_results = data.total();

    tracing::info!(
        query,
        %kind,
        limit,
        total_results,
        request_id = params.request_id,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /locations/search"
    );

    Ok(Json(SearchResponse {
        success: true,
        data,
        query: query.trim().to_string(),
        kind,
        total_results,
        limit,
        request_id: params.request_id,
    })
    .into_response())
}

// ─── GET /locations/resolve ──────────────────────────────────────

#[derive(Deserialize)]
pub struct ResolveParams {
    pub level: Option<String>,
    pub q: Option<String>,
    pub parent_id: Option<u32>,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ResolveParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let level: Level = params
        .level
        .as_deref()
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing 'level' parameter"))?
        .parse()?;
    let typed = params.q.as_deref().unwrap_or("");
    let hit = ExactMatchResolver::new(&state.store).resolve(level, typed, params.parent_id);
    tracing::debug!(%level, typed, matched = hit.is_some(), "GET /locations/resolve");
    Ok(Json(json!({ "success": true, "data": hit })).into_response())
}

// ─── GET /locations/nearby ───────────────────────────────────────

#[derive(Deserialize)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_km: Option<f64>,
    pub kind: Option<String>,
}

const DEFAULT_RADIUS_KM: f64 = 10.0;

pub async fn nearby(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let (lat, lng) = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(missing_coords()),
    };
    check_coords(lat, lng)?;
    let radius_km = params.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "'radius_km' must be a non-negative number",
        ));
    }

    let engine = DistanceEngine::new(&state.store);
    let body = match params.kind.as_deref().unwrap_or("settlement") {
        "settlement" => {
            let hits = engine.find_nearby(lat, lng, radius_km);
            json!({ "success": true, "count": hits.len(), "data": hits })
        }
        "plot" => {
            let hits = engine.find_nearby_plots(lat, lng, radius_km);
            json!({ "success": true, "count": hits.len(), "data": hits })
        }
        other => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("Unknown kind '{}'. Use 'settlement' or 'plot'.", other),
            ))
        }
    };
    tracing::debug!(lat, lng, radius_km, "GET /locations/nearby");
    Ok(Json(body).into_response())
}

// ─── GET /locations/project ──────────────────────────────────────

#[derive(Deserialize)]
pub struct ProjectParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

pub async fn project(
    params: Result<Query<ProjectParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let (lat, lng) = match (params.lat, params.lng) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(missing_coords()),
    };
    check_coords(lat, lng)?;
    let point = project_to_box(lat, lng, &BOTSWANA_BOUNDS);
    Ok(Json(json!({ "success": true, "data": point })).into_response())
}

// ─── GET /locations/selection ────────────────────────────────────

#[derive(Deserialize)]
pub struct SelectionParams {
    pub district_id: Option<u32>,
    pub settlement_id: Option<u32>,
    pub ward_id: Option<u32>,
}

/// Apply district, settlement and ward picks in cascade order and return the
/// consolidated value plus the ids after parent inference.
pub async fn selection(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SelectionParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;
    let store = &state.store;
    let mut cascade = CascadeController::new(Arc::clone(store));

    if let Some(id) = params.district_id {
        let d = store.district(id).ok_or(not_found(Level::District, id))?;
        cascade.set_district(d);
    }
    if let Some(id) = params.settlement_id {
        let s = store.settlement(id).ok_or(not_found(Level::Settlement, id))?;
        cascade.set_settlement(s);
    }
    if let Some(id) = params.ward_id {
        let w = store.ward(id).ok_or(not_found(Level::Ward, id))?;
        cascade.set_ward(w);
    }

    let current = cascade.selection();
    Ok(Json(json!({
        "success": true,
        "data": current.to_event(),
        "ids": {
            "district_id": current.district.as_ref().map(|d| d.id),
            "settlement_id": current.settlement.as_ref().map(|s| s.id),
            "ward_id": current.ward.as_ref().map(|w| w.id),
        },
    }))
    .into_response())
}

fn not_found(level: Level, id: u32) -> LocationError {
    LocationError::NotFound { level, id }
}

// ─── GET /health ─────────────────────────────────────────────────

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "store": state.store.stats() }))
}
