use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use plot_locator::location::{LocationStore, RequestSequencer};
use plot_locator::server::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let store = LocationStore::builtin().unwrap();
    build_router(Arc::new(AppState::new(Arc::new(store), 20)))
}

async fn send(uri: &str) -> Response {
    app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = send(uri).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn lists_all_districts() {
    let (status, body) = get("/locations/districts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 10);
    assert!(body["data"][0].get("type").is_some());
}

#[tokio::test]
async fn settlements_of_district() {
    let (status, body) = get("/locations/districts/9/settlements").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["district"]["name"], "South-East");
    let names: Vec<&str> = body["data"]["settlements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Gaborone"));
    assert!(names.iter().all(|n| *n != "Francistown"));
}

#[tokio::test]
async fn unknown_district_is_404() {
    let (status, body) = get("/locations/districts/999/settlements").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 404);
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn wards_of_gaborone_in_ward_order() {
    let (status, body) = get("/locations/settlements/101/wards").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 10);
    assert_eq!(body["data"]["district"]["code"], "SE");
    let numbers: Vec<u64> = body["data"]["wards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["ward_number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, (1..=10).collect::<Vec<u64>>());
}

#[tokio::test]
async fn short_query_is_400() {
    let (status, body) = get("/locations/search?q=g").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn unknown_search_type_is_400() {
    let (status, _) = get("/locations/search?q=gab&type=country").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_echoes_request_id() {
    let uri = "/locations/search?q=%20Gab%20&type=settlement&limit=5&request_id=42";
    let (status, body) = get(uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "Gab");
    assert_eq!(body["type"], "settlement");
    assert_eq!(body["limit"], 5);
    assert_eq!(body["requestId"], 42);

    let settlements = body["data"]["settlements"].as_array().unwrap();
    assert_eq!(settlements[0]["name"], "Gaborone");
    assert_eq!(settlements[0]["match_kind"], "prefix");
    assert!(body["data"]["districts"].as_array().unwrap().is_empty());
    assert_eq!(body["totalResults"].as_u64().unwrap() as usize, settlements.len());
}

#[tokio::test]
async fn search_limit_is_clamped() {
    let (status, body) = get("/locations/search?q=an&limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 1);
    assert!(body.get("requestId").is_none());
}

#[tokio::test]
async fn resolve_ward_under_parent() {
    let (status, body) = get("/locations/resolve?level=ward&q=block%208&parent_id=107").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], "ward");
    assert_eq!(body["data"]["id"], 1011);

    let (_, body) = get("/locations/resolve?level=ward&q=block%208&parent_id=101").await;
    assert_eq!(body["data"]["id"], 1004);
}

#[tokio::test]
async fn resolve_without_match_is_null() {
    let (status, body) = get("/locations/resolve?level=settlement&q=gabo").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].is_null());

    let (status, _) = get("/locations/resolve?q=gaborone").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nearby_sorted_by_distance() {
    let (status, body) = get("/locations/nearby?lat=-24.6282&lng=25.9231&radius_km=10").await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["data"].as_array().unwrap();
    assert_eq!(hits[0]["name"], "Gaborone");
    assert!(hits[0]["distance_km"].as_f64().unwrap() < 1e-9);
    let distances: Vec<f64> = hits.iter().map(|h| h["distance_km"].as_f64().unwrap()).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(distances.iter().all(|d| *d <= 10.0));
}

#[tokio::test]
async fn nearby_rejects_bad_input() {
    let (status, _) = get("/locations/nearby?lat=-95&lng=25").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get("/locations/nearby?lat=-24.6&lng=25.9&radius_km=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get("/locations/nearby?lat=-24.6&lng=25.9&kind=farm").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn project_gaborone_into_box() {
    let (status, body) = get("/locations/project?lat=-24.6282&lng=25.9231").await;
    assert_eq!(status, StatusCode::OK);
    let x = body["data"]["x"].as_f64().unwrap();
    let y = body["data"]["y"].as_f64().unwrap();
    assert!((63.0..63.4).contains(&x));
    assert!((74.8..75.2).contains(&y));
}

#[tokio::test]
async fn selection_infers_parents() {
    let (status, body) = get("/locations/selection?district_id=1&ward_id=1011").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "Kweneng");
    assert_eq!(body["data"]["city"], "Mogoditshane");
    assert_eq!(body["data"]["ward"], "Block 8");
    assert_eq!(body["ids"]["district_id"], 6);
    assert_eq!(body["ids"]["settlement_id"], 107);

    let (status, _) = get("/locations/selection?ward_id=5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_counts() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"]["districts"], 10);
    assert_eq!(body["store"]["source"], "builtin");
}

#[tokio::test]
async fn errors_echo_request_id() {
    let (status, body) = get("/locations/search?q=g&request_id=7").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["requestId"], 7);

    let (status, body) = get("/locations/search?q=gab&type=country&request_id=8").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["requestId"], 8);

    let (_, body) = get("/locations/search?q=g").await;
    assert!(body.get("requestId").is_none());
}

#[tokio::test]
async fn malformed_parameters_get_json_errors() {
    let (status, body) = get("/locations/search?q=ga&limit=abc&request_id=9").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 400);
    assert_eq!(body["requestId"], 9);
    assert!(body["error"].as_str().unwrap().contains("limit"));

    let (status, body) = get("/locations/districts/abc/settlements").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 400);

    let (status, body) = get("/locations/settlements/-1/wards").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, body) = get("/locations/nearby?lat=south&lng=25.9").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn cache_headers() {
    let cache_control = |r: &Response| {
        r.headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.to_str().unwrap().to_string())
    };

    let ok = send("/locations/districts").await;
    assert_eq!(cache_control(&ok).as_deref(), Some("public, max-age=300"));

    let bad = send("/locations/search?q=g").await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    assert_eq!(cache_control(&bad).as_deref(), Some("no-store"));

    let missing = send("/locations/districts/999/settlements").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(cache_control(&missing).as_deref(), Some("no-store"));

    let health = send("/health").await;
    assert_eq!(cache_control(&health), None);
}

#[tokio::test]
async fn stale_search_responses_are_dropped() {
    let seq = RequestSequencer::new();
    let first = seq.issue();
    let second = seq.issue();

    let (_, stale) = get(&format!("/locations/search?q=g&request_id={}", first)).await;
    let (_, fresh) = get(&format!("/locations/search?q=gab&request_id={}", second)).await;

    assert!(!seq.is_current(stale["requestId"].as_u64().unwrap()));
    assert!(seq.is_current(fresh["requestId"].as_u64().unwrap()));
    assert_eq!(fresh["success"], true);
}
