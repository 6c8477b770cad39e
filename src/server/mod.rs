mod handlers;
mod state;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Settings;
use crate::location::LocationStore;

pub use state::AppState;

/// Reference-data responses are cacheable for five minutes. Errors carry
/// `no-store` and `/health` carries no caching header.
pub fn build_router(state: Arc<AppState>) -> Router {
    let locations = Router::new()
        .route("/locations/districts", get(handlers::districts))
        .route("/locations/districts/{id}/settlements", get(handlers::district_settlements))
        .route("/locations/settlements/{id}/wards", get(handlers::settlement_wards))
        .route("/locations/search", get(handlers::search))
        .route("/locations/resolve", get(handlers::resolve))
        .route("/locations/nearby", get(handlers::nearby))
        .route("/locations/project", get(handlers::project))
        .route("/locations/selection", get(handlers::selection))
        .route_layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(locations)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(settings: &Settings, store: LocationStore) -> anyhow::Result<()> {
    let stats = store.stats();
    let state = Arc::new(AppState::new(Arc::new(store), settings.default_limit));
    let app = build_router(state);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("cannot bind to {}: {}", addr, e))?;

    tracing::info!(
        %addr,
        source = %stats.source,
        districts = stats.districts,
        settlements = stats.settlements,
        wards = stats.wards,
        plots = stats.plots,
        "location service listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
