use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tower_http::{cors::CorsLayer, services::ServeDir, set_header::SetResponseHeader};

use crate::error::RelayError;
use crate::relay::{EndpointKind, Relay};

/// Dashboard assets are edited live; never let the browser keep them.
const NO_STORE: &str = "no-store, no-cache, must-revalidate";

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Router with every relay endpoint, `/health`, and the dashboard assets from
/// `static_dir` as the fallback.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let mut api = Router::new().route("/health", get(|| async { "ok" }));

    for kind in EndpointKind::ALL {
        api = api.route(
            kind.path(),
            get(move |State(state): State<AppState>| relay_endpoint(state, kind)),
        );
    }

    let assets = SetResponseHeader::overriding(
        ServeDir::new(static_dir),
        header::CACHE_CONTROL,
        HeaderValue::from_static(NO_STORE),
    );

    api.fallback_service(assets)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn relay_endpoint(state: AppState, kind: EndpointKind) -> Result<Json<Value>, RelayError> {
    state.relay.handle(kind).await.map(Json)
}
