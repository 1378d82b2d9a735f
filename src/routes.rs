use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::exec;
use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Build the full axum Router with all routes and the CORS policy.
pub fn build_router(state: AppState) -> Router {
    // An empty allow-list keeps the permissive CORS the browser clients
    // expect; otherwise only the configured origins may call the API.
    let cors = if state.allowed_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/", get(index))
        .route("/run", post(exec::run_code))
        .route("/ws", get(ws_handler::ws_upgrade))
        .route("/health", get(health_check))
        .layer(cors)
        .with_state(state)
}

/// Plain-text liveness line for the root path.
async fn index() -> &'static str {
    "syncpad relay is running"
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
