use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{any, get},
};

/// API Router Module
///
/// Routes under `/api`. The route gate's matcher excludes this prefix, so
/// nothing here depends on the session cookie.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // Liveness probe for load balancers and the diagnostics page.
        .route("/api/health", get(handlers::health))
        // GET /api/gate/evaluate?path=...&session=...
        // Explains the route gate's decision without redirecting.
        .route("/api/gate/evaluate", get(handlers::evaluate_gate))
        // ANY /api/*
        // Everything else belongs to the backend API (/api/v1/auth, /api/v1/letters, ...).
        .route("/api/{*path}", any(handlers::forward_api))
}
