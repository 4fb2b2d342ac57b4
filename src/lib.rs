use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// The route gate and the pieces it reads from a request.
pub mod auth;
pub mod gate;

// Edge services and their supporting types.
pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;

// Module for routing segregation (gated site, ungated API).
pub mod routes;
use routes::{api, site};

// --- Public Re-exports ---

pub use auth::Session;
pub use backend::{BackendState, HttpBackend, MockBackend, UnconfiguredBackend};
pub use config::AppConfig;
pub use gate::{GateDecision, GateOutcome, GatePolicy, RedirectTarget, RouteClass};
pub use pages::UiContext;

/// ApiDoc
///
/// OpenAPI description of the endpoints the edge answers itself. Served at
/// `/api/openapi.json`; the forwarded backend API documents itself.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::evaluate_gate),
    components(
        schemas(
            models::HealthResponse, models::GateReport, models::GateOutcomeKind,
            models::ErrorEnvelope, gate::RouteClass, gate::RedirectTarget,
        )
    ),
    tags(
        (name = "agv-edge", description = "Finanzas AGV edge gateway")
    )
)]
struct ApiDoc;

/// AppState
///
/// Single immutable container shared by every request. Handlers pull the piece
/// they need through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Path rules evaluated by the route gate.
    pub policy: GatePolicy,
    /// Destination for `/api` requests.
    pub backend: BackendState,
    /// Rendering defaults for the page shells.
    pub ui: UiContext,
    /// The loaded environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Derives the policy and UI context from the configuration.
    pub fn new(config: AppConfig, backend: BackendState) -> Self {
        Self {
            policy: config.gate_policy(),
            ui: UiContext::from_config(&config),
            backend,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for GatePolicy {
    fn from_ref(app_state: &AppState) -> GatePolicy {
        app_state.policy.clone()
    }
}

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

impl FromRef<AppState> for UiContext {
    fn from_ref(app_state: &AppState) -> UiContext {
        app_state.ui.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// route_gate
///
/// Runs the route gate in front of every request the runtime matcher does not
/// exclude. A pass-through forwards the request untouched; a redirect answers
/// `307 Temporary Redirect` with a bare path, so the client stays on the same
/// host and scheme and the original query string is dropped.
async fn route_gate(
    State(policy): State<GatePolicy>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if policy.is_excluded(path) {
        return next.run(request).await;
    }

    let decision = policy.evaluate(path, session.present);
    match decision.outcome {
        GateOutcome::PassThrough => {
            tracing::debug!(
                path,
                class = ?decision.class,
                has_session = session.present,
                "Route gate: pass"
            );
            next.run(request).await
        }
        GateOutcome::Redirect(target) => {
            let location = policy.target_path(target);
            tracing::info!(
                path,
                class = ?decision.class,
                has_session = session.present,
                location,
                "Route gate: redirect"
            );
            Redirect::temporary(location).into_response()
        }
    }
}

/// create_router
///
/// Assembles the site and API routers, wraps them in the route gate, and adds
/// the observability stack.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: lives under /api so the gate never redirects it.
        .merge(SwaggerUi::new("/api/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
        // API Routes: edge endpoints plus the backend relay.
        .merge(api::api_routes())
        // Site Routes: page shells, rewrites and the static fallback.
        .merge(site::site_routes(&state.config))
        // The gate covers every route, the fallback included.
        .layer(middleware::from_fn_with_state(state.clone(), route_gate))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                // 3b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span for `TraceLayer`, tagged with the request ID.
/// Records the path only, never the query string.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
