use crate::{
    backend::{BackendState, ForwardRequest, MAX_FORWARD_BODY_BYTES},
    config::AppConfig,
    error::BackendError,
    gate::GatePolicy,
    models::{ErrorEnvelope, GateReport, HealthResponse},
    pages::{Page, UiContext, render_shell},
};
use axum::{
    Json,
    body::Body,
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    response::{Html, Response},
};
use serde::Deserialize;

// --- Query Structs ---

/// GateQuery
///
/// Query parameters for `GET /api/gate/evaluate`. `session` defaults to false,
/// matching a request without the cookie.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GateQuery {
    /// The request path to evaluate. Must start with `/`.
    pub path: String,
    /// Whether a non-empty session cookie is present.
    #[serde(default)]
    pub session: bool,
}

// --- Edge API Handlers ---

/// health
///
/// [Edge Route] Liveness check. Always 200 while the process is serving; also
/// reports whether `/api` forwarding has a destination.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Edge is up", body = HealthResponse))
)]
pub async fn health(
    State(config): State<AppConfig>,
    State(backend): State<BackendState>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        env: config.env.as_str().to_string(),
        backend_configured: backend.is_configured(),
        checked_at: chrono::Utc::now(),
    })
}

/// evaluate_gate
///
/// [Edge Route] Reports what the route gate does for a path and session state,
/// without performing the redirect. Used by the diagnostics page.
#[utoipa::path(
    get,
    path = "/api/gate/evaluate",
    params(GateQuery),
    responses(
        (status = 200, description = "Gate decision", body = GateReport),
        (status = 400, description = "Path is not absolute", body = ErrorEnvelope)
    )
)]
pub async fn evaluate_gate(
    State(policy): State<GatePolicy>,
    Query(query): Query<GateQuery>,
) -> Result<Json<GateReport>, (StatusCode, Json<ErrorEnvelope>)> {
    if !query.path.starts_with('/') {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorEnvelope::new("path must start with '/'")),
        ));
    }

    let decision = policy.evaluate(&query.path, query.session);
    Ok(Json(GateReport::new(
        &policy,
        &query.path,
        query.session,
        decision,
    )))
}

/// forward_api
///
/// [Backend Route] Relays any other `/api/*` request to the backend API. The
/// route gate never sees these paths; authentication is the backend's job.
pub async fn forward_api(
    State(backend): State<BackendState>,
    request: Request,
) -> Result<Response, BackendError> {
    if !backend.is_configured() {
        return Err(BackendError::NotConfigured);
    }

    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, MAX_FORWARD_BODY_BYTES)
        .await
        .map_err(|_| BackendError::BodyTooLarge {
            limit: MAX_FORWARD_BODY_BYTES,
        })?;

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let forwarded = backend
        .forward(ForwardRequest {
            method: parts.method,
            path_and_query,
            headers: parts.headers,
            body,
        })
        .await?;

    let mut response = Response::new(Body::from(forwarded.body));
    *response.status_mut() = forwarded.status;
    *response.headers_mut() = forwarded.headers;
    Ok(response)
}

// --- Page Handlers ---

// The gate has already run by the time these execute: reaching `letters_page`
// implies a session cookie, reaching `login_page` implies none.

/// [Public Route] Landing shell for `/`.
pub async fn home_page(State(ui): State<UiContext>, headers: HeaderMap) -> Html<String> {
    Html(render_shell(&ui, ui.resolve_theme(&headers), Page::Home))
}

/// [Auth Route] Login form shell.
pub async fn login_page(State(ui): State<UiContext>, headers: HeaderMap) -> Html<String> {
    Html(render_shell(&ui, ui.resolve_theme(&headers), Page::Login))
}

/// [Protected Route] Letters report shell.
pub async fn letters_page(State(ui): State<UiContext>, headers: HeaderMap) -> Html<String> {
    Html(render_shell(&ui, ui.resolve_theme(&headers), Page::Letters))
}
