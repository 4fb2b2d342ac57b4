use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::gate::{GateDecision, GateOutcome, GatePolicy, RedirectTarget, RouteClass};

// --- Response Schemas ---

/// ErrorEnvelope
///
/// The `{ success: false, message }` body the backend API uses for every error.
/// Edge-generated errors use the same shape.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// HealthResponse
///
/// Liveness payload for `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    // "local" or "production".
    pub env: String,
    // Whether `/api` requests have somewhere to go.
    pub backend_configured: bool,
    #[ts(type = "string")]
    pub checked_at: DateTime<Utc>,
}

/// GateOutcomeKind
///
/// Flattened, serializable form of `GateOutcome` used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum GateOutcomeKind {
    PassThrough,
    Redirect,
}

/// GateReport
///
/// What the gate would do with a given path and session state. Returned by the
/// diagnostic endpoint `GET /api/gate/evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct GateReport {
    pub path: String,
    pub has_session: bool,
    pub class: RouteClass,
    pub outcome: GateOutcomeKind,
    /// Set only for redirects: the literal target path, without query string.
    pub redirect_to: Option<RedirectTarget>,
    pub location: Option<String>,
}

impl GateReport {
    pub fn new(policy: &GatePolicy, path: &str, has_session: bool, decision: GateDecision) -> Self {
        let (outcome, redirect_to) = match decision.outcome {
            GateOutcome::PassThrough => (GateOutcomeKind::PassThrough, None),
            GateOutcome::Redirect(target) => (GateOutcomeKind::Redirect, Some(target)),
        };

        Self {
            path: path.to_string(),
            has_session,
            class: decision.class,
            outcome,
            redirect_to,
            location: redirect_to.map(|target| policy.target_path(target).to_string()),
        }
    }
}
