use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::models::ErrorEnvelope;

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment cannot produce a usable
/// configuration. `main` treats every variant as fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set when APP_ENV=production")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// BackendError
///
/// Failures of the `/api` forwarding path. Each variant maps to one HTTP status
/// and is rendered with the backend's own `{ success, message }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend API is not configured")]
    NotConfigured,

    #[error("backend API unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("backend API returned an unusable response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    pub fn status(&self) -> StatusCode {
        match self {
            BackendError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            BackendError::Transport(_) => StatusCode::BAD_GATEWAY,
            BackendError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            BackendError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Backend forwarding failed");
        } else {
            tracing::warn!(error = %self, "Backend forwarding rejected");
        }
        (status, Json(ErrorEnvelope::new(self.to_string()))).into_response()
    }
}
