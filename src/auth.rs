use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use cookie::Cookie;

use crate::gate::GatePolicy;

/// Session
///
/// Presence of the session credential on a request. The gate never looks at
/// the credential itself: validity is established by the backend API, this
/// only records whether a non-empty `session` cookie was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub present: bool,
}

/// Session Extractor Implementation
///
/// Resolves the cookie name from the `GatePolicy` in the application state and
/// scans the request's `Cookie` headers. Never rejects: a missing or empty
/// cookie is simply `present: false`.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    GatePolicy: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let policy = GatePolicy::from_ref(state);
        Ok(Session {
            present: session_present(&parts.headers, policy.session_cookie()),
        })
    }
}

/// cookie_value
///
/// Returns the value of the last cookie called `name` across all `Cookie`
/// headers. Bytes outside UTF-8 are decoded lossily so one odd cookie does not
/// hide the rest of the header. Values are whitespace-trimmed; quotes are kept.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .flat_map(|value| Cookie::split_parse(String::from_utf8_lossy(value.as_bytes())))
        .filter_map(Result::ok)
        .filter(|cookie| cookie.name() == name)
        .last()
        .map(|cookie| cookie.value().to_string())
}

/// True iff the named cookie is present with a non-empty value. An empty value
/// counts as absent.
pub fn session_present(headers: &HeaderMap, name: &str) -> bool {
    cookie_value(headers, name).is_some_and(|value| !value.is_empty())
}
