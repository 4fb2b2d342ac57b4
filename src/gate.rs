use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// The root of the routes that require an active session.
pub const PROTECTED_ROOT: &str = "/letters";
/// The root of the unauthenticated login flow.
pub const LOGIN_ROOT: &str = "/login";
/// Internal framework-asset prefix. Anything under it is served without checks.
pub const ASSET_PREFIX: &str = "/_next/";
/// Name of the cookie whose presence marks a session.
pub const SESSION_COOKIE_NAME: &str = "session";
/// Paths whose first segment starts with this are never seen by the gate.
pub const EXCLUDED_PREFIX: &str = "api";

/// RouteClass
///
/// Closed classification of a request path. The variants are listed in the
/// order `GatePolicy::classify` tests them: earlier variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum RouteClass {
    /// Any path containing a `.` or living under the asset prefix.
    StaticAsset,
    /// The protected root or anything below it.
    Protected,
    /// The login root or anything below it.
    Auth,
    /// The site root or an allow-listed prefix.
    PublicAllowed,
    /// Everything else. Denied regardless of session.
    Other,
}

/// Where a redirect sends the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum RedirectTarget {
    Login,
    Landing,
}

/// GateOutcome
///
/// The only two things the gate can do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    PassThrough,
    Redirect(RedirectTarget),
}

/// A classification together with the outcome derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateDecision {
    pub class: RouteClass,
    pub outcome: GateOutcome,
}

/// GatePolicy
///
/// The immutable set of path rules the gate evaluates. Built once at startup
/// from `AppConfig` and shared through the application state.
///
/// The protected root and the login root are always part of the allow-list,
/// so a redirect target is always reachable for the session state that
/// produced the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatePolicy {
    protected_root: String,
    login_root: String,
    asset_prefix: String,
    allowed_prefixes: Vec<String>,
    session_cookie: String,
    excluded_prefix: String,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self::with_allowed_prefixes(std::iter::empty::<String>())
    }
}

impl GatePolicy {
    /// Builds a policy with the fixed roots plus any extra allow-listed prefixes.
    /// Duplicates are dropped and trailing slashes removed.
    pub fn with_allowed_prefixes<I, P>(extra: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let mut allowed_prefixes = vec![PROTECTED_ROOT.to_string(), LOGIN_ROOT.to_string()];
        for prefix in extra {
            let prefix = prefix.into();
            let prefix = prefix.trim_end_matches('/');
            if prefix.is_empty() || allowed_prefixes.iter().any(|p| p == prefix) {
                continue;
            }
            allowed_prefixes.push(prefix.to_string());
        }

        Self {
            protected_root: PROTECTED_ROOT.to_string(),
            login_root: LOGIN_ROOT.to_string(),
            asset_prefix: ASSET_PREFIX.to_string(),
            allowed_prefixes,
            session_cookie: SESSION_COOKIE_NAME.to_string(),
            excluded_prefix: EXCLUDED_PREFIX.to_string(),
        }
    }

    pub fn session_cookie(&self) -> &str {
        &self.session_cookie
    }

    pub fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    /// True for paths the hosting runtime routes around the gate entirely
    /// (the equivalent of the matcher `/((?!api).*)`).
    pub fn is_excluded(&self, path: &str) -> bool {
        path.strip_prefix('/')
            .is_some_and(|rest| rest.starts_with(self.excluded_prefix.as_str()))
    }

    /// classify
    ///
    /// Assigns the path to exactly one `RouteClass`. The checks run in priority
    /// order: the static bypass beats the protected guard, which beats the
    /// login bounce, which beats the allow-list.
    pub fn classify(&self, path: &str) -> RouteClass {
        if path.contains('.') || path.starts_with(self.asset_prefix.as_str()) {
            RouteClass::StaticAsset
        } else if under_root(path, &self.protected_root) {
            RouteClass::Protected
        } else if under_root(path, &self.login_root) {
            RouteClass::Auth
        } else if path == "/" || self.allowed_prefixes.iter().any(|p| under_root(path, p)) {
            RouteClass::PublicAllowed
        } else {
            RouteClass::Other
        }
    }

    /// decide
    ///
    /// Maps a classification and session presence to an outcome. Rules 2 and 3
    /// test opposite session values, so at most one of them redirects.
    pub fn decide(class: RouteClass, has_session: bool) -> GateOutcome {
        match class {
            RouteClass::StaticAsset | RouteClass::PublicAllowed => GateOutcome::PassThrough,
            RouteClass::Protected if has_session => GateOutcome::PassThrough,
            RouteClass::Protected => GateOutcome::Redirect(RedirectTarget::Login),
            RouteClass::Auth if has_session => GateOutcome::Redirect(RedirectTarget::Landing),
            RouteClass::Auth => GateOutcome::PassThrough,
            RouteClass::Other => GateOutcome::Redirect(RedirectTarget::Login),
        }
    }

    /// Classifies the path and decides in one step.
    pub fn evaluate(&self, path: &str, has_session: bool) -> GateDecision {
        let class = self.classify(path);
        GateDecision {
            class,
            outcome: Self::decide(class, has_session),
        }
    }

    /// The literal path a redirect points at. Never carries a query string.
    pub fn target_path(&self, target: RedirectTarget) -> &str {
        match target {
            RedirectTarget::Login => &self.login_root,
            RedirectTarget::Landing => &self.protected_root,
        }
    }
}

// `root` itself or anything strictly below it; `/lettersx` is not under `/letters`.
fn under_root(path: &str, root: &str) -> bool {
    path.strip_prefix(root)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
