use agv_edge::gate::{GateOutcome, GatePolicy, RedirectTarget, RouteClass};
use proptest::prelude::*;

const PASS: GateOutcome = GateOutcome::PassThrough;
const TO_LOGIN: GateOutcome = GateOutcome::Redirect(RedirectTarget::Login);
const TO_LANDING: GateOutcome = GateOutcome::Redirect(RedirectTarget::Landing);

fn outcome(path: &str, has_session: bool) -> GateOutcome {
    GatePolicy::default().evaluate(path, has_session).outcome
}

// --- Literal Scenarios ---

#[test]
fn test_letters_without_session_redirects_to_login() {
    assert_eq!(outcome("/letters", false), TO_LOGIN);
}

#[test]
fn test_letters_subpath_with_session_passes() {
    assert_eq!(outcome("/letters/123", true), PASS);
}

#[test]
fn test_login_with_session_bounces_to_letters() {
    assert_eq!(outcome("/login", true), TO_LANDING);
}

#[test]
fn test_login_without_session_passes() {
    assert_eq!(outcome("/login", false), PASS);
}

#[test]
fn test_framework_asset_bypasses_gate() {
    assert_eq!(outcome("/_next/chunk.js", false), PASS);
}

#[test]
fn test_unknown_route_is_denied() {
    assert_eq!(outcome("/reports", false), TO_LOGIN);
    assert_eq!(outcome("/reports", true), TO_LOGIN);
}

// --- Classification & Precedence ---

#[test]
fn test_classification_precedence() {
    let policy = GatePolicy::default();

    assert_eq!(policy.classify("/letters/report.pdf"), RouteClass::StaticAsset);
    assert_eq!(policy.classify("/_next/static/chunks/main"), RouteClass::StaticAsset);
    assert_eq!(policy.classify("/letters"), RouteClass::Protected);
    assert_eq!(policy.classify("/letters/2024/03"), RouteClass::Protected);
    assert_eq!(policy.classify("/login"), RouteClass::Auth);
    assert_eq!(policy.classify("/login/reset"), RouteClass::Auth);
    assert_eq!(policy.classify("/"), RouteClass::PublicAllowed);
    assert_eq!(policy.classify("/collections"), RouteClass::Other);
    assert_eq!(policy.classify("/treasury"), RouteClass::Other);
}

#[test]
fn test_static_asset_under_protected_path_is_not_gated() {
    // A dotted path below /letters is served without any session check.
    assert_eq!(outcome("/letters/report.pdf", false), PASS);
    assert_eq!(outcome("/login/logo.svg", true), PASS);
}

#[test]
fn test_prefix_match_requires_segment_boundary() {
    let policy = GatePolicy::default();

    assert_eq!(policy.classify("/lettersx"), RouteClass::Other);
    assert_eq!(policy.classify("/login-help"), RouteClass::Other);
    assert_eq!(outcome("/lettersx", true), TO_LOGIN);
}

#[test]
fn test_framework_prefix_needs_trailing_slash() {
    // "/_next" alone is not under the asset prefix and is not allow-listed.
    assert_eq!(outcome("/_next", false), TO_LOGIN);
}

#[test]
fn test_site_root_passes_for_everyone() {
    assert_eq!(outcome("/", false), PASS);
    assert_eq!(outcome("/", true), PASS);
}

#[test]
fn test_extra_allowed_prefix_is_public() {
    let policy = GatePolicy::with_allowed_prefixes(["/help/"]);

    assert_eq!(policy.classify("/help"), RouteClass::PublicAllowed);
    assert_eq!(policy.classify("/help/faq"), RouteClass::PublicAllowed);
    assert_eq!(policy.evaluate("/help", false).outcome, PASS);
    // The fixed roots keep their own rules.
    assert_eq!(policy.evaluate("/letters", false).outcome, TO_LOGIN);
}

#[test]
fn test_policy_always_allow_lists_both_roots() {
    let policy = GatePolicy::with_allowed_prefixes(["/letters", "/docs"]);

    assert_eq!(policy.allowed_prefixes(), ["/letters", "/login", "/docs"]);
}

#[test]
fn test_redirect_targets_are_bare_paths() {
    let policy = GatePolicy::default();

    assert_eq!(policy.target_path(RedirectTarget::Login), "/login");
    assert_eq!(policy.target_path(RedirectTarget::Landing), "/letters");
}

#[test]
fn test_api_prefix_is_excluded_from_gate() {
    let policy = GatePolicy::default();

    assert!(policy.is_excluded("/api"));
    assert!(policy.is_excluded("/api/v1/letters"));
    // The runtime matcher is a plain negative lookahead on "api".
    assert!(policy.is_excluded("/apidocs"));
    assert!(!policy.is_excluded("/letters/api"));
    assert!(!policy.is_excluded("/"));
}

// --- Properties ---

fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z0-9_.-]{1,8}", 0..4).prop_map(|segments| {
        let mut path = String::from("/");
        path.push_str(&segments.join("/"));
        path
    })
}

proptest! {
    #[test]
    fn prop_dotted_paths_always_pass(
        dir in path_strategy(),
        file in "[a-z0-9]{1,8}\\.[a-z]{2,4}",
        session in any::<bool>(),
    ) {
        let path = format!("{}/{}", dir.trim_end_matches('/'), file);
        prop_assert_eq!(outcome(&path, session), PASS);
    }

    #[test]
    fn prop_protected_paths_follow_session(tail in "(/[a-z0-9]{1,8}){0,3}") {
        let path = format!("/letters{tail}");
        prop_assert_eq!(outcome(&path, false), TO_LOGIN);
        prop_assert_eq!(outcome(&path, true), PASS);
    }

    #[test]
    fn prop_login_paths_follow_session(tail in "(/[a-z0-9]{1,8}){0,3}") {
        let path = format!("/login{tail}");
        prop_assert_eq!(outcome(&path, true), TO_LANDING);
        prop_assert_eq!(outcome(&path, false), PASS);
    }

    #[test]
    fn prop_default_deny_ignores_session(path in path_strategy()) {
        let policy = GatePolicy::default();
        prop_assume!(policy.classify(&path) == RouteClass::Other);
        prop_assert_eq!(outcome(&path, false), TO_LOGIN);
        prop_assert_eq!(outcome(&path, true), TO_LOGIN);
    }

    #[test]
    fn prop_redirects_never_loop(path in path_strategy(), session in any::<bool>()) {
        let policy = GatePolicy::default();
        let mut current = path;
        let mut hops = 0;
        while let GateOutcome::Redirect(target) = policy.evaluate(&current, session).outcome {
            let location = policy.target_path(target);
            // Never redirected to the page that just redirected.
            prop_assert_ne!(location, current.as_str());
            current = location.to_string();
            hops += 1;
            // Worst case: /reports -> /login -> /letters with a session.
            prop_assert!(hops <= 2, "redirect chain too long at {}", current);
        }
    }

    #[test]
    fn prop_evaluation_is_pure(path in path_strategy(), session in any::<bool>()) {
        let policy = GatePolicy::default();
        prop_assert_eq!(policy.evaluate(&path, session), policy.evaluate(&path, session));
    }
}
