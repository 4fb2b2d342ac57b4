use crate::{AppState, config::AppConfig, handlers};
use axum::{Router, routing::get};
use tower_http::services::{ServeDir, ServeFile};

/// Site Router Module
///
/// The page shells plus static serving. Access control is not applied here:
/// the route gate wraps the whole application in `create_router`, which keeps
/// the static fallback under the same rules as the pages.
pub fn site_routes(config: &AppConfig) -> Router<AppState> {
    let mut router = Router::new()
        // GET /
        // Public landing page.
        .route("/", get(handlers::home_page))
        // GET /login
        // Reached only without a session; the gate bounces signed-in users to /letters.
        .route("/login", get(handlers::login_page))
        // GET /letters
        // Reached only with a session; the gate sends everyone else to /login.
        .route("/letters", get(handlers::letters_page));

    // Fixed asset aliases, e.g. the documentation logo.
    for rewrite in &config.static_rewrites {
        let file = config
            .static_dir
            .join(rewrite.destination.trim_start_matches('/'));
        router = router.route_service(&rewrite.source, ServeFile::new(file));
    }

    // Everything else that made it through the gate: files from the static directory.
    router.fallback_service(ServeDir::new(&config.static_dir))
}
