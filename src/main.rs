use agv_edge::{
    AppState,
    backend::{BackendState, HttpBackend, UnconfiguredBackend},
    config::{AppConfig, Env},
    create_router,
};
use std::{process, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: loads configuration, initializes logging, builds the backend
/// client and starts the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e}");
            process::exit(1);
        }
    };

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "agv_edge=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Edge starting in {:?} mode", config.env);

    // 4. Backend API Client
    let backend: BackendState = match &config.backend_url {
        Some(url) => match HttpBackend::new(url, config.backend_timeout) {
            Ok(client) => {
                tracing::info!(backend_url = %url, "Forwarding /api to backend");
                Arc::new(client)
            }
            Err(e) => {
                tracing::error!(error = %e, "FATAL: could not build backend client");
                process::exit(1);
            }
        },
        None => {
            tracing::warn!("BACKEND_URL not set; /api requests will answer 503");
            Arc::new(UnconfiguredBackend)
        }
    };

    tracing::info!(
        static_dir = %config.static_dir.display(),
        allowed_prefixes = ?config.allowed_prefixes,
        "Route gate configured"
    );

    // 5. Router and Server Startup
    let bind_addr = config.bind_addr;
    let app = create_router(AppState::new(config, backend));

    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %bind_addr, "FATAL: could not bind listener");
            process::exit(1);
        }
    };

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/api/swagger-ui", bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "HTTP server terminated");
        process::exit(1);
    }
}
