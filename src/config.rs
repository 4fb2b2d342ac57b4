use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use crate::{error::ConfigError, gate::GatePolicy, pages::Theme};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_ALLOWED_PREFIXES: &str = "/letters,/login";

/// AppConfig
///
/// Holds the edge server's entire configuration. Immutable once loaded and
/// pulled into handlers through `FromRef`, like the rest of the state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Production requires a backend URL.
    pub env: Env,
    // Socket the HTTP server binds to.
    pub bind_addr: SocketAddr,
    // Base URL of the backend API that serves `/api/*`. No trailing slash.
    pub backend_url: Option<String>,
    pub backend_timeout: Duration,
    // Directory served for static assets and the fallback.
    pub static_dir: PathBuf,
    pub default_theme: Theme,
    // Extra allow-listed prefixes; the protected and login roots are implicit.
    pub allowed_prefixes: Vec<String>,
    pub static_rewrites: Vec<StaticRewrite>,
}

/// Env
///
/// Runtime context. Controls log format and which variables are mandatory.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Env {
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Local => "local",
            Env::Production => "production",
        }
    }
}

/// StaticRewrite
///
/// Serves the file at `destination` (relative to the static directory) when
/// `source` is requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticRewrite {
    pub source: String,
    pub destination: String,
}

impl StaticRewrite {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

fn default_rewrites() -> Vec<StaticRewrite> {
    vec![StaticRewrite::new(
        "/docs/assets/logo-agrovet.png",
        "/img/agrovet-market.png",
    )]
}

impl Default for AppConfig {
    /// Non-panicking configuration for tests: local mode, no backend.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            backend_url: None,
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            default_theme: Theme::System,
            allowed_prefixes: parse_prefixes(DEFAULT_ALLOWED_PREFIXES)
                .unwrap_or_default(),
            static_rewrites: default_rewrites(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from environment variables. Local mode fills in
    /// defaults; production refuses to start without `BACKEND_URL`.
    ///
    /// # Errors
    /// Returns `ConfigError` for a missing mandatory variable or a value that
    /// does not parse. The caller is expected to abort startup.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let backend_url = match (env, non_empty_var("BACKEND_URL")) {
            (_, Some(url)) => Some(parse_backend_url(&url)?),
            (Env::Production, None) => return Err(ConfigError::Missing("BACKEND_URL")),
            (Env::Local, None) => None,
        };

        let bind_addr = non_empty_var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind_addr.clone(),
            reason: "expected host:port",
        })?;

        let backend_timeout = match non_empty_var("BACKEND_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "BACKEND_TIMEOUT_SECS",
                        value: raw,
                        reason: "expected a positive number of seconds",
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
        };

        let default_theme = match non_empty_var("DEFAULT_THEME") {
            Some(raw) => raw.parse::<Theme>().map_err(|_| ConfigError::Invalid {
                var: "DEFAULT_THEME",
                value: raw.clone(),
                reason: "expected light, dark or system",
            })?,
            None => Theme::System,
        };

        let allowed_prefixes = parse_prefixes(
            &non_empty_var("GATE_ALLOWED_PREFIXES")
                .unwrap_or_else(|| DEFAULT_ALLOWED_PREFIXES.to_string()),
        )?;

        Ok(Self {
            env,
            bind_addr,
            backend_url,
            backend_timeout,
            static_dir: non_empty_var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            default_theme,
            allowed_prefixes,
            static_rewrites: default_rewrites(),
        })
    }

    /// The route policy this configuration describes.
    pub fn gate_policy(&self) -> GatePolicy {
        GatePolicy::with_allowed_prefixes(self.allowed_prefixes.iter().cloned())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_backend_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::Invalid {
            var: "BACKEND_URL",
            value: raw.to_string(),
            reason: "expected an http:// or https:// URL",
        })
    }
}

/// Splits a comma-separated prefix list. Every entry must be an absolute path.
pub fn parse_prefixes(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            if entry.starts_with('/') {
                Ok(entry.to_string())
            } else {
                Err(ConfigError::Invalid {
                    var: "GATE_ALLOWED_PREFIXES",
                    value: entry.to_string(),
                    reason: "prefixes must start with '/'",
                })
            }
        })
        .collect()
}
