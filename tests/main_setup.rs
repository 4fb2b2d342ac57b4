use agv_edge::{
    AppConfig,
    config::{Env, parse_prefixes},
    error::ConfigError,
    pages::Theme,
};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: [&str; 7] = [
    "APP_ENV",
    "BACKEND_URL",
    "BACKEND_TIMEOUT_SECS",
    "BIND_ADDR",
    "DEFAULT_THEME",
    "GATE_ALLOWED_PREFIXES",
    "STATIC_DIR",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly the given variables set (all other config
/// variables cleared), then restores the previous environment.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load).unwrap();

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.backend_url, None);
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(config.backend_timeout, Duration::from_secs(30));
    assert_eq!(config.static_dir.to_str(), Some("public"));
    assert_eq!(config.default_theme, Theme::System);
    assert_eq!(config.allowed_prefixes, ["/letters", "/login"]);
}

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(&[("APP_ENV", "production")], AppConfig::load);

    assert!(matches!(result, Err(ConfigError::Missing("BACKEND_URL"))));
}

#[test]
#[serial]
fn test_app_config_production_with_backend() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("BACKEND_URL", "https://finanzas-api.internal:5000/"),
            ("BACKEND_TIMEOUT_SECS", "12"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DEFAULT_THEME", "Dark"),
            ("GATE_ALLOWED_PREFIXES", "/letters, /login, /help"),
        ],
        AppConfig::load,
    )
    .unwrap();

    assert_eq!(config.env, Env::Production);
    // Trailing slash removed so request paths can be appended directly.
    assert_eq!(
        config.backend_url.as_deref(),
        Some("https://finanzas-api.internal:5000")
    );
    assert_eq!(config.backend_timeout, Duration::from_secs(12));
    assert_eq!(config.bind_addr.port(), 8080);
    assert_eq!(config.default_theme, Theme::Dark);
    assert_eq!(
        config.gate_policy().allowed_prefixes(),
        ["/letters", "/login", "/help"]
    );
}

#[test]
#[serial]
fn test_app_config_rejects_invalid_values() {
    let cases: [(&str, &str); 4] = [
        ("BACKEND_URL", "finanzas-api:5000"),
        ("BACKEND_TIMEOUT_SECS", "0"),
        ("DEFAULT_THEME", "sepia"),
        ("GATE_ALLOWED_PREFIXES", "/letters,help"),
    ];

    for (var, value) in cases {
        let result = run_with_env(&[(var, value)], AppConfig::load);
        match result {
            Err(ConfigError::Invalid { var: reported, .. }) => assert_eq!(reported, var),
            other => panic!("expected Invalid for {var}={value}, got {other:?}"),
        }
    }
}

#[test]
fn test_parse_prefixes_skips_blank_entries() {
    let prefixes = parse_prefixes(" /letters ,, /login ,").unwrap();

    assert_eq!(prefixes, ["/letters", "/login"]);
}
