use std::{fmt, str::FromStr};

use axum::http::HeaderMap;

use crate::{auth::cookie_value, config::AppConfig};

/// Name of the cookie the frontend writes when the user toggles the theme.
pub const THEME_COOKIE_NAME: &str = "theme";

/// Theme
///
/// The light/dark preference. `System` defers to the browser's
/// `prefers-color-scheme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(()),
        }
    }
}

/// UiContext
///
/// Rendering context created once at startup and handed to every page through
/// the application state. Holds the defaults; per-request preferences are
/// layered on top by `resolve_theme`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiContext {
    pub app_name: String,
    pub default_theme: Theme,
}

impl Default for UiContext {
    fn default() -> Self {
        Self {
            app_name: "Finanzas AGV".to_string(),
            default_theme: Theme::System,
        }
    }
}

impl UiContext {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_theme: config.default_theme,
            ..Self::default()
        }
    }

    /// The persisted `theme` cookie wins when it holds a known value;
    /// anything else falls back to the configured default.
    pub fn resolve_theme(&self, headers: &HeaderMap) -> Theme {
        cookie_value(headers, THEME_COOKIE_NAME)
            .and_then(|value| value.parse().ok())
            .unwrap_or(self.default_theme)
    }
}

/// The page shells served by the edge. Data is fetched client-side from `/api`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Letters,
}

impl Page {
    fn slug(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Login => "login",
            Page::Letters => "letters",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Page::Home => "Inicio",
            Page::Login => "Iniciar sesión",
            Page::Letters => "Letras",
        }
    }
}

/// render_shell
///
/// Produces the HTML document for a page. The application name comes from
/// configuration and is escaped before being written into the markup.
pub fn render_shell(ui: &UiContext, theme: Theme, page: Page) -> String {
    let title = format!("{} | {}", page.title(), ui.app_name);
    let title = html_escape::encode_text(&title);

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"es\" data-theme=\"{theme}\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
            "<title>{title}</title>\n",
            "<link rel=\"stylesheet\" href=\"/assets/app.css\">\n",
            "</head>\n",
            "<body>\n",
            "<div id=\"app\" data-page=\"{slug}\"></div>\n",
            "<script type=\"module\" src=\"/assets/app.js\"></script>\n",
            "</body>\n",
            "</html>\n",
        ),
        theme = theme,
        title = title,
        slug = page.slug(),
    )
}
