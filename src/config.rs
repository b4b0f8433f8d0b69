//! Dashboard configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default so a bare `cargo run` serves a local dashboard
//! against a local backend. Only values that would make the process
//! unusable (unparseable port, malformed backend URL) are hard errors;
//! everything else falls back to its default when missing or unparseable.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use crate::api::ApiTimeouts;
use crate::guard::edge::EdgeGuard;
use crate::guard::routes::{DEFAULT_LANDING_PATH, DEFAULT_LOGIN_PATH, DEFAULT_PROTECTED_PATHS, RouteTable};
use crate::session::auth::SessionConfig;
use crate::settings::refetch::RefetchPolicy;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_DASHBOARD_DIR: &str = "./dist";
pub const DEFAULT_PUBLIC_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAIN_COLOR: &str = "#3B82F6";
pub const DEFAULT_AUTH_CACHE_MAX_AGE_SECS: u64 = 30;
pub const DEFAULT_SETTINGS_STALE_SECS: u64 = 5;
pub const DEFAULT_SNAPSHOT_MAX_AGE_SECS: u64 = 12 * 60 * 60;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_API_CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("invalid BACKEND_URL {value:?}: {reason}")]
    BackendUrl { value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub port: u16,
    pub backend_url: String,
    pub dashboard_dir: PathBuf,
    pub public_origin: String,
    pub cookie_secure: bool,
    pub login_path: String,
    pub landing_path: String,
    pub protected_paths: Vec<String>,
    pub auth_cache_max_age_secs: u64,
    pub settings_stale_secs: u64,
    pub snapshot_max_age_secs: u64,
    pub timeouts: ApiTimeouts,
    pub default_main_color: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            dashboard_dir: PathBuf::from(DEFAULT_DASHBOARD_DIR),
            public_origin: DEFAULT_PUBLIC_ORIGIN.to_owned(),
            cookie_secure: false,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            landing_path: DEFAULT_LANDING_PATH.to_owned(),
            protected_paths: DEFAULT_PROTECTED_PATHS.iter().map(|p| (*p).to_owned()).collect(),
            auth_cache_max_age_secs: DEFAULT_AUTH_CACHE_MAX_AGE_SECS,
            settings_stale_secs: DEFAULT_SETTINGS_STALE_SECS,
            snapshot_max_age_secs: DEFAULT_SNAPSHOT_MAX_AGE_SECS,
            timeouts: ApiTimeouts {
                request_secs: DEFAULT_API_TIMEOUT_SECS,
                connect_secs: DEFAULT_API_CONNECT_TIMEOUT_SECS,
            },
            default_main_color: DEFAULT_MAIN_COLOR.to_owned(),
        }
    }
}

impl DashboardConfig {
    /// Build the configuration from environment variables.
    ///
    /// - `PORT`: listen port (default 3000)
    /// - `BACKEND_URL`: base URL of the REST backend
    /// - `DASHBOARD_DIR`: directory holding the built dashboard assets
    /// - `PUBLIC_ORIGIN`: origin the dashboard is served from
    /// - `COOKIE_SECURE`: mark the auth flag cookie `Secure`; inferred from
    ///   an `https://` `PUBLIC_ORIGIN` when unset
    /// - `LOGIN_PATH`, `LANDING_PATH`, `PROTECTED_PATHS` (comma-separated)
    /// - `AUTH_CACHE_MAX_AGE_SECS`, `SETTINGS_STALE_SECS`, `SNAPSHOT_MAX_AGE_SECS`
    /// - `API_TIMEOUT_SECS`, `API_CONNECT_TIMEOUT_SECS`
    /// - `DEFAULT_MAIN_COLOR`: accent color used before settings load
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port, or if
    /// `BACKEND_URL` is not an absolute http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            Err(_) => defaults.port,
        };

        let backend_url = std::env::var("BACKEND_URL").unwrap_or(defaults.backend_url);
        let backend_url = validate_backend_url(&backend_url)?;

        let public_origin = std::env::var("PUBLIC_ORIGIN")
            .map(|v| v.trim().trim_end_matches('/').to_owned())
            .unwrap_or(defaults.public_origin);
        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| public_origin.starts_with("https://"));

        let protected_paths = std::env::var("PROTECTED_PATHS")
            .ok()
            .map(|raw| split_paths(&raw))
            .filter(|paths| !paths.is_empty())
            .unwrap_or(defaults.protected_paths);

        Ok(Self {
            port,
            backend_url,
            dashboard_dir: std::env::var("DASHBOARD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.dashboard_dir),
            public_origin,
            cookie_secure,
            login_path: std::env::var("LOGIN_PATH").unwrap_or(defaults.login_path),
            landing_path: std::env::var("LANDING_PATH").unwrap_or(defaults.landing_path),
            protected_paths,
            auth_cache_max_age_secs: env_parse("AUTH_CACHE_MAX_AGE_SECS", DEFAULT_AUTH_CACHE_MAX_AGE_SECS),
            settings_stale_secs: env_parse("SETTINGS_STALE_SECS", DEFAULT_SETTINGS_STALE_SECS),
            snapshot_max_age_secs: env_parse("SNAPSHOT_MAX_AGE_SECS", DEFAULT_SNAPSHOT_MAX_AGE_SECS),
            timeouts: ApiTimeouts {
                request_secs: env_parse("API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS),
                connect_secs: env_parse("API_CONNECT_TIMEOUT_SECS", DEFAULT_API_CONNECT_TIMEOUT_SECS),
            },
            default_main_color: std::env::var("DEFAULT_MAIN_COLOR").unwrap_or(defaults.default_main_color),
        })
    }

    #[must_use]
    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(&self.login_path, &self.landing_path, &self.protected_paths)
    }

    #[must_use]
    pub fn edge_guard(&self) -> EdgeGuard {
        EdgeGuard::new(self.route_table(), self.auth_cache_max_age_secs)
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            login_path: self.route_table().login_path().to_owned(),
            snapshot_max_age: Duration::from_secs(self.snapshot_max_age_secs),
        }
    }

    #[must_use]
    pub fn refetch_policy(&self) -> RefetchPolicy {
        RefetchPolicy::new(Duration::from_secs(self.settings_stale_secs), self.route_table().login_path())
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn split_paths(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

fn validate_backend_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|e| ConfigError::BackendUrl {
        value: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::BackendUrl { value: raw.to_owned(), reason: format!("unsupported scheme {}", url.scheme()) });
    }
    Ok(trimmed.to_owned())
}
