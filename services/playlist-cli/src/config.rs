//! Configuration types and loading
//!
//! Config precedence: `--config` > `CONFIG_PATH` env > `spotify-playlists.toml`.
//! Every section is optional; a missing default file means "all defaults".
//! `SPOTIFY_CLIENT_ID` overrides `[spotify] client_id`.

use serde::Deserialize;
use spotify_api::ApiConfig;
use spotify_auth::{
    API_BASE_URL, APP_REDIRECT_PATH, APP_SCHEME, AUTH_BASE_URL, AuthConfig, RedirectTarget,
    SCOPES, SPOTIFY_CLIENT_ID,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "spotify-playlists.toml";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spotify: SpotifyConfig,
    pub redirect: RedirectConfig,
    pub http: HttpConfig,
    pub fetch: FetchConfig,
    pub telemetry: TelemetryConfig,
}

/// Client registration and endpoints
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub scopes: Vec<String>,
    pub api_base_url: String,
    pub auth_base_url: String,
    pub show_dialog: bool,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: SPOTIFY_CLIENT_ID.to_string(),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            api_base_url: API_BASE_URL.to_string(),
            auth_base_url: AUTH_BASE_URL.to_string(),
            show_dialog: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMode {
    /// Loopback listener on `listen_addr`
    #[default]
    Development,
    /// Custom scheme; the redirect URL is pasted back on stdin
    Production,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    pub mode: RedirectMode,
    pub listen_addr: SocketAddr,
    pub scheme: String,
    pub path: String,
    /// How long the loopback listener waits for the browser
    pub timeout_secs: u64,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            mode: RedirectMode::Development,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 8888)),
            scheme: APP_SCHEME.to_string(),
            path: APP_REDIRECT_PATH.to_string(),
            timeout_secs: default_redirect_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Pause between page requests
    pub page_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { page_delay_ms: 100 }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Print the Prometheus exposition to stderr before exiting
    pub print_metrics: bool,
}

fn default_timeout() -> u64 {
    30
}

fn default_redirect_timeout() -> u64 {
    300
}

fn validate_url(field: &str, url: &str) -> common::Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(common::Error::Config(format!(
            "{field} must start with http:// or https://, got: {url}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse, overlay env and validate.
    pub fn parse(contents: &str) -> common::Result<Self> {
        let mut config: Config = toml::from_str(contents)?;

        if let Ok(client_id) = std::env::var("SPOTIFY_CLIENT_ID") {
            let client_id = client_id.trim();
            if !client_id.is_empty() {
                config.spotify.client_id = client_id.to_owned();
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if self.spotify.client_id.trim().is_empty() {
            return Err(common::Error::Config("client_id must not be empty".into()));
        }
        if self.spotify.scopes.is_empty() {
            return Err(common::Error::Config(
                "scopes must list at least one scope".into(),
            ));
        }
        validate_url("api_base_url", &self.spotify.api_base_url)?;
        validate_url("auth_base_url", &self.spotify.auth_base_url)?;

        if self.http.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }
        if self.redirect.timeout_secs == 0 {
            return Err(common::Error::Config(
                "redirect timeout_secs must be greater than 0".into(),
            ));
        }
        if self.redirect.mode == RedirectMode::Production && self.redirect.scheme.is_empty() {
            return Err(common::Error::Config(
                "redirect scheme must not be empty in production mode".into(),
            ));
        }
        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    ///
    /// The flag is `true` when the path was given explicitly and therefore
    /// must exist.
    pub fn resolve_path(cli_path: Option<&str>) -> (PathBuf, bool) {
        if let Some(p) = cli_path {
            return (PathBuf::from(p), true);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return (PathBuf::from(p), true);
        }
        (PathBuf::from(DEFAULT_CONFIG_FILE), false)
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            client_id: self.spotify.client_id.clone(),
            scopes: self.spotify.scopes.clone(),
            auth_base_url: self.spotify.auth_base_url.clone(),
            show_dialog: self.spotify.show_dialog,
        }
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.spotify.api_base_url.clone(),
            page_delay: Duration::from_millis(self.fetch.page_delay_ms),
        }
    }

    pub fn redirect_target(&self) -> RedirectTarget {
        match self.redirect.mode {
            RedirectMode::Development => RedirectTarget::Loopback {
                addr: self.redirect.listen_addr,
            },
            RedirectMode::Production => RedirectTarget::CustomScheme {
                scheme: self.redirect.scheme.clone(),
                path: self.redirect.path.clone(),
            },
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn redirect_timeout(&self) -> Duration {
        Duration::from_secs(self.redirect.timeout_secs)
    }
}
