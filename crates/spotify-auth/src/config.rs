//! Client configuration for the accounts service
//!
//! Defaults come from `constants`; tests and the CLI override the base URL
//! and client ID.

use crate::constants::{AUTH_BASE_URL, AUTHORIZE_PATH, SCOPES, SPOTIFY_CLIENT_ID, TOKEN_PATH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub client_id: String,
    pub scopes: Vec<String>,
    /// Accounts service base, without trailing slash
    pub auth_base_url: String,
    /// Sends `show_dialog=true` so Spotify re-prompts even for a known user
    pub show_dialog: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: SPOTIFY_CLIENT_ID.to_string(),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            auth_base_url: AUTH_BASE_URL.to_string(),
            show_dialog: true,
        }
    }
}

impl AuthConfig {
    pub fn authorize_endpoint(&self) -> String {
        format!("{}{AUTHORIZE_PATH}", self.auth_base_url.trim_end_matches('/'))
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}{TOKEN_PATH}", self.auth_base_url.trim_end_matches('/'))
    }

    /// Space-joined scope list, as sent in `scope=`.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}
