//! Authorization request built once per login attempt

use reqwest::Url;

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::pkce::CodeChallenge;

/// Everything the browser step needs. Rebuilt for every login attempt so a
/// challenge, state or redirect URI is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub client_id: String,
    pub scopes: Vec<String>,
    pub redirect_uri: String,
    pub code_challenge: CodeChallenge,
    /// Opaque CSRF value echoed back on the redirect
    pub state: String,
    pub show_dialog: bool,
}

impl AuthorizationRequest {
    pub fn new(
        config: &AuthConfig,
        redirect_uri: String,
        code_challenge: CodeChallenge,
    ) -> Self {
        Self {
            client_id: config.client_id.clone(),
            scopes: config.scopes.clone(),
            redirect_uri,
            code_challenge,
            state: uuid::Uuid::new_v4().simple().to_string(),
            show_dialog: config.show_dialog,
        }
    }

    /// Build the browser URL for `authorize_endpoint` with every parameter
    /// percent-encoded.
    pub fn authorization_url(&self, authorize_endpoint: &str) -> Result<Url> {
        let scope = self.scopes.join(" ");
        let mut params: Vec<(&str, &str)> = vec![
            ("response_type", "code"),
            ("client_id", &self.client_id),
            ("scope", &scope),
            ("code_challenge", self.code_challenge.as_str()),
            ("code_challenge_method", "S256"),
            ("redirect_uri", &self.redirect_uri),
            ("state", &self.state),
        ];
        if self.show_dialog {
            params.push(("show_dialog", "true"));
        }
        Url::parse_with_params(authorize_endpoint, &params)
            .map_err(|e| Error::InvalidUrl(format!("{authorize_endpoint}: {e}")))
    }
}
