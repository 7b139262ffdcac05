//! Token endpoint calls: authorization-code exchange and refresh
//!
//! Both POST a form body to `{auth_base}/api/token`. This is a public PKCE
//! client, so the verifier stands in for a client secret and no
//! `Authorization` header is sent.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::pkce::CodeVerifier;

/// Token endpoint response for both grants.
///
/// Spotify omits `refresh_token` on some refreshes; the defaults mirror
/// what the token endpoint documents when a field is absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Seconds until the access token expires (delta, not absolute)
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> u64 {
    3600
}

/// Exchange an authorization code for tokens.
///
/// `redirect_uri` must be byte-identical to the one in the authorization
/// request or Spotify answers `invalid_grant`.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &AuthConfig,
    code: &str,
    redirect_uri: &str,
    verifier: &CodeVerifier,
) -> Result<TokenResponse> {
    debug!(redirect_uri, "exchanging authorization code");
    let response = client
        .post(config.token_endpoint())
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", config.client_id.as_str()),
            ("code_verifier", verifier.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "token exchange rejected");
        return Err(Error::TokenExchangeFailed {
            status: status.as_u16(),
        });
    }

    parse_token_response(response, config).await
}

/// Obtain a new access token with a refresh token.
///
/// Independent of any login attempt; works on a session that never ran
/// `start_login`.
pub async fn refresh_token(
    client: &reqwest::Client,
    config: &AuthConfig,
    refresh: &str,
) -> Result<TokenResponse> {
    let response = client
        .post(config.token_endpoint())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh),
            ("client_id", config.client_id.as_str()),
        ])
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "token refresh rejected");
        return Err(Error::RefreshFailed {
            status: status.as_u16(),
        });
    }

    parse_token_response(response, config).await
}

async fn parse_token_response(
    response: reqwest::Response,
    config: &AuthConfig,
) -> Result<TokenResponse> {
    let mut token = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::InvalidResponse(e.to_string()))?;
    if token.scope.is_empty() {
        token.scope = config.scope_string();
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> AuthConfig {
        AuthConfig {
            auth_base_url: server.uri(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn token_response_applies_defaults() {
        let json = r#"{"access_token":"BQ-abc"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        assert!(token.refresh_token.is_none());
        assert!(token.scope.is_empty());
    }

    #[test]
    fn token_response_reads_full_payload() {
        let json = r#"{"access_token":"BQ-abc","token_type":"Bearer","expires_in":1800,"refresh_token":"AQ-def","scope":"user-read-email"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.expires_in, 1800);
        assert_eq!(token.refresh_token.as_deref(), Some("AQ-def"));
        assert_eq!(token.scope, "user-read-email");
    }

    #[tokio::test]
    async fn exchange_posts_pkce_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=AQB-code"))
            .and(body_string_contains("code_verifier=the-verifier"))
            .and(body_string_contains(
                "redirect_uri=playgroundapp%3A%2F%2Fspotify-auth",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "BQ-new",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "AQ-refresh"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let token = exchange_code(
            &reqwest::Client::new(),
            &config,
            "AQB-code",
            "playgroundapp://spotify-auth",
            &CodeVerifier::from("the-verifier"),
        )
        .await
        .unwrap();

        assert_eq!(token.access_token, "BQ-new");
        assert_eq!(token.refresh_token.as_deref(), Some("AQ-refresh"));
        assert_eq!(token.scope, config.scope_string());
    }

    #[tokio::test]
    async fn exchange_non_success_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let err = exchange_code(
            &reqwest::Client::new(),
            &config_for(&server),
            "stale",
            "playgroundapp://spotify-auth",
            &CodeVerifier::from("v"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::TokenExchangeFailed { status: 400 }));
    }

    #[tokio::test]
    async fn refresh_uses_refresh_grant_without_verifier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=AQ-old"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "BQ-refreshed",
                "expires_in": 3600,
                "scope": "user-read-private"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = refresh_token(&reqwest::Client::new(), &config_for(&server), "AQ-old")
            .await
            .unwrap();
        assert_eq!(token.access_token, "BQ-refreshed");

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(!body.contains("code_verifier"));
    }

    #[tokio::test]
    async fn refresh_non_success_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = refresh_token(&reqwest::Client::new(), &config_for(&server), "AQ-revoked")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RefreshFailed { status: 401 }));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        let config = AuthConfig {
            auth_base_url: "http://127.0.0.1:1".into(),
            ..AuthConfig::default()
        };
        let err = refresh_token(&reqwest::Client::new(), &config, "AQ")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
