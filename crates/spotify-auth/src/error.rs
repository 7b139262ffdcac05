//! Error types for the authorization flow and token endpoint

/// Errors from login, code exchange and token refresh.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("an authorization request is already in progress")]
    AlreadyInProgress,

    #[error("authorization was cancelled by the user")]
    Cancelled,

    #[error("authorization failed: {reason}")]
    AuthorizationFailed { reason: String },

    #[error("authorization response state does not match the request")]
    StateMismatch,

    #[error("no code verifier recorded; start a login first")]
    CodeVerifierMissing,

    #[error("no redirect URI recorded; start a login first")]
    RedirectUriMissing,

    #[error("token exchange failed with HTTP {status}")]
    TokenExchangeFailed { status: u16 },

    #[error("token refresh failed with HTTP {status}")]
    RefreshFailed { status: u16 },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("invalid authorization URL: {0}")]
    InvalidUrl(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_include_code() {
        assert_eq!(
            Error::TokenExchangeFailed { status: 400 }.to_string(),
            "token exchange failed with HTTP 400"
        );
        assert_eq!(
            Error::RefreshFailed { status: 401 }.to_string(),
            "token refresh failed with HTTP 401"
        );
    }

    #[test]
    fn authorization_failure_carries_reason() {
        let err = Error::AuthorizationFailed {
            reason: "invalid_scope".into(),
        };
        assert!(err.to_string().contains("invalid_scope"));
    }
}
