//! Error types for Web API calls

/// Errors from authenticated Web API requests.
///
/// Nothing here is retried internally. `RateLimited` carries the server's
/// requested delay so the caller can decide whether and when to retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no access token available; log in first")]
    NoAccessToken,

    #[error("rate limited by Spotify (retry after {})", display_retry(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

fn display_retry(secs: &Option<u64>) -> String {
    match secs {
        Some(s) => format!("{s}s"),
        None => "an unspecified delay".to_string(),
    }
}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;
