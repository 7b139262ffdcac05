//! Classification of non-success Web API responses
//!
//! 429 becomes `RateLimited` with the `Retry-After` delay; everything else
//! becomes `Api` with the message from Spotify's structured error body.

use reqwest::StatusCode;

use crate::error::Error;
use crate::models::ErrorBody;

/// Parse a `Retry-After` header value.
///
/// Spotify sends delta-seconds. HTTP-date values and garbage yield `None`
/// rather than a guessed delay.
pub fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

/// Map an error status, `Retry-After` header and body to an `Error`.
///
/// Bodies that are not `{"error":{"status":..,"message":..}}` fall back to
/// the HTTP status and its reason phrase.
pub fn classify_response(status: StatusCode, retry_after: Option<&str>, body: &str) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Error::RateLimited {
            retry_after_secs: retry_after.and_then(parse_retry_after),
        };
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => Error::Api {
            status: parsed.error.status,
            message: parsed.error.message,
        },
        Err(_) => Error::Api {
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_seconds() {
        assert_eq!(parse_retry_after("30"), Some(30));
        assert_eq!(parse_retry_after(" 5 "), Some(5));
    }

    #[test]
    fn retry_after_rejects_non_numeric() {
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(parse_retry_after(""), None);
        assert_eq!(parse_retry_after("-1"), None);
    }

    #[test]
    fn too_many_requests_is_rate_limited() {
        let err = classify_response(StatusCode::TOO_MANY_REQUESTS, Some("12"), "");
        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_secs: Some(12)
            }
        ));
    }

    #[test]
    fn too_many_requests_without_header() {
        let err = classify_response(StatusCode::TOO_MANY_REQUESTS, None, "");
        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_secs: None
            }
        ));
    }

    #[test]
    fn structured_body_supplies_status_and_message() {
        let body = r#"{"error":{"status":404,"message":"Not found"}}"#;
        match classify_response(StatusCode::NOT_FOUND, None, body) {
            Error::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn expired_token_body() {
        let body = r#"{"error":{"status":401,"message":"The access token expired"}}"#;
        match classify_response(StatusCode::UNAUTHORIZED, None, body) {
            Error::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "The access token expired");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn unstructured_body_falls_back_to_reason_phrase() {
        match classify_response(StatusCode::BAD_GATEWAY, None, "<html>upstream</html>") {
            Error::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
