//! Boundary to the browser / deep-link step of the authorization flow
//!
//! The session never talks to a browser itself. It hands an
//! `AuthorizationRequest` to an `AuthorizationPrompt` and waits for the
//! prompt to report what came back on the redirect URI.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;

use reqwest::Url;

use crate::constants::{APP_REDIRECT_PATH, APP_SCHEME, LOOPBACK_CALLBACK_PATH};
use crate::request::AuthorizationRequest;

/// Outcome of the redirect step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    /// Redirect carried `code` (and the echoed `state`, when present).
    Success { code: String, state: Option<String> },
    /// User closed the dialog or denied access.
    Cancelled,
    /// Redirect carried an `error` other than a denial, or the prompt broke.
    Error { reason: String },
}

impl AuthorizationResult {
    /// Interpret the query string of a redirect URL.
    ///
    /// `error=access_denied` is Spotify's signal for the user pressing
    /// "Cancel" and maps to `Cancelled`; any other `error` is an `Error`.
    pub fn from_redirect(url: &Url) -> Self {
        let mut code = None;
        let mut state = None;
        let mut error = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => error = Some(value.into_owned()),
                _ => {}
            }
        }
        match (code, error) {
            (_, Some(e)) if e == "access_denied" => AuthorizationResult::Cancelled,
            (_, Some(e)) => AuthorizationResult::Error { reason: e },
            (Some(code), None) if !code.is_empty() => AuthorizationResult::Success { code, state },
            _ => AuthorizationResult::Error {
                reason: "redirect carried neither code nor error".into(),
            },
        }
    }
}

/// Where the provider sends the browser after consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Development builds: a listener on the loopback interface.
    Loopback { addr: SocketAddr },
    /// Production builds: a custom URL scheme owned by the app.
    CustomScheme { scheme: String, path: String },
}

impl Default for RedirectTarget {
    fn default() -> Self {
        RedirectTarget::CustomScheme {
            scheme: APP_SCHEME.to_string(),
            path: APP_REDIRECT_PATH.to_string(),
        }
    }
}

impl RedirectTarget {
    /// Render the redirect URI. The session calls this exactly once per
    /// attempt and reuses the result for the code exchange.
    pub fn uri(&self) -> String {
        match self {
            RedirectTarget::Loopback { addr } => {
                format!("http://{addr}{LOOPBACK_CALLBACK_PATH}")
            }
            RedirectTarget::CustomScheme { scheme, path } => {
                format!("{scheme}://{}", path.trim_start_matches('/'))
            }
        }
    }
}

/// Presents the authorization URL and reports the redirect outcome.
///
/// Uses `Pin<Box<dyn Future>>` so sessions can hold `&dyn AuthorizationPrompt`.
pub trait AuthorizationPrompt: Send + Sync {
    /// Redirect URI registered for this environment.
    fn redirect_uri(&self) -> String;

    /// Show `url` to the user and resolve once the redirect arrives or the
    /// user gives up.
    fn authorize<'a>(
        &'a self,
        request: &'a AuthorizationRequest,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = AuthorizationResult> + Send + 'a>>;
}
