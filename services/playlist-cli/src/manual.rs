//! Production redirect: the custom-scheme URL is pasted back on stdin
//!
//! The browser cannot hand `playgroundapp://` redirects to a terminal, so
//! the user copies the final URL (or just its `code`) from the address bar.

use std::future::Future;
use std::pin::Pin;

use reqwest::Url;
use spotify_auth::{AuthorizationPrompt, AuthorizationRequest, AuthorizationResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Interpret one pasted line.
///
/// An empty line cancels. Anything that parses as a URL is read as a
/// redirect; otherwise the line is taken as a bare authorization code, which
/// carries no `state` to check.
pub fn parse_pasted(line: &str) -> AuthorizationResult {
    let line = line.trim();
    if line.is_empty() {
        return AuthorizationResult::Cancelled;
    }
    match Url::parse(line) {
        Ok(url) => AuthorizationResult::from_redirect(&url),
        Err(_) if line.chars().any(char::is_whitespace) => AuthorizationResult::Error {
            reason: "pasted value is neither a redirect URL nor a code".into(),
        },
        Err(_) => AuthorizationResult::Success {
            code: line.to_string(),
            state: None,
        },
    }
}

pub struct ManualPrompt<R> {
    redirect_uri: String,
    input: Mutex<R>,
}

impl ManualPrompt<BufReader<Stdin>> {
    pub fn stdin(redirect_uri: String) -> Self {
        Self::new(redirect_uri, BufReader::new(tokio::io::stdin()))
    }
}

impl<R> ManualPrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(redirect_uri: String, input: R) -> Self {
        Self {
            redirect_uri,
            input: Mutex::new(input),
        }
    }

    async fn read_redirect(&self, url: &Url) -> AuthorizationResult {
        eprintln!(
            "Open this URL in your browser to log in to Spotify:\n\n  {url}\n\n\
             After approving, paste the {} URL you were redirected to\n\
             (or only its code) and press Enter. An empty line cancels.",
            self.redirect_uri
        );

        let mut line = String::new();
        let mut input = self.input.lock().await;
        match input.read_line(&mut line).await {
            // EOF: nothing will ever be pasted
            Ok(0) => AuthorizationResult::Cancelled,
            Ok(_) => parse_pasted(&line),
            Err(e) => AuthorizationResult::Error {
                reason: format!("failed to read redirect from stdin: {e}"),
            },
        }
    }
}

impl<R> AuthorizationPrompt for ManualPrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn redirect_uri(&self) -> String {
        self.redirect_uri.clone()
    }

    fn authorize<'a>(
        &'a self,
        _request: &'a AuthorizationRequest,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = AuthorizationResult> + Send + 'a>> {
        Box::pin(self.read_redirect(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotify_auth::{AuthConfig, compute_challenge, generate_verifier};

    const REDIRECT: &str = "playgroundapp://spotify-auth";

    async fn authorize_with(input: &'static str) -> AuthorizationResult {
        let prompt = ManualPrompt::new(REDIRECT.to_string(), input.as_bytes());
        let request = AuthorizationRequest::new(
            &AuthConfig::default(),
            prompt.redirect_uri(),
            compute_challenge(&generate_verifier()),
        );
        let url = Url::parse("https://accounts.spotify.com/authorize").unwrap();
        prompt.authorize(&request, &url).await
    }

    #[test]
    fn pasted_redirect_url() {
        assert_eq!(
            parse_pasted("playgroundapp://spotify-auth?code=AQB9&state=abc\n"),
            AuthorizationResult::Success {
                code: "AQB9".into(),
                state: Some("abc".into())
            }
        );
    }

    #[test]
    fn pasted_denial() {
        assert_eq!(
            parse_pasted("playgroundapp://spotify-auth?error=access_denied"),
            AuthorizationResult::Cancelled
        );
    }

    #[test]
    fn pasted_bare_code() {
        assert_eq!(
            parse_pasted("  AQB-bare_code  "),
            AuthorizationResult::Success {
                code: "AQB-bare_code".into(),
                state: None
            }
        );
    }

    #[test]
    fn empty_line_cancels() {
        assert_eq!(parse_pasted("\n"), AuthorizationResult::Cancelled);
    }

    #[test]
    fn prose_is_rejected() {
        assert!(matches!(
            parse_pasted("I could not log in"),
            AuthorizationResult::Error { .. }
        ));
    }

    #[tokio::test]
    async fn reads_one_line_from_input() {
        let result = authorize_with("playgroundapp://spotify-auth?code=C1&state=s\nignored\n").await;
        assert_eq!(
            result,
            AuthorizationResult::Success {
                code: "C1".into(),
                state: Some("s".into())
            }
        );
    }

    #[tokio::test]
    async fn closed_input_cancels() {
        assert_eq!(authorize_with("").await, AuthorizationResult::Cancelled);
    }

    #[test]
    fn redirect_uri_is_passed_through() {
        let prompt = ManualPrompt::new(REDIRECT.to_string(), "".as_bytes());
        assert_eq!(prompt.redirect_uri(), REDIRECT);
    }
}
