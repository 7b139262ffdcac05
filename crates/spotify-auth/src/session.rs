//! Authorization session: one login attempt at a time
//!
//! Phases:
//! - Idle → RequestBuilt (verifier, challenge, state and redirect URI fixed)
//! - RequestBuilt → AwaitingRedirect (prompt showing the consent page)
//! - AwaitingRedirect → Exchanging (code received, token endpoint call)
//! - Exchanging → Authenticated (access token written to the token store)
//! - AwaitingRedirect → Idle on cancellation; any step → Failed on error
//!
//! The state lives behind a `std::sync::Mutex` that is only held between
//! awaits. A second `start_login` while an attempt is outstanding is
//! rejected with `AlreadyInProgress`; it is never queued or interleaved.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::pkce::{CodeVerifier, compute_challenge, generate_verifier};
use crate::prompt::{AuthorizationPrompt, AuthorizationResult};
use crate::request::AuthorizationRequest;
use crate::token::{self, TokenResponse};
use crate::token_store::TokenStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    RequestBuilt,
    AwaitingRedirect,
    Exchanging,
    Authenticated,
    Failed { reason: String },
}

impl SessionPhase {
    /// Status label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::RequestBuilt => "request_built",
            SessionPhase::AwaitingRedirect => "awaiting_redirect",
            SessionPhase::Exchanging => "exchanging",
            SessionPhase::Authenticated => "authenticated",
            SessionPhase::Failed { .. } => "failed",
        }
    }

    fn is_in_flight(&self) -> bool {
        matches!(
            self,
            SessionPhase::RequestBuilt | SessionPhase::AwaitingRedirect | SessionPhase::Exchanging
        )
    }
}

/// Values recorded when the request is built and reused by the exchange.
#[derive(Debug, Default)]
struct Attempt {
    request: Option<AuthorizationRequest>,
    verifier: Option<CodeVerifier>,
    redirect_uri: Option<String>,
}

#[derive(Debug)]
struct State {
    phase: SessionPhase,
    attempt: Attempt,
}

/// Drives the PKCE authorization-code flow and owns its single attempt.
///
/// Constructed by the application's composition root and shared by
/// reference; the token store it writes is the one the API client reads.
pub struct AuthSession {
    config: AuthConfig,
    http: reqwest::Client,
    tokens: Arc<TokenStore>,
    state: Mutex<State>,
}

impl AuthSession {
    pub fn new(config: AuthConfig, http: reqwest::Client, tokens: Arc<TokenStore>) -> Self {
        Self {
            config,
            http,
            tokens,
            state: Mutex::new(State {
                phase: SessionPhase::Idle,
                attempt: Attempt::default(),
            }),
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase.clone()
    }

    /// The authorization request of the current (or last) attempt.
    pub fn pending_request(&self) -> Option<AuthorizationRequest> {
        self.lock().attempt.request.clone()
    }

    /// Run one complete login: build the request, let `prompt` obtain a
    /// code, exchange it.
    ///
    /// Returns `Cancelled` when the user backs out, after which the session
    /// is Idle again.
    pub async fn start_login<P>(&self, prompt: &P) -> Result<TokenResponse>
    where
        P: AuthorizationPrompt + ?Sized,
    {
        let request = self.build_request(prompt.redirect_uri())?;
        let url = match request.authorization_url(&self.config.authorize_endpoint()) {
            Ok(url) => url,
            Err(e) => {
                self.fail(e.to_string());
                return Err(e);
            }
        };

        self.set_phase(SessionPhase::AwaitingRedirect);
        info!(redirect_uri = %request.redirect_uri, "awaiting authorization redirect");

        match prompt.authorize(&request, &url).await {
            AuthorizationResult::Success { code, state } => {
                if state.as_deref().is_some_and(|s| s != request.state) {
                    warn!("authorization redirect state mismatch");
                    self.fail("state mismatch".into());
                    return Err(Error::StateMismatch);
                }
                debug!("authorization code received");
                self.exchange_recorded(&code).await
            }
            AuthorizationResult::Cancelled => {
                info!("authorization cancelled");
                let mut state = self.lock();
                state.phase = SessionPhase::Idle;
                state.attempt = Attempt::default();
                Err(Error::Cancelled)
            }
            AuthorizationResult::Error { reason } => {
                warn!(reason = %reason, "authorization failed");
                self.fail(reason.clone());
                Err(Error::AuthorizationFailed { reason })
            }
        }
    }

    /// Redeem an authorization code with the verifier and redirect URI
    /// recorded for the current attempt.
    ///
    /// The verifier is consumed: a second exchange for the same attempt
    /// fails with `CodeVerifierMissing`. While a `start_login` is in flight
    /// the attempt belongs to it and this returns `AlreadyInProgress`.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        {
            let state = self.lock();
            if state.phase.is_in_flight() {
                warn!(phase = state.phase.label(), "exchange rejected, login in progress");
                return Err(Error::AlreadyInProgress);
            }
        }
        self.exchange_recorded(code).await
    }

    /// Exchange against the recorded attempt without the in-flight check.
    /// Only `start_login` calls this, from `AwaitingRedirect`.
    async fn exchange_recorded(&self, code: &str) -> Result<TokenResponse> {
        let (verifier, redirect_uri) = {
            let mut state = self.lock();
            if state.attempt.verifier.is_none() {
                return Err(Error::CodeVerifierMissing);
            }
            let redirect_uri = state
                .attempt
                .redirect_uri
                .clone()
                .ok_or(Error::RedirectUriMissing)?;
            let verifier = state
                .attempt
                .verifier
                .take()
                .ok_or(Error::CodeVerifierMissing)?;
            state.phase = SessionPhase::Exchanging;
            (verifier, redirect_uri)
        };

        match token::exchange_code(&self.http, &self.config, code, &redirect_uri, &verifier).await
        {
            Ok(response) => {
                self.tokens.set(response.access_token.clone());
                self.set_phase(SessionPhase::Authenticated);
                info!(
                    expires_in = response.expires_in,
                    has_refresh_token = response.refresh_token.is_some(),
                    "authorization code exchanged"
                );
                Ok(response)
            }
            Err(e) => {
                self.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Trade a refresh token for a new access token.
    ///
    /// Needs no login attempt and leaves the session phase untouched. The
    /// new access token replaces whatever the token store held.
    pub async fn refresh_token(&self, refresh: &str) -> Result<TokenResponse> {
        let response = token::refresh_token(&self.http, &self.config, refresh).await?;
        self.tokens.set(response.access_token.clone());
        info!(expires_in = response.expires_in, "access token refreshed");
        Ok(response)
    }

    /// Reject if an attempt is outstanding, otherwise replace the attempt
    /// with a fresh verifier, challenge, state and redirect URI.
    fn build_request(&self, redirect_uri: String) -> Result<AuthorizationRequest> {
        let mut state = self.lock();
        if state.phase.is_in_flight() {
            warn!(phase = state.phase.label(), "login already in progress");
            return Err(Error::AlreadyInProgress);
        }

        let verifier = generate_verifier();
        let challenge = compute_challenge(&verifier);
        let request = AuthorizationRequest::new(&self.config, redirect_uri.clone(), challenge);

        state.attempt = Attempt {
            request: Some(request.clone()),
            verifier: Some(verifier),
            redirect_uri: Some(redirect_uri),
        };
        state.phase = SessionPhase::RequestBuilt;
        debug!("authorization request built");
        Ok(request)
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.lock().phase = phase;
    }

    /// A failed attempt can never be redeemed: its verifier is dropped.
    fn fail(&self, reason: String) {
        let mut state = self.lock();
        state.attempt.verifier = None;
        state.phase = SessionPhase::Failed { reason };
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
