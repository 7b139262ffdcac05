//! Spotify OAuth (Authorization Code + PKCE) for a public client
//!
//! Provides PKCE generation, the authorization session state machine, the
//! token endpoint calls and the in-memory token store the API client reads.
//!
//! Login flow:
//! 1. `AuthSession::start_login()` builds an `AuthorizationRequest`
//!    (`pkce::generate_verifier()` + `pkce::compute_challenge()`)
//! 2. An `AuthorizationPrompt` shows the consent page and reports the redirect
//! 3. The session calls `token::exchange_code()` with the recorded verifier
//!    and redirect URI
//! 4. The access token lands in the shared `TokenStore`
//! 5. `AuthSession::refresh_token()` swaps in a new token on demand

pub mod config;
pub mod constants;
pub mod error;
pub mod pkce;
pub mod prompt;
pub mod request;
pub mod session;
pub mod token;
pub mod token_store;

pub use config::AuthConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use pkce::{CodeChallenge, CodeVerifier, compute_challenge, generate_verifier};
pub use prompt::{AuthorizationPrompt, AuthorizationResult, RedirectTarget};
pub use request::AuthorizationRequest;
pub use session::{AuthSession, SessionPhase};
pub use token::{TokenResponse, exchange_code, refresh_token};
pub use token_store::TokenStore;
