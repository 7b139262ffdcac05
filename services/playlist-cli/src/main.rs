//! Spotify playlist viewer
//!
//! Single-binary CLI that:
//! 1. Logs in with Authorization Code + PKCE (loopback or pasted redirect)
//! 2. Fetches the current user's profile
//! 3. Lists every playlist, or every track of one playlist (`--tracks ID`)

mod config;
mod error;
mod loopback;
mod manual;
mod metrics;
mod render;

use std::sync::Arc;

use anyhow::{Context, Result};
use spotify_api::{ApiClient, ApiConfig};
use spotify_auth::{AuthConfig, AuthSession, AuthorizationPrompt, TokenStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, RedirectMode};
use crate::loopback::LoopbackPrompt;
use crate::manual::ManualPrompt;

/// Explicitly wired session and API client sharing one token store.
struct App {
    session: AuthSession,
    api: ApiClient,
    tokens: Arc<TokenStore>,
}

impl App {
    fn new(auth: AuthConfig, api: ApiConfig, http: reqwest::Client) -> Self {
        let tokens = Arc::new(TokenStore::new());
        Self {
            session: AuthSession::new(auth, http.clone(), tokens.clone()),
            api: ApiClient::new(http, api, tokens.clone()),
            tokens,
        }
    }

    /// Any failed or cancelled login leaves the app unauthenticated.
    async fn login<P>(&self, prompt: &P) -> error::Result<()>
    where
        P: AuthorizationPrompt + ?Sized,
    {
        match self.session.start_login(prompt).await {
            Ok(token) => {
                metrics::record_login("success");
                info!(
                    expires_in = token.expires_in,
                    scope = %token.scope,
                    "logged in"
                );
                Ok(())
            }
            Err(e) => {
                self.tokens.clear();
                metrics::record_login(match e {
                    spotify_auth::Error::Cancelled => "cancelled",
                    _ => "failed",
                });
                warn!(error = %e, phase = self.session.phase().label(), "login failed");
                Err(e.into())
            }
        }
    }

    /// Profile header followed by the playlist or track listing.
    async fn listing(&self, playlist_id: Option<&str>) -> error::Result<String> {
        let user = self.api.get_current_user().await?;
        let mut out = render::profile(&user);
        match playlist_id {
            Some(id) => {
                let tracks = self.api.get_all_playlist_tracks(id).await?;
                info!(playlist_id = id, count = tracks.len(), "tracks fetched");
                out.push_str(&render::tracks(&tracks));
            }
            None => {
                let playlists = self.api.get_all_user_playlists().await?;
                info!(count = playlists.len(), "playlists fetched");
                out.push_str(&render::playlists(&playlists));
            }
        }
        Ok(out)
    }

    async fn run<P>(&self, prompt: &P, playlist_id: Option<&str>) -> error::Result<String>
    where
        P: AuthorizationPrompt + ?Sized,
    {
        self.login(prompt).await?;
        self.listing(playlist_id).await
    }
}

/// Value following `flag` in the argument list.
fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn load_config(cli_path: Option<&str>) -> Result<Config> {
    let (path, explicit) = Config::resolve_path(cli_path);
    if !explicit && !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return Config::parse("").context("invalid default configuration");
    }
    info!(path = %path.display(), "loading configuration");
    Config::load(&path).with_context(|| format!("failed to load config from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    // CLI: simple --config / --tracks flag parsing
    let args: Vec<String> = std::env::args().collect();
    let config = load_config(arg_value(&args, "--config"))?;
    let playlist_id = arg_value(&args, "--tracks");

    let prometheus = if config.telemetry.print_metrics {
        Some(metrics::install_recorder()?)
    } else {
        None
    };

    info!(
        client_id = %config.spotify.client_id,
        mode = ?config.redirect.mode,
        api_base_url = %config.spotify.api_base_url,
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("failed to build HTTP client")?;
    let app = App::new(config.auth_config(), config.api_config(), http);

    let prompt: Box<dyn AuthorizationPrompt> = match config.redirect.mode {
        RedirectMode::Development => {
            let loopback =
                LoopbackPrompt::bind(config.redirect.listen_addr, config.redirect_timeout())
                    .await?;
            info!(addr = %loopback.addr(), "redirect listener ready");
            Box::new(loopback)
        }
        RedirectMode::Production => Box::new(ManualPrompt::stdin(config.redirect_target().uri())),
    };

    let outcome = app.run(prompt.as_ref(), playlist_id).await;

    if let Some(handle) = prometheus {
        eprintln!("{}", handle.render());
    }

    let listing = outcome?;
    print!("{listing}");
    Ok(())
}
