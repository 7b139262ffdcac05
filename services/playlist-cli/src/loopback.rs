//! Development redirect: a one-shot HTTP listener on the loopback interface
//!
//! Prints the authorization URL, then serves `/callback` until the first
//! redirect arrives. The listener is bound up front so the redirect URI
//! names the real port even when the config asks for port 0.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::Uri;
use axum::response::Html;
use axum::routing::get;
use reqwest::Url;
use spotify_auth::{
    AuthorizationPrompt, AuthorizationRequest, AuthorizationResult, LOOPBACK_CALLBACK_PATH,
    RedirectTarget,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

const DONE_PAGE: &str =
    "<html><body><h3>Login complete.</h3><p>You can close this window.</p></body></html>";
const CANCELLED_PAGE: &str =
    "<html><body><h3>Login cancelled.</h3><p>You can close this window.</p></body></html>";
const FAILED_PAGE: &str =
    "<html><body><h3>Login failed.</h3><p>Check the terminal for details.</p></body></html>";

type ResultSender = Arc<Mutex<Option<oneshot::Sender<AuthorizationResult>>>>;

#[derive(Clone)]
struct CallbackState {
    addr: SocketAddr,
    tx: ResultSender,
}

pub struct LoopbackPrompt {
    addr: SocketAddr,
    listener: Mutex<Option<TcpListener>>,
    timeout: Duration,
}

impl LoopbackPrompt {
    /// Bind the redirect listener on `addr`.
    pub async fn bind(addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::CallbackBind { addr, source })?;
        let addr = listener
            .local_addr()
            .map_err(|source| Error::CallbackBind { addr, source })?;
        debug!(%addr, "redirect listener bound");
        Ok(Self {
            addr,
            listener: Mutex::new(Some(listener)),
            timeout,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The listener from `bind` is used once; later attempts rebind.
    async fn listener(&self) -> std::io::Result<TcpListener> {
        let bound = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match bound {
            Some(listener) => Ok(listener),
            None => TcpListener::bind(self.addr).await,
        }
    }

    async fn wait_for_redirect(&self, url: &Url) -> AuthorizationResult {
        let listener = match self.listener().await {
            Ok(listener) => listener,
            Err(e) => {
                return AuthorizationResult::Error {
                    reason: format!("redirect listener unavailable: {e}"),
                };
            }
        };

        let (tx, rx) = oneshot::channel();
        let state = CallbackState {
            addr: self.addr,
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        let app = Router::new()
            .route(LOOPBACK_CALLBACK_PATH, get(callback_handler))
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                warn!(error = %e, "redirect listener stopped");
            }
        });

        eprintln!("Open this URL in your browser to log in to Spotify:\n\n  {url}\n");
        info!(addr = %self.addr, "waiting for authorization redirect");

        let result = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => AuthorizationResult::Error {
                reason: "redirect listener stopped before a redirect arrived".into(),
            },
            Err(_) => AuthorizationResult::Error {
                reason: format!("no redirect within {:?}", self.timeout),
            },
        };
        let _ = shutdown_tx.send(());
        result
    }
}

impl AuthorizationPrompt for LoopbackPrompt {
    fn redirect_uri(&self) -> String {
        RedirectTarget::Loopback { addr: self.addr }.uri()
    }

    fn authorize<'a>(
        &'a self,
        _request: &'a AuthorizationRequest,
        url: &'a Url,
    ) -> Pin<Box<dyn Future<Output = AuthorizationResult> + Send + 'a>> {
        Box::pin(self.wait_for_redirect(url))
    }
}

/// `GET /callback?code=..&state=..` or `?error=..`
async fn callback_handler(State(state): State<CallbackState>, uri: Uri) -> Html<&'static str> {
    let result = match Url::parse(&format!("http://{}{uri}", state.addr)) {
        Ok(url) => AuthorizationResult::from_redirect(&url),
        Err(e) => AuthorizationResult::Error {
            reason: format!("malformed redirect: {e}"),
        },
    };
    let page = match &result {
        AuthorizationResult::Success { .. } => DONE_PAGE,
        AuthorizationResult::Cancelled => CANCELLED_PAGE,
        AuthorizationResult::Error { .. } => FAILED_PAGE,
    };

    let sender = state
        .tx
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    match sender {
        Some(tx) => {
            let _ = tx.send(result);
        }
        None => debug!("ignoring repeated redirect"),
    }
    Html(page)
}
