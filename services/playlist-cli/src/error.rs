//! CLI error types

use std::net::SocketAddr;

use thiserror::Error;

/// Failures of a CLI run. Library errors pass through unchanged so the
/// exit message names the real cause.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to bind redirect listener on {addr}: {source}")]
    CallbackBind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Auth(#[from] spotify_auth::Error),

    #[error("{0}")]
    Api(#[from] spotify_api::Error),
}

/// Result alias using the CLI Error
pub type Result<T> = std::result::Result<T, Error>;
