//! Shared types for the Spotify playlist workspace
//!
//! `Secret` keeps OAuth tokens out of logs; `Error` covers configuration
//! loading failures shared by every binary.

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
