//! Process-lifetime holder for the current access token
//!
//! One slot, overwritten by every successful exchange or refresh and read
//! before every API request. No persistence and no expiry tracking: a
//! stale token surfaces as a 401 from the Web API.

use std::sync::{PoisonError, RwLock};

use common::Secret;
use tracing::debug;

/// Shared by `Arc` between the auth session (writer) and API client (reader).
#[derive(Debug, Default)]
pub struct TokenStore {
    access_token: RwLock<Option<Secret<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored access token.
    pub fn set(&self, token: impl Into<Secret<String>>) {
        let mut slot = self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token.into());
        debug!("access token stored");
    }

    /// Current access token, if a login or refresh has succeeded.
    pub fn access_token(&self) -> Option<Secret<String>> {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the token, e.g. after an auth failure or logout.
    pub fn clear(&self) {
        let mut slot = self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            debug!("access token cleared");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
