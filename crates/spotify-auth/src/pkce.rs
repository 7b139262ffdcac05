//! PKCE (Proof Key for Code Exchange) per RFC 7636
//!
//! The verifier stays in the session and is sent only to the token
//! endpoint; the challenge travels in the authorization URL so Spotify can
//! check that the party redeeming the code is the one that asked for it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use common::Secret;
use rand::RngExt;
use sha2::{Digest, Sha256};

/// Random bytes behind a verifier. 96 bytes encode to exactly 128
/// base64url characters, the RFC 7636 upper bound.
const VERIFIER_BYTES: usize = 96;

/// Secret half of a PKCE pair. Not `Clone`: one verifier
/// belongs to one authorization attempt and is consumed by one exchange.
#[derive(Debug)]
pub struct CodeVerifier(Secret<String>);

impl CodeVerifier {
    pub fn as_str(&self) -> &str {
        self.0.expose()
    }
}

impl From<&str> for CodeVerifier {
    fn from(value: &str) -> Self {
        Self(Secret::from(value))
    }
}

/// Public half of a PKCE pair, `BASE64URL(SHA256(verifier))` without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChallenge(String);

impl CodeChallenge {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CodeChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate a fresh verifier from the thread-local CSPRNG.
pub fn generate_verifier() -> CodeVerifier {
    let mut bytes = [0u8; VERIFIER_BYTES];
    rand::rng().fill(&mut bytes);
    CodeVerifier(Secret::new(URL_SAFE_NO_PAD.encode(bytes)))
}

/// Derive the S256 challenge for a verifier.
pub fn compute_challenge(verifier: &CodeVerifier) -> CodeChallenge {
    challenge_for(verifier.as_str())
}

/// `compute_challenge` over a raw string; used when checking a verifier
/// seen on the wire against a recorded challenge.
pub fn challenge_for(verifier: &str) -> CodeChallenge {
    let hash = Sha256::digest(verifier.as_bytes());
    CodeChallenge(URL_SAFE_NO_PAD.encode(hash))
}
