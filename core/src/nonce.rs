//! Per-request nonce and timestamp.
//!
//! The nonce is anti-replay padding, not a secret, so the thread-local RNG is
//! plenty. `NonceSource` exists so requests can be reproduced byte for byte.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of every generated nonce.
pub const NONCE_LEN: usize = 7;

/// A fresh nonce: [`NONCE_LEN`] characters drawn uniformly from `[a-zA-Z0-9]`.
pub fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Current Unix time in whole seconds, as a decimal string.
pub fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Supplies the `oauth_nonce` / `oauth_timestamp` pair for each request.
pub trait NonceSource {
    fn nonce(&self) -> String;
    fn timestamp(&self) -> String;
}

/// Random nonce and wall-clock timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNonce;

impl NonceSource for SystemNonce {
    fn nonce(&self) -> String {
        nonce()
    }

    fn timestamp(&self) -> String {
        timestamp()
    }
}

/// Always returns the same pair. Useful for reference requests; the real API
/// rejects a reused nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedNonce {
    pub nonce: String,
    pub timestamp: String,
}

impl FixedNonce {
    pub fn new(nonce: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
            timestamp: timestamp.into(),
        }
    }
}

impl NonceSource for FixedNonce {
    fn nonce(&self) -> String {
        self.nonce.clone()
    }

    fn timestamp(&self) -> String {
        self.timestamp.clone()
    }
}
