//! Client credentials and endpoint.
//!
//! # Design
//! `FatSecretConfig` is built once and never mutated. The client owns it and
//! threads it into every call, so there is no global parameter store and
//! nothing to lock when calls run concurrently.

use std::fmt;

use crate::error::ConfigError;
use crate::params::{ParameterSet, OAUTH_CONSUMER_KEY, OAUTH_SIGNATURE_METHOD, OAUTH_VERSION};
use crate::signature::{signing_key, SIGNATURE_METHOD};

pub const DEFAULT_BASE_URL: &str = "https://platform.fatsecret.com/rest/server.api";

pub const ENV_CONSUMER_KEY: &str = "FATSECRET_CONSUMER_KEY";
pub const ENV_CONSUMER_SECRET: &str = "FATSECRET_CONSUMER_SECRET";
pub const ENV_BASE_URL: &str = "FATSECRET_BASE_URL";

const OAUTH_VERSION_VALUE: &str = "1.0";
const RESPONSE_FORMAT: &str = "json";

#[derive(Clone, PartialEq, Eq)]
pub struct FatSecretConfig {
    consumer_key: String,
    consumer_secret: String,
    base_url: String,
}

impl FatSecretConfig {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another endpoint (a proxy or a mock server).
    ///
    /// The URL is signed verbatim, so it must not carry a query string or
    /// fragment.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = base_url.into();
        let reason = if url.is_empty() {
            Some("empty")
        } else if url.contains('?') {
            Some("must not contain a query string")
        } else if url.contains('#') {
            Some("must not contain a fragment")
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            Some("scheme must be http or https")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ConfigError::InvalidBaseUrl { url, reason });
        }
        self.base_url = url;
        Ok(self)
    }

    /// Read `FATSECRET_CONSUMER_KEY`, `FATSECRET_CONSUMER_SECRET` and the
    /// optional `FATSECRET_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| match lookup(name) {
            None => Err(ConfigError::MissingVar(name)),
            Some(v) if v.trim().is_empty() => Err(ConfigError::EmptyVar(name)),
            Some(v) => Ok(v),
        };
        let config = Self::new(required(ENV_CONSUMER_KEY)?, required(ENV_CONSUMER_SECRET)?);
        match lookup(ENV_BASE_URL) {
            Some(url) if !url.trim().is_empty() => config.with_base_url(url),
            _ => Ok(config),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parameters every request carries regardless of the operation.
    pub fn protocol_params(&self) -> ParameterSet {
        [
            ("format", RESPONSE_FORMAT),
            (OAUTH_CONSUMER_KEY, self.consumer_key.as_str()),
            (OAUTH_SIGNATURE_METHOD, SIGNATURE_METHOD),
            (OAUTH_VERSION, OAUTH_VERSION_VALUE),
        ]
        .into_iter()
        .collect()
    }

    pub fn signing_key(&self) -> String {
        signing_key(&self.consumer_secret, None)
    }
}

impl fmt::Debug for FatSecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FatSecretConfig")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
