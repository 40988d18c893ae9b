//! Parameter sets and OAuth 1.0a canonicalization.
//!
//! # Design
//! `ParameterSet` is a plain `BTreeMap` so insertion order never leaks into
//! the output. The canonical order is defined over the *encoded* pairs, which
//! is what the server sorts on, so `encoded_pairs` sorts explicitly instead of
//! trusting the map order of the raw keys.

use std::collections::BTreeMap;

use crate::encoding::percent_encode;
use crate::error::{FatSecretError, Result};
use crate::http::HttpMethod;

pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_VERSION: &str = "oauth_version";

/// Name/value pairs with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: BTreeMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Every pair percent-encoded, sorted by encoded key then encoded value.
    pub fn encoded_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .entries
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        pairs.sort();
        pairs
    }

    /// `k1=v1&k2=v2...` over [`encoded_pairs`](Self::encoded_pairs).
    pub fn canonical_query(&self) -> String {
        self.encoded_pairs()
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

/// Output of [`canonicalize`]: the merged parameters and the string to sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonical {
    pub params: ParameterSet,
    pub base_string: String,
}

/// `METHOD&enc(base_url)&enc(canonical_query)`.
///
/// The query is encoded a second time as a whole, so `%20` inside a value
/// shows up as `%2520` here.
pub fn signature_base_string(method: HttpMethod, base_url: &str, params: &ParameterSet) -> String {
    format!(
        "{}&{}&{}",
        method.as_str(),
        percent_encode(base_url),
        percent_encode(&params.canonical_query())
    )
}

/// Merge protocol parameters, call parameters and the nonce/timestamp pair,
/// then build the signature base string over the result.
///
/// A call parameter may not reuse a protocol key, `oauth_nonce`,
/// `oauth_timestamp` or `oauth_signature`.
pub fn canonicalize(
    method: HttpMethod,
    base_url: &str,
    fixed: &ParameterSet,
    call: &ParameterSet,
    nonce: &str,
    timestamp: &str,
) -> Result<Canonical> {
    let mut params = fixed.clone();
    params.insert(OAUTH_NONCE, nonce);
    params.insert(OAUTH_TIMESTAMP, timestamp);

    for (key, value) in call.iter() {
        if key == OAUTH_SIGNATURE || params.contains_key(key) {
            return Err(FatSecretError::ReservedParameter(key.to_string()));
        }
        params.insert(key, value);
    }

    let base_string = signature_base_string(method, base_url, &params);
    Ok(Canonical {
        params,
        base_string,
    })
}
