//! HMAC-SHA1 request signatures.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::encoding::percent_encode;

type HmacSha1 = Hmac<Sha1>;

/// Value sent as `oauth_signature_method`.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";

/// OAuth 1.0a signing key: `enc(consumer_secret)&enc(token_secret)`.
///
/// Two-legged calls have no token, so the key ends in a bare `&`.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        percent_encode(consumer_secret),
        token_secret.map(percent_encode).unwrap_or_default()
    )
}

/// Base64 HMAC-SHA1 of `base_string` under `key`.
pub fn sign(base_string: &str, key: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");
    mac.update(base_string.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}
