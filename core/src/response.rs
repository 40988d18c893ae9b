//! Response classification and typed decoding.
//!
//! # Design
//! Both steps are pure functions over `serde_json::Value`. `classify` looks
//! for the error envelope before anything else, so a server-side rejection is
//! never misreported as a shape mismatch. `decode` then pulls the operation's
//! named field out and hands it to serde.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, DecodeError};

/// A success payload that lives under a single named top-level field.
pub trait Envelope: DeserializeOwned {
    const FIELD: &'static str;
}

/// Raw body to JSON. A body that is not JSON at all is a decode failure,
/// never "no error detected".
pub fn parse_json(body: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(body).map_err(DecodeError::Json)
}

/// Split an error envelope from a success payload.
///
/// `{"error": {"code": 5}}` is an invalid key, `8` an invalid signature, any
/// other (or missing) code is an unknown error. Anything without an `error`
/// member passes through untouched.
pub fn classify(payload: Value) -> Result<Value, ApiError> {
    let Some(error) = payload.get("error") else {
        return Ok(payload);
    };

    let code = error.get("code").and_then(|c| match c {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    tracing::warn!(code = ?code, message = %message, "API returned an error envelope");
    Err(ApiError::from_code(code, message))
}

/// Decode the payload's `T::FIELD` member into `T`.
pub fn decode<T: Envelope>(payload: Value) -> Result<T, DecodeError> {
    let Value::Object(mut map) = payload else {
        return Err(DecodeError::NotAnObject);
    };
    let field = map.remove(T::FIELD).ok_or(DecodeError::MissingField(T::FIELD))?;
    serde_json::from_value(field).map_err(|source| DecodeError::Malformed {
        field: T::FIELD,
        source,
    })
}
