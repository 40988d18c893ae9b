//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! crate builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network; the host (or a [`Transport`](crate::Transport))
//! performs the round-trip.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross the FFI
//! boundary without lifetime concerns.

use crate::params::{ParameterSet, OAUTH_SIGNATURE};

/// HTTP method for a request. The API is driven with a single method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
        }
    }
}

/// A signed request described as plain data.
///
/// Every parameter travels in `query`; `body` stays `None` for this API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub base_url: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// `base_url?query`.
    pub fn url(&self) -> String {
        format!("{}?{}", self.base_url, self.query)
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the host after executing an `HttpRequest`, then passed to
/// the client's `parse_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Assemble the final request from signed parameters.
///
/// The query carries every parameter plus `oauth_signature`, encoded and
/// ordered the same way as the signed string. Any `+` left over is escaped to
/// `%2B` so no transport reads it as a space.
pub fn build_signed_request(
    method: HttpMethod,
    base_url: &str,
    params: &ParameterSet,
    signature: &str,
) -> HttpRequest {
    let mut params = params.clone();
    params.insert(OAUTH_SIGNATURE, signature);
    let query = params.canonical_query().replace('+', "%2B");

    HttpRequest {
        method,
        base_url: base_url.to_string(),
        query,
        headers: vec![("accept".to_string(), "application/json".to_string())],
        body: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_encoded_into_query() {
        let params: ParameterSet = [("method", "food.get"), ("food_id", "1")]
            .into_iter()
            .collect();
        let req = build_signed_request(HttpMethod::Post, "http://h/api", &params, "a+b/c=");
        assert_eq!(req.query, "food_id=1&method=food.get&oauth_signature=a%2Bb%2Fc%3D");
        assert_eq!(req.url(), "http://h/api?food_id=1&method=food.get&oauth_signature=a%2Bb%2Fc%3D");
        assert_eq!(req.method, HttpMethod::Post);
        assert!(req.body.is_none());
    }

    #[test]
    fn query_never_contains_a_raw_plus() {
        let params: ParameterSet = [("expression", "1+1 = 2")].into_iter().collect();
        let req = build_signed_request(HttpMethod::Post, "http://h/api", &params, "s+g");
        assert!(!req.query.contains('+'), "{}", req.query);
        assert!(req.query.contains("expression=1%2B1%20%3D%202"));
    }

    #[test]
    fn build_is_idempotent() {
        let params: ParameterSet = [("a", "b")].into_iter().collect();
        let one = build_signed_request(HttpMethod::Post, "http://h/api", &params, "sig");
        let two = build_signed_request(HttpMethod::Post, "http://h/api", &params, "sig");
        assert_eq!(one, two);
        assert!(!params.contains_key(OAUTH_SIGNATURE));
    }

    #[test]
    fn success_range() {
        let mut resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }
}
