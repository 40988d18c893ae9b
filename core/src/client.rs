//! Request signing and response parsing for the three API operations.
//!
//! # Design
//! `FatSecretClient` holds only its immutable configuration and a nonce
//! source, and carries no mutable state between calls. Each operation is
//! split into a `build_*` method that produces a signed `HttpRequest` and a
//! `parse_*` method that consumes an `HttpResponse`; the `search_food`,
//! `autocomplete_food` and `get_food` conveniences run the round-trip in
//! between through a [`Transport`].

use crate::config::FatSecretConfig;
use crate::error::{FatSecretError, Result};
use crate::http::{build_signed_request, HttpMethod, HttpRequest, HttpResponse};
use crate::nonce::{NonceSource, SystemNonce};
use crate::params::{canonicalize, ParameterSet};
use crate::response::{classify, decode, parse_json, Envelope};
use crate::signature::sign;
use crate::transport::Transport;
use crate::types::{AutocompleteSuggestions, Food, SearchResult};

/// Every operation is sent with this method.
pub const REQUEST_METHOD: HttpMethod = HttpMethod::Post;

/// Value of the `method` request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    FoodsSearch,
    FoodsAutocomplete,
    FoodGet,
}

impl ApiMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiMethod::FoodsSearch => "foods.search",
            ApiMethod::FoodsAutocomplete => "foods.autocomplete",
            ApiMethod::FoodGet => "food.get",
        }
    }
}

/// Arguments for `foods.search`. Paging is optional; the server defaults to
/// the first page of 20.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub expression: String,
    pub page_number: Option<u32>,
    pub max_results: Option<u32>,
}

impl SearchQuery {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            page_number: None,
            max_results: None,
        }
    }

    /// Zero-based page.
    pub fn page(mut self, page_number: u32) -> Self {
        self.page_number = Some(page_number);
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

impl From<&str> for SearchQuery {
    fn from(expression: &str) -> Self {
        Self::new(expression)
    }
}

impl From<String> for SearchQuery {
    fn from(expression: String) -> Self {
        Self::new(expression)
    }
}

/// Stateless client for the FatSecret REST API.
///
/// Safe to share across threads; calls never touch each other.
#[derive(Debug, Clone)]
pub struct FatSecretClient<N = SystemNonce> {
    config: FatSecretConfig,
    nonces: N,
}

impl FatSecretClient<SystemNonce> {
    pub fn new(config: FatSecretConfig) -> Self {
        Self::with_nonce_source(config, SystemNonce)
    }
}

impl<N: NonceSource> FatSecretClient<N> {
    pub fn with_nonce_source(config: FatSecretConfig, nonces: N) -> Self {
        Self { config, nonces }
    }

    pub fn config(&self) -> &FatSecretConfig {
        &self.config
    }

    pub fn build_search_food(&self, query: impl Into<SearchQuery>) -> Result<HttpRequest> {
        let query = query.into();
        let mut params = ParameterSet::new();
        params.insert("search_expression", query.expression);
        if let Some(page) = query.page_number {
            params.insert("page_number", page.to_string());
        }
        if let Some(max) = query.max_results {
            params.insert("max_results", max.to_string());
        }
        self.signed_request(ApiMethod::FoodsSearch, params)
    }

    pub fn build_autocomplete_food(&self, expression: &str) -> Result<HttpRequest> {
        let mut params = ParameterSet::new();
        params.insert("expression", expression);
        self.signed_request(ApiMethod::FoodsAutocomplete, params)
    }

    pub fn build_get_food(&self, id: &str) -> Result<HttpRequest> {
        let mut params = ParameterSet::new();
        params.insert("food_id", id);
        self.signed_request(ApiMethod::FoodGet, params)
    }

    pub fn parse_search_food(&self, response: HttpResponse) -> Result<SearchResult> {
        parse_envelope(response)
    }

    pub fn parse_autocomplete_food(&self, response: HttpResponse) -> Result<AutocompleteSuggestions> {
        parse_envelope(response)
    }

    pub fn parse_get_food(&self, response: HttpResponse) -> Result<Food> {
        parse_envelope(response)
    }

    /// Search for foods by name.
    pub fn search_food<T>(&self, transport: &T, query: impl Into<SearchQuery>) -> Result<SearchResult>
    where
        T: Transport + ?Sized,
    {
        let request = self.build_search_food(query)?;
        round_trip(transport, &request)
    }

    /// Suggest completions for a partial food name.
    pub fn autocomplete_food<T>(&self, transport: &T, expression: &str) -> Result<AutocompleteSuggestions>
    where
        T: Transport + ?Sized,
    {
        let request = self.build_autocomplete_food(expression)?;
        round_trip(transport, &request)
    }

    /// Fetch one food record with its servings.
    pub fn get_food<T>(&self, transport: &T, id: &str) -> Result<Food>
    where
        T: Transport + ?Sized,
    {
        let request = self.build_get_food(id)?;
        round_trip(transport, &request)
    }

    fn signed_request(&self, method: ApiMethod, mut call: ParameterSet) -> Result<HttpRequest> {
        call.insert("method", method.as_str());

        let canonical = canonicalize(
            REQUEST_METHOD,
            self.config.base_url(),
            &self.config.protocol_params(),
            &call,
            &self.nonces.nonce(),
            &self.nonces.timestamp(),
        )?;
        tracing::trace!(base_string = %canonical.base_string, "signature base string");

        let signature = sign(&canonical.base_string, &self.config.signing_key());
        let request = build_signed_request(REQUEST_METHOD, self.config.base_url(), &canonical.params, &signature);
        tracing::debug!(
            operation = method.as_str(),
            url = %request.base_url,
            params = canonical.params.len(),
            "built signed request"
        );
        Ok(request)
    }
}

fn round_trip<T, R>(transport: &T, request: &HttpRequest) -> Result<R>
where
    T: Transport + ?Sized,
    R: Envelope,
{
    let response = transport.execute(request).inspect_err(|e| {
        tracing::warn!(error = %e, url = %request.base_url, "transport failed");
    })?;
    tracing::debug!(status = response.status, bytes = response.body.len(), "received response");
    parse_envelope(response)
}

/// JSON first, then the error envelope, then the status, then the payload.
///
/// An error envelope wins over the status code; a non-JSON body on a non-2xx
/// status is reported as an HTTP error rather than a decode error.
fn parse_envelope<T: Envelope>(response: HttpResponse) -> Result<T> {
    let payload = match parse_json(&response.body) {
        Ok(payload) => payload,
        Err(_) if !response.is_success() => {
            return Err(FatSecretError::Http {
                status: response.status,
                body: response.body,
            })
        }
        Err(e) => return Err(e.into()),
    };
    let payload = classify(payload)?;
    if !response.is_success() {
        return Err(FatSecretError::Http {
            status: response.status,
            body: response.body,
        });
    }
    Ok(decode(payload)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::{ApiError, DecodeError, TransportError};
    use crate::nonce::FixedNonce;
    use crate::params::{OAUTH_NONCE, OAUTH_SIGNATURE, OAUTH_TIMESTAMP};

    fn client() -> FatSecretClient<FixedNonce> {
        FatSecretClient::with_nonce_source(
            FatSecretConfig::new("demo-consumer-key", "demo-consumer-secret"),
            FixedNonce::new("abc1234", "1700000000"),
        )
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn query_params(req: &HttpRequest) -> Vec<(&str, &str)> {
        req.query
            .split('&')
            .map(|pair| pair.split_once('=').unwrap())
            .collect()
    }

    #[test]
    fn get_food_matches_reference_request() {
        let req = client().build_get_food("12345").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.base_url, "https://platform.fatsecret.com/rest/server.api");
        assert_eq!(
            req.query,
            "food_id=12345&format=json&method=food.get&oauth_consumer_key=demo-consumer-key\
             &oauth_nonce=abc1234&oauth_signature=vC4gnkoRaN3xz5HyWMTo792b4IE%3D\
             &oauth_signature_method=HMAC-SHA1&oauth_timestamp=1700000000&oauth_version=1.0"
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn search_encodes_spaces_as_percent_20() {
        let req = client().build_search_food("apple pie").unwrap();
        let params = query_params(&req);
        assert!(params.contains(&("search_expression", "apple%20pie")));
        assert!(params.contains(&("method", "foods.search")));
        assert!(params.contains(&("oauth_signature", "N0qgpwtU6y7V8WWXS7dpFdhE2Gs%3D")));
    }

    #[test]
    fn search_paging_is_signed() {
        let req = client()
            .build_search_food(SearchQuery::new("apple").page(2).max_results(10))
            .unwrap();
        let params = query_params(&req);
        assert!(params.contains(&("page_number", "2")));
        assert!(params.contains(&("max_results", "10")));
    }

    #[test]
    fn autocomplete_uses_expression_param() {
        let req = client().build_autocomplete_food("chick+pea").unwrap();
        let params = query_params(&req);
        assert!(params.contains(&("expression", "chick%2Bpea")));
        assert!(params.contains(&("method", "foods.autocomplete")));
    }

    #[test]
    fn every_request_carries_protocol_params() {
        let c = client();
        for req in [
            c.build_search_food("x").unwrap(),
            c.build_autocomplete_food("x").unwrap(),
            c.build_get_food("1").unwrap(),
        ] {
            let keys: Vec<&str> = query_params(&req).into_iter().map(|(k, _)| k).collect();
            for key in [
                "format",
                "method",
                "oauth_consumer_key",
                "oauth_signature_method",
                OAUTH_TIMESTAMP,
                OAUTH_NONCE,
                "oauth_version",
                OAUTH_SIGNATURE,
            ] {
                assert!(keys.contains(&key), "missing {key} in {}", req.query);
            }
        }
    }

    #[test]
    fn system_nonce_changes_signature_per_call() {
        let c = FatSecretClient::new(FatSecretConfig::new("k", "s"));
        let a = c.build_get_food("1").unwrap();
        let b = c.build_get_food("1").unwrap();
        assert_ne!(a.query, b.query);
    }

    #[test]
    fn parse_search_food_success() {
        let result = client()
            .parse_search_food(response(
                200,
                r#"{"foods":{"food":[{"food_id":"1","food_name":"Apple"},{"food_id":"2","food_name":"Apple Pie"}],"total_results":"2"}}"#,
            ))
            .unwrap();
        assert_eq!(result.foods.len(), 2);
        assert_eq!(result.foods[1].food_name, "Apple Pie");
        assert_eq!(result.total_results, Some(2));
    }

    #[test]
    fn parse_invalid_key() {
        let err = client()
            .parse_get_food(response(200, r#"{"error":{"code":5,"message":"Invalid consumer key"}}"#))
            .unwrap_err();
        assert!(matches!(err, FatSecretError::Api(ApiError::InvalidConsumerKey { .. })));
    }

    #[test]
    fn error_envelope_wins_over_status() {
        let err = client()
            .parse_get_food(response(401, r#"{"error":{"code":8,"message":"Invalid signature"}}"#))
            .unwrap_err();
        assert!(matches!(err, FatSecretError::Api(ApiError::InvalidSignature { .. })));
    }

    #[test]
    fn non_json_error_status_is_http_error() {
        let err = client()
            .parse_autocomplete_food(response(502, "Bad Gateway"))
            .unwrap_err();
        assert!(matches!(err, FatSecretError::Http { status: 502, .. }));
    }

    #[test]
    fn json_without_envelope_on_error_status_is_http_error() {
        let err = client().parse_get_food(response(500, r#"{"oops":true}"#)).unwrap_err();
        assert!(matches!(err, FatSecretError::Http { status: 500, .. }));
    }

    #[test]
    fn wrong_payload_is_decode_error() {
        let err = client()
            .parse_autocomplete_food(response(200, r#"{"foods":{"food":[]}}"#))
            .unwrap_err();
        assert!(matches!(err, FatSecretError::Decode(DecodeError::MissingField("suggestions"))));
    }

    #[test]
    fn non_json_success_is_decode_error() {
        let err = client().parse_get_food(response(200, "not json")).unwrap_err();
        assert!(matches!(err, FatSecretError::Decode(DecodeError::Json(_))));
    }

    #[test]
    fn round_trip_through_closure_transport() {
        let transport = |req: &HttpRequest| {
            assert!(req.query.contains("food_id=12345"));
            Ok::<_, TransportError>(response(
                200,
                r#"{"food":{"food_id":"12345","food_name":"Greek Yogurt","servings":{"serving":[]}}}"#,
            ))
        };
        let food = client().get_food(&transport, "12345").unwrap();
        assert_eq!(food.food_name, "Greek Yogurt");
    }

    #[test]
    fn transport_failure_is_surfaced() {
        let transport = |_: &HttpRequest| Err::<HttpResponse, _>(TransportError::new("connection refused"));
        let err = client().search_food(&transport, "apple").unwrap_err();
        assert!(matches!(err, FatSecretError::Transport(_)));
    }

    #[test]
    fn client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FatSecretClient>();
        assert_send_sync::<FatSecretClient<FixedNonce>>();
    }
}
