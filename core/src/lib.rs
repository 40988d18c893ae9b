//! Synchronous OAuth 1.0a client core for the FatSecret Platform API.
//!
//! # Overview
//! Builds signed `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). The caller executes
//! the actual HTTP round-trip, or hands the client a [`Transport`] to do it,
//! keeping signing and decoding deterministic and testable.
//!
//! # Design
//! - `FatSecretClient` is stateless: an immutable `FatSecretConfig` plus a
//!   nonce source.
//! - Signing is a pipeline of named pure steps: `canonicalize` then `sign`
//!   then `build_signed_request`.
//! - Parsing is `parse_json`, `classify` (error envelope first) and `decode`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
mod de;
pub mod encoding;
pub mod error;
pub mod http;
pub mod nonce;
pub mod params;
pub mod response;
pub mod signature;
pub mod transport;
pub mod types;

pub use client::{ApiMethod, FatSecretClient, SearchQuery};
pub use config::FatSecretConfig;
pub use error::{ApiError, ConfigError, DecodeError, FatSecretError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use nonce::{FixedNonce, NonceSource, SystemNonce};
pub use params::{Canonical, ParameterSet};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{AutocompleteSuggestions, Food, FoodSummary, SearchResult, Serving, Servings};
