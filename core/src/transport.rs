//! The seam between the core and whatever performs the HTTP round-trip.
//!
//! The client never retries; a transport that wants retries does them itself.

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes a signed request and returns the raw response.
///
/// Non-2xx statuses are data, not errors: return them as an `HttpResponse`
/// so the client can look for an error envelope in the body.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use std::time::Duration;

    use super::Transport;
    use crate::error::TransportError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Blocking transport backed by `ureq`.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl std::fmt::Debug for UreqTransport {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("UreqTransport").finish_non_exhaustive()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            Self::with_timeout(DEFAULT_TIMEOUT)
        }

        pub fn with_timeout(timeout: Duration) -> Self {
            // 4xx/5xx must reach the client as data so error envelopes survive
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let url = request.url();
            let mut builder = match request.method {
                HttpMethod::Post => self.agent.post(&url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            let result = match &request.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            };
            let mut response = result
                .map_err(|e| TransportError::with_source(format!("request to {} failed", request.base_url), e))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| TransportError::with_source("failed to read response body", e))?;

            Ok(HttpResponse { status, headers, body })
        }
    }
}
