//! HTTP transport for the LDBWS SOAP service.
//!
//! # Responsibilities
//! - POST request envelopes to the configured endpoint
//! - Attach the access token to every call
//! - Bound every call by the configured timeout
//! - Map HTTP/SOAP failures to `UpstreamError`

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::schema::UpstreamConfig;
use crate::observability::metrics;
use crate::projection::SourceNode;
use crate::upstream::soap;
use crate::upstream::types::{LiveBoards, UpstreamError, UpstreamRequest, UpstreamResult};

/// SOAP client holding the per-process access token.
#[derive(Clone)]
pub struct SoapClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: String,
    timeout: Duration,
}

impl SoapClient {
    /// Create a client for `config.endpoint`.
    ///
    /// The endpoint is expected to have passed config validation.
    pub fn new(config: &UpstreamConfig, access_token: String) -> UpstreamResult<Self> {
        let endpoint: Url = config.endpoint.parse().map_err(|e| {
            UpstreamError::Decode(format!("invalid endpoint '{}': {}", config.endpoint, e))
        })?;
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        tracing::info!(endpoint = %endpoint, timeout_secs = config.timeout_secs, "SOAP client initialized");

        Ok(Self {
            http,
            endpoint,
            access_token,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn post(&self, request: &UpstreamRequest) -> UpstreamResult<SourceNode> {
        let operation = request.operation();
        let envelope = soap::encode_request(request, &self.access_token);

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", soap::soap_action(request))
            .body(envelope)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // Faults usually arrive with a 500, so decode before judging the status.
        match soap::decode_response(operation, &body) {
            Err(UpstreamError::Decode(reason)) if !status.is_success() => {
                tracing::debug!(operation, status = %status, reason = %reason, "Undecodable error response");
                Err(UpstreamError::Status(status.as_u16()))
            }
            Ok(_) if !status.is_success() => Err(UpstreamError::Status(status.as_u16())),
            other => other,
        }
    }
}

#[async_trait]
impl LiveBoards for SoapClient {
    async fn call(&self, request: &UpstreamRequest) -> UpstreamResult<SourceNode> {
        let operation = request.operation();
        let start = Instant::now();

        let result = self.post(request).await;

        metrics::record_upstream_call(operation, result.is_ok(), start);
        match &result {
            Ok(_) => tracing::debug!(operation, elapsed = ?start.elapsed(), "Upstream call succeeded"),
            Err(e) => tracing::warn!(operation, elapsed = ?start.elapsed(), error = %e, "Upstream call failed"),
        }
        result
    }
}

impl std::fmt::Debug for SoapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoapClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
