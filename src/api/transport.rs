//! HTTP transport capability
//!
//! The engine hands fully built requests to a `Transport`; connection
//! pooling, TLS, timeouts and cancellation live behind this trait.

use crate::api::constants::headers;
use crate::api::error::{ODataError, Result};
use crate::api::operations::request::{Headers, HttpRequest, HttpResponse};
use async_trait::async_trait;
use log::{debug, trace};
use std::time::Duration;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request against `host`. `transaction_id` is opaque and only
    /// forwarded so an implementation can reuse a connection for a session.
    async fn execute(
        &self,
        request: HttpRequest,
        host: &str,
        secure: bool,
        transaction_id: Option<&str>,
    ) -> Result<HttpResponse>;
}

/// Transport over a pooled reqwest client
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("odata-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ODataError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }

    fn url(request: &HttpRequest, host: &str, secure: bool) -> String {
        let scheme = if secure { "https" } else { "http" };
        format!("{}://{}{}", scheme, host, request.target)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(
        &self,
        request: HttpRequest,
        host: &str,
        secure: bool,
        transaction_id: Option<&str>,
    ) -> Result<HttpResponse> {
        let url = Self::url(&request, host, secure);
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| ODataError::Transport(format!("invalid method '{}': {}", request.method, e)))?;
        debug!("{} {} (transaction: {:?})", request.method, url, transaction_id);

        let mut builder = self.http_client.request(method, &url);
        for (name, value) in request.headers.iter() {
            // reqwest derives these from the url and body
            if name.eq_ignore_ascii_case(headers::HOST) || name.eq_ignore_ascii_case(headers::CONTENT_LENGTH) {
                continue;
            }
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ODataError::Transport(format!("{} {} failed: {}", request.method, url, e)))?;

        let status = response.status().as_u16();
        let mut response_headers = Headers::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                response_headers.set(name.as_str(), value_str);
            }
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| ODataError::Transport(format!("failed to read response body: {}", e)))?;
        trace!("Response {} with {} bytes", status, body.len());

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body: Some(body.to_vec()),
        })
    }
}
