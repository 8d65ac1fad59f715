//! Request dispatch
//!
//! Every request of a logical operation passes through the same steps:
//! authentication (when a security type is configured), the optional rewrite
//! hook, the transport, and status validation. A failure aborts the rest of
//! the sequence; nothing is retried or rolled back.

use super::operation::Method;
use super::request::{HttpRequest, HttpResponse};
use crate::api::auth::Authenticator;
use crate::api::constants::headers;
use crate::api::error::{ODataError, Result};
use crate::api::logging::{ApiLogger, OperationContext};
use crate::api::models::{EndpointConfig, ServiceDefinition};
use crate::api::transport::Transport;
use async_trait::async_trait;
use std::time::Instant;

/// Caller-supplied hook that may alter any request before it is sent
#[async_trait]
pub trait RequestRewriter: Send + Sync {
    async fn rewrite(&self, client_id: &str, request: &mut HttpRequest) -> Result<()>;
}

pub struct Dispatcher<'a> {
    pub client_id: &'a str,
    pub definition: &'a ServiceDefinition,
    pub endpoint: &'a EndpointConfig,
    pub transport: &'a dyn Transport,
    pub authenticator: Option<&'a dyn Authenticator>,
    pub rewriter: Option<&'a dyn RequestRewriter>,
    pub logger: &'a ApiLogger,
}

impl<'a> Dispatcher<'a> {
    /// Request for a regular verb: standard headers plus `If-Match: *` for
    /// conditional verbs unless etags are ignored
    pub fn entity_request(
        &self,
        method: Method,
        target: String,
        body: Option<(&str, Vec<u8>)>,
    ) -> HttpRequest {
        let mut request = match body {
            Some((content_type, bytes)) => HttpRequest::with_body(method.as_str(), target, content_type, bytes),
            None => HttpRequest::empty(method.as_str(), target),
        }
        .accept_json(&self.definition.host);

        if method.is_conditional() && !self.endpoint.ignore_etag {
            request.headers.set(headers::IF_MATCH, headers::IF_MATCH_ANY);
        }
        request
    }

    /// Request against a `$ref` endpoint, never conditional
    pub fn reference_request(&self, method: &str, target: String, body: Option<Vec<u8>>) -> HttpRequest {
        match body {
            Some(bytes) => HttpRequest::with_body(method, target, headers::CONTENT_TYPE_JSON, bytes),
            None => HttpRequest::empty(method, target),
        }
        .accept_json(&self.definition.host)
    }

    /// Authenticate, rewrite, send and validate a single request
    pub async fn execute(&self, mut request: HttpRequest, operation: &OperationContext) -> Result<HttpResponse> {
        if let Some(security_type) = &self.endpoint.security_type {
            let authenticator = self.authenticator.ok_or_else(|| {
                ODataError::Auth(format!("no authenticator available for security type '{}'", security_type))
            })?;
            let authenticated = authenticator
                .authenticate(&mut request, self.endpoint.security_context.as_deref())
                .await?;
            if !authenticated {
                return Err(ODataError::Auth(format!(
                    "{} authentication refused {} {}",
                    security_type, request.method, request.target
                )));
            }
        }

        if let Some(rewriter) = self.rewriter {
            rewriter.rewrite(self.client_id, &mut request).await?;
        }

        self.logger.log_request(operation, &request);
        let started = Instant::now();
        let response = self
            .transport
            .execute(
                request,
                &self.definition.host,
                self.definition.uses_tls(),
                operation.transaction_id.as_deref(),
            )
            .await?;
        self.logger.log_response(operation, &response, started.elapsed());

        if !response.is_success() {
            return Err(ODataError::Protocol {
                status_code: response.status,
                body: response.body_text(),
            });
        }
        Ok(response)
    }

    /// Execute requests in order, stopping at the first failure.
    /// Returns the last response.
    pub async fn execute_sequence(
        &self,
        requests: Vec<HttpRequest>,
        operation: &OperationContext,
    ) -> Result<Option<HttpResponse>> {
        let mut last = None;
        for request in requests {
            last = Some(self.execute(request, operation).await?);
        }
        Ok(last)
    }
}
