//! In-memory transport and fixtures shared by the API tests

use async_trait::async_trait;
use odata_client::api::{
    EndpointConfig, HttpRequest, HttpResponse, ODataClient, ODataClientBuilder, Result,
    ServiceDefinition, StaticDefinition, Transport,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A request as the transport saw it
#[derive(Debug, Clone)]
pub struct Sent {
    pub request: HttpRequest,
    pub host: String,
    pub secure: bool,
    pub transaction_id: Option<String>,
}

/// Records every request and answers from a queue (204 once it runs dry)
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    sent: Mutex<Vec<Sent>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, response: HttpResponse) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent().into_iter().map(|s| s.request).collect()
    }

    /// `METHOD target` of every request, in order
    pub fn lines(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.target))
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(
        &self,
        request: HttpRequest,
        host: &str,
        secure: bool,
        transaction_id: Option<&str>,
    ) -> Result<HttpResponse> {
        self.sent.lock().unwrap().push(Sent {
            request,
            host: host.to_string(),
            secure,
            transaction_id: transaction_id.map(str::to_string),
        });
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| HttpResponse::new(204)))
    }
}

pub fn definition() -> ServiceDefinition {
    ServiceDefinition {
        scheme: "https".to_string(),
        host: "org.example.com".to_string(),
        base_path: "/api/data/v9.2".to_string(),
        ..ServiceDefinition::default()
    }
}

pub fn builder(definition: ServiceDefinition, transport: &Arc<RecordingTransport>) -> ODataClientBuilder {
    ODataClient::builder("crm", Arc::new(StaticDefinition::new(definition))).transport(transport.clone())
}

pub fn client(definition: ServiceDefinition, transport: &Arc<RecordingTransport>) -> ODataClient {
    builder(definition, transport).build().unwrap()
}

pub fn client_with(
    definition: ServiceDefinition,
    endpoint: EndpointConfig,
    transport: &Arc<RecordingTransport>,
) -> ODataClient {
    builder(definition, transport).endpoint(endpoint).build().unwrap()
}

pub fn body_json(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_slice(request.body.as_deref().unwrap_or_default()).unwrap()
}
