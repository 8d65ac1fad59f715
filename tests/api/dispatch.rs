use super::support::{RecordingTransport, builder, client, client_with, definition};
use async_trait::async_trait;
use odata_client::api::{
    AuthenticatorRegistry, BearerAuthenticator, CallContext, ComplexType, EndpointConfig,
    FieldDescriptor, Function, HttpRequest, HttpResponse, Method, ODataError, Record,
    RequestRewriter, Result, TokenInfo,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

fn delete_account() -> Function {
    Function::new("delete", Method::Delete, "accounts")
        .with_input(ComplexType::new("input").with_field(FieldDescriptor::string("accountid").primary_key()))
}

fn input() -> Record {
    Record::new().with("accountid", "a1")
}

fn secured() -> EndpointConfig {
    EndpointConfig {
        security_type: Some("bearer".to_string()),
        security_context: Some("crm".to_string()),
        ..EndpointConfig::default()
    }
}

#[tokio::test]
async fn test_standard_headers() {
    let transport = RecordingTransport::new();
    client(definition(), &transport)
        .run(&delete_account(), Some(&input()), &CallContext::new())
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method, "DELETE");
    assert_eq!(request.header("accept"), Some("application/json"));
    assert_eq!(request.header("Host"), Some("org.example.com"));
    assert_eq!(request.header("Content-Length"), Some("0"));
    assert_eq!(request.header("If-Match"), Some("*"));
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_ignore_etag() {
    let transport = RecordingTransport::new();
    let endpoint = EndpointConfig {
        ignore_etag: true,
        ..EndpointConfig::default()
    };
    client_with(definition(), endpoint, &transport)
        .run(&delete_account(), Some(&input()), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(transport.requests()[0].header("If-Match"), None);
}

#[tokio::test]
async fn test_bearer_token_from_registry() {
    let transport = RecordingTransport::new();
    let mut authenticators = AuthenticatorRegistry::new();
    authenticators.register(
        "bearer",
        Arc::new(BearerAuthenticator::new().with_token("crm", TokenInfo::new("secret"))),
    );
    let client = builder(definition(), &transport)
        .endpoint(secured())
        .authenticators(authenticators)
        .build()
        .unwrap();

    client
        .run(&delete_account(), Some(&input()), &CallContext::new())
        .await
        .unwrap();
    assert_eq!(transport.requests()[0].header("Authorization"), Some("Bearer secret"));
}

#[tokio::test]
async fn test_refused_authentication_sends_nothing() {
    let transport = RecordingTransport::new();
    let expired = TokenInfo {
        access_token: "old".to_string(),
        expires_at: Some(SystemTime::now() - Duration::from_secs(60)),
    };
    let client = builder(definition(), &transport)
        .endpoint(secured())
        .authenticator(Arc::new(BearerAuthenticator::new().with_token("crm", expired)))
        .build()
        .unwrap();

    let result = client.run(&delete_account(), Some(&input()), &CallContext::new()).await;
    assert!(matches!(result, Err(ODataError::Auth(_))));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_missing_authenticator_is_auth_error() {
    let transport = RecordingTransport::new();
    let client = client_with(definition(), secured(), &transport);

    let result = client.run(&delete_account(), Some(&input()), &CallContext::new()).await;
    assert!(matches!(result, Err(ODataError::Auth(_))));
    assert!(transport.sent().is_empty());
}

#[derive(Default)]
struct TaggingRewriter {
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl RequestRewriter for TaggingRewriter {
    async fn rewrite(&self, client_id: &str, request: &mut HttpRequest) -> Result<()> {
        self.seen.lock().unwrap().push(client_id.to_string());
        request.headers.set("X-Client", client_id);
        request.target = format!("/proxy{}", request.target);
        Ok(())
    }
}

#[tokio::test]
async fn test_rewriter_sees_every_request() {
    let transport = RecordingTransport::new();
    let rewriter = Arc::new(TaggingRewriter::default());
    let client = builder(definition(), &transport)
        .rewriter(rewriter.clone())
        .build()
        .unwrap();

    client
        .run(&delete_account(), Some(&input()), &CallContext::new())
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.header("X-Client"), Some("crm"));
    assert_eq!(request.target, "/proxy/api/data/v9.2/accounts('a1')");
    assert_eq!(*rewriter.seen.lock().unwrap(), vec!["crm".to_string()]);
}

#[tokio::test]
async fn test_non_success_status_is_protocol_error() {
    let transport = RecordingTransport::new();
    transport.respond(HttpResponse::new(412).with_body("precondition failed"));
    let client = client(definition(), &transport);

    let result = client.run(&delete_account(), Some(&input()), &CallContext::new()).await;
    match result {
        Err(error @ ODataError::Protocol { .. }) => assert_eq!(error.status_code(), Some(412)),
        other => panic!("expected a protocol error, got {:?}", other),
    }
}
