use super::support::{RecordingTransport, body_json, client, client_with, definition};
use odata_client::api::{
    CallContext, ComplexType, EndpointConfig, FieldDescriptor, Function, HttpResponse, Method,
    ODataError, Record, Value, ValueType,
};
use serde_json::json;

fn associate(method: Method) -> Function {
    Function::new("contacts", method, "accounts").with_input(
        ComplexType::new("input")
            .with_field(FieldDescriptor::new("entityId", ValueType::Guid))
            .with_field(
                FieldDescriptor::new("boundIds", ValueType::Guid)
                    .list()
                    .collection_name("contacts")
                    .alias("contact_customer_accounts"),
            ),
    )
}

fn input(bound: &[&str]) -> Record {
    Record::new().with("entityId", "e1").with(
        "boundIds",
        bound.iter().map(|id| Value::from(*id)).collect::<Vec<_>>(),
    )
}

const ROOT: &str = "https://org.example.com/api/data/v9.2";

#[tokio::test]
async fn test_merge_reads_then_reconciles() {
    let transport = RecordingTransport::new();
    transport.respond(HttpResponse::new(200).with_body(format!(
        r#"{{"value": [{{"@odata.id": "{root}/contacts(a)"}}, {{"@odata.id": "{root}/contacts(b)"}}]}}"#,
        root = ROOT
    )));
    let client = client(definition(), &transport);

    let output = client
        .run(&associate(Method::MergeAssociations), Some(&input(&["b", "c"])), &CallContext::new())
        .await
        .unwrap();
    assert_eq!(output, Some(Record::new()));

    assert_eq!(
        transport.lines(),
        vec![
            "GET /api/data/v9.2/accounts(e1)/contact_customer_accounts/$ref",
            "DELETE /api/data/v9.2/accounts(e1)/contact_customer_accounts(a)/$ref",
            "PUT /api/data/v9.2/accounts(e1)/contact_customer_accounts/$ref",
        ]
    );
    let requests = transport.requests();
    assert_eq!(body_json(&requests[2]), json!({"@odata.id": format!("{}/contacts(c)", ROOT)}));
    assert!(requests.iter().all(|r| r.header("If-Match").is_none()));
}

#[tokio::test]
async fn test_merge_with_nothing_to_change() {
    let transport = RecordingTransport::new();
    transport.respond(HttpResponse::new(200).with_body(format!(
        r#"{{"value": [{{"@odata.id": "{}/contacts(a)"}}]}}"#,
        ROOT
    )));
    let client = client(definition(), &transport);

    client
        .run(&associate(Method::MergeAssociations), Some(&input(&["a"])), &CallContext::new())
        .await
        .unwrap();
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn test_add_posts_without_reading() {
    let transport = RecordingTransport::new();
    let endpoint = EndpointConfig {
        use_post_for_relations: true,
        key_as_segment: true,
        ..EndpointConfig::default()
    };
    let client = client_with(definition(), endpoint, &transport);

    client
        .run(&associate(Method::AddAssociations), Some(&input(&["x", "y", "x"])), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(
        transport.lines(),
        vec![
            "POST /api/data/v9.2/accounts/e1/contact_customer_accounts/$ref",
            "POST /api/data/v9.2/accounts/e1/contact_customer_accounts/$ref",
        ]
    );
    let bodies: Vec<_> = transport.requests().iter().map(body_json).collect();
    assert_eq!(
        bodies,
        vec![
            json!({"@odata.id": format!("{}/contacts/x", ROOT)}),
            json!({"@odata.id": format!("{}/contacts/y", ROOT)}),
        ]
    );
}

#[tokio::test]
async fn test_remove_deletes_every_supplied_id() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);

    client
        .run(&associate(Method::RemoveAssociations), Some(&input(&["x", "y"])), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(
        transport.lines(),
        vec![
            "DELETE /api/data/v9.2/accounts(e1)/contact_customer_accounts(x)/$ref",
            "DELETE /api/data/v9.2/accounts(e1)/contact_customer_accounts(y)/$ref",
        ]
    );
}

#[tokio::test]
async fn test_failure_stops_the_sequence() {
    let transport = RecordingTransport::new();
    transport
        .respond(HttpResponse::new(204))
        .respond(HttpResponse::new(404).with_body(r#"{"error": "gone"}"#));
    let client = client(definition(), &transport);

    let result = client
        .run(&associate(Method::RemoveAssociations), Some(&input(&["x", "y", "z"])), &CallContext::new())
        .await;

    match result {
        Err(ODataError::Protocol { status_code, body }) => {
            assert_eq!(status_code, 404);
            assert_eq!(body.as_deref(), Some(r#"{"error": "gone"}"#));
        }
        other => panic!("expected a protocol error, got {:?}", other),
    }
    assert_eq!(transport.sent().len(), 2);
}

#[tokio::test]
async fn test_missing_entity_id_is_schema_error() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);

    let result = client
        .run(&associate(Method::AddAssociations), Some(&Record::new()), &CallContext::new())
        .await;
    assert!(matches!(result, Err(ODataError::Schema(_))));
    assert!(transport.sent().is_empty());
}
