use super::support::{RecordingTransport, client, client_with, definition};
use odata_client::api::{
    CallContext, ComplexType, EndpointConfig, FieldDescriptor, FilterClause, Function, InputBuilder,
    Method, ODataError, OrderBy, Record, ServiceDefinition, ValueType,
};

fn get_account() -> Function {
    Function::new("get", Method::Get, "accounts").with_input(
        ComplexType::new("input").with_field(FieldDescriptor::new("accountid", ValueType::Guid).primary_key()),
    )
}

#[tokio::test]
async fn test_key_forms() {
    let id = "9f1c6f2e-0000-4000-8000-000000000001";
    let input = Record::new().with("accountid", id);

    let transport = RecordingTransport::new();
    client(definition(), &transport)
        .run(&get_account(), Some(&input), &CallContext::new())
        .await
        .unwrap();

    let segment = RecordingTransport::new();
    let endpoint = EndpointConfig {
        key_as_segment: true,
        ..EndpointConfig::default()
    };
    client_with(definition(), endpoint, &segment)
        .run(&get_account(), Some(&input), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(transport.lines(), vec![format!("GET /api/data/v9.2/accounts({})", id)]);
    assert_eq!(segment.lines(), vec![format!("GET /api/data/v9.2/accounts/{}", id)]);
}

#[tokio::test]
async fn test_options_and_expand() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);
    let function = Function::new("list", Method::Get, "accounts").with_output(
        ComplexType::new("output")
            .with_field(FieldDescriptor::string("primarycontactid").expand("primarycontactid"))
            .with_field(FieldDescriptor::string("owner").expand(" ownerid ")),
    );

    InputBuilder::new()
        .top(10)
        .skip(20)
        .count()
        .search("blue")
        .orderby(OrderBy::asc("name"))
        .execute(&client, &function, &CallContext::new())
        .await
        .unwrap();

    assert_eq!(
        transport.lines(),
        vec![
            "GET /api/data/v9.2/accounts?$top=10&$skip=20&$count=true&$search=blue&$orderby=name%20asc&$expand=primarycontactid%2Cownerid"
        ]
    );
}

#[tokio::test]
async fn test_path_parameters_and_parent_scope() {
    let definition = ServiceDefinition {
        scheme: "https".to_string(),
        host: "graph.example.com".to_string(),
        base_path: "/v1.0/sites/{ site }".to_string(),
        ..ServiceDefinition::default()
    };
    let transport = RecordingTransport::new();
    let client = client(definition, &transport);

    InputBuilder::new()
        .path_parameter("site", "contoso.sharepoint.com")
        .filter(FilterClause::eq("lists@odata.parent.id", "l1"))
        .filter(FilterClause::eq("title", "Q3"))
        .execute(&client, &Function::new("list", Method::Get, "items"), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(
        transport.lines(),
        vec!["GET /v1.0/sites/contoso.sharepoint.com/lists(l1)/items?$filter=%20title%20eq%20%27Q3%27"]
    );
    let sent = &transport.sent()[0];
    assert_eq!(sent.host, "graph.example.com");
    assert!(sent.secure);
}

#[tokio::test]
async fn test_transaction_id_is_forwarded() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);
    let function = Function::new("list", Method::Get, "accounts");

    client
        .run(&function, None, &CallContext::with_transaction("tx-42"))
        .await
        .unwrap();
    InputBuilder::new()
        .transaction("tx-from-input")
        .execute(&client, &function, &CallContext::new())
        .await
        .unwrap();
    client.run(&function, None, &CallContext::new()).await.unwrap();

    let transactions: Vec<Option<String>> = transport.sent().into_iter().map(|s| s.transaction_id).collect();
    assert_eq!(
        transactions,
        vec![Some("tx-42".to_string()), Some("tx-from-input".to_string()), None]
    );
}

#[tokio::test]
async fn test_missing_context_or_key_fails_before_sending() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);

    let no_context = Function {
        context: None,
        ..Function::new("list", Method::Get, "accounts")
    };
    let result = client.run(&no_context, None, &CallContext::new()).await;
    assert!(matches!(result, Err(ODataError::Schema(_))));

    let result = client.run(&get_account(), None, &CallContext::new()).await;
    assert!(matches!(result, Err(ODataError::Schema(_))));

    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_run_named_looks_up_the_function() {
    let definition = ServiceDefinition {
        functions: vec![get_account()],
        ..definition()
    };
    let transport = RecordingTransport::new();
    let client = client(definition, &transport);
    let input = Record::new().with("accountid", "a1");

    client
        .run_named("accounts", "get", Some(&input), &CallContext::new())
        .await
        .unwrap();
    assert_eq!(transport.lines(), vec!["GET /api/data/v9.2/accounts(a1)"]);

    let missing = client.run_named("accounts", "purge", None, &CallContext::new()).await;
    assert!(matches!(missing, Err(ODataError::Schema(_))));
}
