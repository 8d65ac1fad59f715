use super::support::{RecordingTransport, client, definition};
use odata_client::api::{
    CallContext, ComplexType, FieldDescriptor, Function, HttpResponse, InputBuilder, Method,
    ODataError, Record, Value, ValueType,
};

fn account() -> ComplexType {
    ComplexType::new("account")
        .with_field(FieldDescriptor::new("accountid", ValueType::Guid))
        .with_field(FieldDescriptor::string("name"))
        .with_field(FieldDescriptor::new("numberofemployees", ValueType::Integer))
}

#[tokio::test]
async fn test_created_id_from_header() {
    let transport = RecordingTransport::new();
    transport.respond(HttpResponse::new(204).with_header(
        "OData-EntityId",
        "https://org.example.com/api/data/v9.2/accounts(358b0d2a-f3a6-ed11-aad1-6045bd957895)",
    ));
    let client = client(definition(), &transport);
    let function = Function::new("create", Method::Post, "accounts")
        .with_input(ComplexType::new("input").with_field(FieldDescriptor::complex("account", account())))
        .with_output(ComplexType::new("output").with_field(FieldDescriptor::string("id")));

    let output = InputBuilder::new()
        .body("account", Record::new().with("name", "Contoso"))
        .execute(&client, &function, &CallContext::new())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(output.get("id"), Some(&Value::from("358b0d2a-f3a6-ed11-aad1-6045bd957895")));
    assert_eq!(transport.requests()[0].body_text().as_deref(), Some(r#"{"name":"Contoso"}"#));
}

#[tokio::test]
async fn test_single_entity() {
    let transport = RecordingTransport::new();
    transport.respond(HttpResponse::new(200).with_body(
        r#"{"@odata.context": "x", "accountid": "358b0d2a-f3a6-ed11-aad1-6045bd957895", "name": "Contoso", "numberofemployees": 12}"#,
    ));
    let client = client(definition(), &transport);
    let function = Function::new("get", Method::Get, "accounts")
        .with_input(ComplexType::new("input").with_field(FieldDescriptor::string("accountid").primary_key()))
        .with_output(ComplexType::new("output").with_field(FieldDescriptor::complex("account", account())));

    let output = InputBuilder::new()
        .field("accountid", "358b0d2a-f3a6-ed11-aad1-6045bd957895")
        .execute(&client, &function, &CallContext::new())
        .await
        .unwrap()
        .unwrap();

    let account = output.get("account").and_then(Value::as_record).unwrap();
    assert_eq!(account.get("name"), Some(&Value::from("Contoso")));
    assert_eq!(account.get("numberofemployees"), Some(&Value::Integer(12)));
    assert!(matches!(account.get("accountid"), Some(Value::Uuid(_))));
    assert!(!account.contains("@odata.context"));
}

#[tokio::test]
async fn test_collection() {
    let transport = RecordingTransport::new();
    transport.respond(HttpResponse::new(200).with_body(
        r#"{"@odata.count": 2, "value": [{"name": "a"}, {"name": "b", "numberofemployees": null}]}"#,
    ));
    let client = client(definition(), &transport);
    let function = Function::new("list", Method::Get, "accounts").with_output(
        ComplexType::new("output")
            .with_field(FieldDescriptor::complex("value", account()).list())
            .with_field(FieldDescriptor::new("@odata.count", ValueType::Integer)),
    );

    let output = client.run(&function, None, &CallContext::new()).await.unwrap().unwrap();
    let names: Vec<_> = output
        .get("value")
        .and_then(Value::as_list)
        .unwrap()
        .iter()
        .filter_map(|v| v.as_record()?.get("name").cloned())
        .collect();
    assert_eq!(names, vec![Value::from("a"), Value::from("b")]);
    assert_eq!(output.get("@odata.count"), Some(&Value::Integer(2)));
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let function = Function::new("get", Method::Get, "accounts")
        .with_output(ComplexType::new("output").with_field(FieldDescriptor::complex("account", account())));

    let transport = RecordingTransport::new();
    transport.respond(HttpResponse::new(200).with_body("<html>login</html>"));
    let result = client(definition(), &transport).run(&function, None, &CallContext::new()).await;
    assert!(matches!(result, Err(ODataError::Decode(_))));

    let transport = RecordingTransport::new();
    transport.respond(HttpResponse::new(200).with_body(r#"{"numberofemployees": "many"}"#));
    let result = client(definition(), &transport).run(&function, None, &CallContext::new()).await;
    assert!(matches!(result, Err(ODataError::Decode(_))));
}
