use super::support::{RecordingTransport, body_json, client, definition};
use odata_client::api::{
    CallContext, ComplexType, FieldDescriptor, Function, InputBuilder, Method, NavigationProperty,
    Record, ServiceDefinition, TypeRegistry, ValueType,
};
use serde_json::json;
use std::sync::Arc;

fn contact(primary: ComplexType) -> ComplexType {
    ComplexType::new("contact")
        .with_id("crm.contact")
        .with_field(FieldDescriptor::string("lastname"))
        .with_field(FieldDescriptor::string("parentcustomerid_account@odata.bind"))
        .with_field(FieldDescriptor::complex("parentcustomerid_account", primary))
        .with_field(FieldDescriptor::new("accountid", ValueType::Guid).foreign_name("parentcustomerid_account"))
}

fn create(entity: ComplexType) -> Function {
    Function::new("create", Method::Post, "contacts")
        .with_input(ComplexType::new("input").with_field(FieldDescriptor::complex("contact", entity)))
}

#[tokio::test]
async fn test_create_sends_reference_instead_of_key() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);
    let function = create(contact(ComplexType::new("account").with_collection_name("accounts")));

    let body = Record::new().with("lastname", "Smith").with("accountid", "a1");
    InputBuilder::new()
        .body("contact", body)
        .execute(&client, &function, &CallContext::new())
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/api/data/v9.2/contacts");
    assert_eq!(requests[0].header("Content-Type"), Some("application/json"));
    assert_eq!(requests[0].header("If-Match"), None);
    assert_eq!(
        body_json(&requests[0]),
        json!({"lastname": "Smith", "parentcustomerid_account@odata.bind": "/accounts(a1)"})
    );
}

#[tokio::test]
async fn test_update_is_conditional_and_rewritten() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);
    let entity = contact(ComplexType::new("account").with_collection_name("accounts"));
    let function = Function::new("update", Method::Patch, "contacts").with_input(
        ComplexType::new("input")
            .with_field(FieldDescriptor::string("contactid").primary_key())
            .with_field(FieldDescriptor::complex("contact", entity)),
    );

    InputBuilder::new()
        .field("contactid", "c-1")
        .body("contact", Record::new().with("accountid", "a2"))
        .execute(&client, &function, &CallContext::new())
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.target, "/api/data/v9.2/contacts('c-1')");
    assert_eq!(request.header("If-Match"), Some("*"));
    assert_eq!(
        body_json(request),
        json!({"parentcustomerid_account@odata.bind": "/accounts(a2)"})
    );
}

#[tokio::test]
async fn test_collection_from_navigation_property() {
    let definition = ServiceDefinition {
        navigation_properties: vec![NavigationProperty {
            qualified_name: "crm.contact".to_string(),
            name: "parentcustomerid_account".to_string(),
            target_entity_set: Some("accounts".to_string()),
            collection: false,
        }],
        ..definition()
    };
    let transport = RecordingTransport::new();
    let client = client(definition, &transport);

    InputBuilder::new()
        .body("contact", Record::new().with("accountid", "a3"))
        .execute(&client, &create(contact(ComplexType::new("account"))), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(
        body_json(&transport.requests()[0]),
        json!({"parentcustomerid_account@odata.bind": "/accounts(a3)"})
    );
}

struct Registry;

impl TypeRegistry for Registry {
    fn resolve_global_type(&self, type_id: &str) -> Option<ComplexType> {
        (type_id == "crm.account").then(|| ComplexType::new("account").with_collection_name("accountsets"))
    }
}

#[tokio::test]
async fn test_injected_registry_is_consulted() {
    let transport = RecordingTransport::new();
    let client = super::support::builder(definition(), &transport)
        .type_registry(Arc::new(Registry))
        .build()
        .unwrap();
    let function = create(contact(ComplexType::new("account").with_id("crm.account")));

    InputBuilder::new()
        .body("contact", Record::new().with("accountid", "a4"))
        .execute(&client, &function, &CallContext::new())
        .await
        .unwrap();

    assert_eq!(
        body_json(&transport.requests()[0]),
        json!({"parentcustomerid_account@odata.bind": "/accountsets(a4)"})
    );
}

#[tokio::test]
async fn test_unknown_collection_leaves_body_untouched() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);

    InputBuilder::new()
        .body("contact", Record::new().with("accountid", "a5"))
        .execute(&client, &create(contact(ComplexType::new("account"))), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(body_json(&transport.requests()[0]), json!({"accountid": "a5"}));
}
