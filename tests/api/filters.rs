use super::support::{RecordingTransport, client, definition};
use odata_client::api::query::filters::build_filter;
use odata_client::api::services::input_interface;
use odata_client::cli::commands::run::read_input;
use odata_client::api::{
    CallContext, ComplexType, FieldDescriptor, FilterClause, Function, InputBuilder, Method,
    ODataError, ValueType,
};

fn list_contacts() -> Function {
    Function::new("list", Method::Get, "contacts").with_input(
        ComplexType::new("input")
            .with_field(FieldDescriptor::string("filter"))
            .with_field(FieldDescriptor::new("limit", ValueType::Integer)),
    )
}

#[test]
fn test_or_run_is_grouped() {
    let clauses = [
        FilterClause::eq("statecode", 0),
        FilterClause::eq("firstname", "Ann"),
        FilterClause::eq("firstname", "Bob").or(),
        FilterClause::eq("city", "Oslo"),
    ];
    assert_eq!(
        build_filter(&clauses).unwrap(),
        " statecode eq 0 and ( firstname eq 'Ann' or firstname eq 'Bob') and city eq 'Oslo'"
    );
}

#[test]
fn test_in_and_negated_like() {
    let clauses = [
        FilterClause::new("accountid", "=").values(["a", "b", "c"]),
        FilterClause::new("name", "not like").value("%corp%"),
    ];
    assert_eq!(
        build_filter(&clauses).unwrap(),
        " accountid in ('a','b','c') and not(contains( name , 'corp'))"
    );
}

#[test]
fn test_skipped_flag_does_not_join() {
    let clauses = [
        FilterClause::new("active", "isBoolFlag").value(odata_client::api::FilterValue::Null),
        FilterClause::eq("a", 1),
    ];
    assert_eq!(build_filter(&clauses).unwrap(), " a eq 1");
}

#[tokio::test]
async fn test_filters_reach_the_query_string() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);

    InputBuilder::new()
        .filter(FilterClause::eq("lastname", "O'Neil"))
        .top(5)
        .execute(&client, &list_contacts(), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(
        transport.lines(),
        vec!["GET /api/data/v9.2/contacts?$top=5&$filter=%20lastname%20eq%20%27O%27%27Neil%27"]
    );
}

#[tokio::test]
async fn test_explicit_filter_overrides_clauses() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);

    InputBuilder::new()
        .filter(FilterClause::eq("lastname", "x"))
        .raw_filter("statecode eq 1")
        .execute(&client, &list_contacts(), &CallContext::new())
        .await
        .unwrap();

    assert_eq!(
        transport.lines(),
        vec!["GET /api/data/v9.2/contacts?$filter=statecode%20eq%201"]
    );
}

#[tokio::test]
async fn test_malformed_clause_sends_nothing() {
    let transport = RecordingTransport::new();
    let client = client(definition(), &transport);

    let result = InputBuilder::new()
        .filter(FilterClause::new("revenue", ">"))
        .execute(&client, &list_contacts(), &CallContext::new())
        .await;

    assert!(matches!(result, Err(ODataError::Filter(_))));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_typed_values_through_service_input() {
    let function = list_contacts();
    let schema = input_interface(&function, "/api/data/v9.2");
    let cases = [
        (
            r#"{"filters": [{"key": "active", "operator": "isBoolFlag", "values": [false]}]}"#,
            "GET /api/data/v9.2/contacts?$filter=%20not%28%20active%20isBoolFlag%29",
        ),
        (
            r#"{"filters": [{"key": "active", "operator": "isBoolFlag", "values": [null]}]}"#,
            "GET /api/data/v9.2/contacts",
        ),
        (
            r#"{"filters": [{"key": "statecode", "operator": "=", "values": [0]}]}"#,
            "GET /api/data/v9.2/contacts?$filter=%20statecode%20eq%200",
        ),
    ];

    for (body, expected) in cases {
        let transport = RecordingTransport::new();
        let client = client(definition(), &transport);
        let input = read_input(body, &schema).unwrap();

        client.run(&function, Some(&input), &CallContext::new()).await.unwrap();
        assert_eq!(transport.lines(), vec![expected]);
    }
}
