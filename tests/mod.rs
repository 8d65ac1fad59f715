/// Integration tests for odata-client
///
/// Everything runs against an in-memory transport:
/// - api: request building, dispatch and decoding through `ODataClient`
mod api;
