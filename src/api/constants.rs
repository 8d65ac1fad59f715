//! Wire-level constants for OData v4 requests

/// Sub-resource addressing only the reference of a related entity
pub const REF_SEGMENT: &str = "$ref";

/// Default charset for request bodies
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Query option names
pub mod options {
    pub const TOP: &str = "$top";
    pub const SKIP: &str = "$skip";
    pub const COUNT: &str = "$count";
    pub const SEARCH: &str = "$search";
    pub const ORDERBY: &str = "$orderby";
    pub const FILTER: &str = "$filter";
    pub const EXPAND: &str = "$expand";
}

/// Header names and fixed header values
pub mod headers {
    pub const ACCEPT: &str = "Accept";
    pub const HOST: &str = "Host";
    pub const IF_MATCH: &str = "If-Match";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const ODATA_ENTITY_ID: &str = "OData-EntityId";
    pub const LOCATION: &str = "Location";
    pub const AUTHORIZATION: &str = "Authorization";

    /// Content type for JSON requests
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// If-Match header for updates (any version)
    pub const IF_MATCH_ANY: &str = "*";
}

/// JSON property-name conventions
pub mod annotations {
    /// Suffix of fields carrying a relative URI that binds an existing entity
    pub const BIND: &str = "@odata.bind";
    /// Property holding the absolute URL of a referenced entity
    pub const ID: &str = "@odata.id";
    /// Marker of fields holding the id of the parent in a contained navigation
    pub const PARENT_ID: &str = "@odata.parent.id";
}

/// Names of the well-known input and output fields
pub mod fields {
    pub const TRANSACTION_ID: &str = "transactionId";
    pub const PATH: &str = "path";
    pub const FILTERS: &str = "filters";
    pub const FILTER: &str = "filter";
    pub const LIMIT: &str = "limit";
    pub const OFFSET: &str = "offset";
    pub const TOTAL_COUNT: &str = "totalCount";
    pub const SEARCH: &str = "search";
    pub const ORDER_BY: &str = "orderBy";
    pub const ENTITY_ID: &str = "entityId";
    pub const BOUND_IDS: &str = "boundIds";
    pub const VALUE: &str = "value";
}

/// HTTP methods and association pseudo-verbs
pub mod methods {
    pub const GET: &str = "GET";
    pub const POST: &str = "POST";
    pub const PUT: &str = "PUT";
    pub const PATCH: &str = "PATCH";
    pub const DELETE: &str = "DELETE";
    pub const MERGE_ASSOCIATIONS: &str = "MERGE-ASSOCIATIONS";
    pub const ADD_ASSOCIATIONS: &str = "ADD-ASSOCIATIONS";
    pub const REMOVE_ASSOCIATIONS: &str = "REMOVE-ASSOCIATIONS";
}

/// Key addressing: `/Set/123` when `key_as_segment`, `/Set(123)` otherwise
pub fn key_suffix(key: &str, key_as_segment: bool) -> String {
    if key_as_segment {
        format!("/{}", key)
    } else {
        format!("({})", key)
    }
}

/// Build an entity reference below a collection, e.g. `Accounts(123)`
pub fn entity_reference(collection: &str, key: &str, key_as_segment: bool) -> String {
    format!("{}{}", collection, key_suffix(key, key_as_segment))
}

/// Absolute service root, e.g. `https://host/api/data/v9.2`
pub fn service_root(scheme: &str, host: &str, base_path: &str) -> String {
    format!("{}://{}{}", scheme, host, base_path)
}
