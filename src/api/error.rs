//! Error taxonomy for the OData engine

use thiserror::Error;

/// Everything that can go wrong while translating or executing an operation
#[derive(Debug, Error)]
pub enum ODataError {
    /// Missing or malformed field annotations needed to build a request
    #[error("schema error: {0}")]
    Schema(String),

    /// Malformed filter clause
    #[error("filter error: {0}")]
    Filter(String),

    /// The authenticator rejected the request (or none is available)
    #[error("could not authenticate the request: {0}")]
    Auth(String),

    /// Non-2xx HTTP response
    #[error("unexpected HTTP status {status_code}")]
    Protocol {
        status_code: u16,
        body: Option<String>,
    },

    /// Network or IO failure reported by the transport
    #[error("transport error: {0}")]
    Transport(String),

    /// The service definition could not be resolved
    #[error("service definition unavailable: {0}")]
    Metadata(String),

    /// Unexpected failure while decoding a response body
    #[error("could not decode response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, ODataError>;

impl ODataError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }

    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter(message.into())
    }

    /// HTTP status code, when the failure came from the server
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Protocol { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ODataError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}
