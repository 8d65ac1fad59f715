//! OData v4 translation engine
//!
//! Turns schema-described entity operations (list, read, create, update,
//! delete, association maintenance) into OData v4 HTTP requests and decodes
//! the responses back into records.

pub mod auth;
pub mod binding;
pub mod client;
pub mod constants;
pub mod definition;
pub mod error;
pub mod logging;
pub mod manager;
pub mod models;
pub mod operations;
pub mod query;
pub mod schema;
pub mod services;
pub mod transport;

pub use auth::{Authenticator, AuthenticatorRegistry, BearerAuthenticator, TokenInfo};
pub use binding::{Binding, JsonBinding};
pub use client::{CallContext, ODataClient, ODataClientBuilder};
pub use definition::{DefinitionResolver, JsonFileDefinition, StaticDefinition};
pub use error::{ODataError, Result};
pub use logging::{ApiLogger, LogLevel, MonitoringConfig, OperationContext};
pub use manager::ClientManager;
pub use models::{EndpointConfig, NavigationProperty, ServiceDefinition, TypeRegistry};
pub use operations::{Function, HttpRequest, HttpResponse, Method, RequestRewriter};
pub use query::{FilterClause, FilterValue, InputBuilder, OrderBy, QueryOptions};
pub use schema::{ComplexType, FieldDescriptor, Record, Value, ValueType};
pub use services::{ExternalDependency, ServiceDescriptor};
pub use transport::{ReqwestTransport, Transport};
