//! OData operations
//!
//! Function descriptors and everything that turns a function call into
//! requests and back: foreign-key rewriting, association reconciliation,
//! dispatch and response decoding.

pub mod associations;
pub mod decoder;
pub mod dispatcher;
pub mod foreign_keys;
pub mod operation;
pub mod request;

pub use associations::{AssociationMode, AssociationReconciler, AssociationState};
pub use decoder::ResponseDecoder;
pub use dispatcher::{Dispatcher, RequestRewriter};
pub use foreign_keys::ForeignKeyRewriter;
pub use operation::{Function, Method};
pub use request::{Headers, HttpRequest, HttpResponse};
