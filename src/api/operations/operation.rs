//! Function descriptors: one exposed operation against an entity set

use crate::api::constants::methods;
use crate::api::error::ODataError;
use crate::api::schema::ComplexType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP verb or association pseudo-verb of a function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
    #[serde(rename = "PUT")]
    Put,
    #[serde(rename = "PATCH")]
    Patch,
    #[serde(rename = "DELETE")]
    Delete,
    #[serde(rename = "MERGE-ASSOCIATIONS")]
    MergeAssociations,
    #[serde(rename = "ADD-ASSOCIATIONS")]
    AddAssociations,
    #[serde(rename = "REMOVE-ASSOCIATIONS")]
    RemoveAssociations,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => methods::GET,
            Self::Post => methods::POST,
            Self::Put => methods::PUT,
            Self::Patch => methods::PATCH,
            Self::Delete => methods::DELETE,
            Self::MergeAssociations => methods::MERGE_ASSOCIATIONS,
            Self::AddAssociations => methods::ADD_ASSOCIATIONS,
            Self::RemoveAssociations => methods::REMOVE_ASSOCIATIONS,
        }
    }

    pub fn is_association(&self) -> bool {
        matches!(
            self,
            Self::MergeAssociations | Self::AddAssociations | Self::RemoveAssociations
        )
    }

    /// Writes whose body may carry `@odata.bind` references
    pub fn writes_entity(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Verbs that get a conditional `If-Match` header
    pub fn is_conditional(&self) -> bool {
        matches!(self, Self::Put | Self::Patch | Self::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ODataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            methods::GET => Ok(Self::Get),
            methods::POST => Ok(Self::Post),
            methods::PUT => Ok(Self::Put),
            methods::PATCH => Ok(Self::Patch),
            methods::DELETE => Ok(Self::Delete),
            methods::MERGE_ASSOCIATIONS => Ok(Self::MergeAssociations),
            methods::ADD_ASSOCIATIONS => Ok(Self::AddAssociations),
            methods::REMOVE_ASSOCIATIONS => Ok(Self::RemoveAssociations),
            other => Err(ODataError::schema(format!("unknown method '{}'", other))),
        }
    }
}

/// An exposed operation: verb, target context and input/output shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub name: String,
    pub method: Method,
    /// Entity set (or navigation property) the function works on
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub input: ComplexType,
    #[serde(default)]
    pub output: ComplexType,
}

impl Function {
    pub fn new(name: impl Into<String>, method: Method, context: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            context: Some(context.into()),
            input: ComplexType::new("input"),
            output: ComplexType::new("output"),
        }
    }

    pub fn with_input(mut self, input: ComplexType) -> Self {
        self.input = input;
        self
    }

    pub fn with_output(mut self, output: ComplexType) -> Self {
        self.output = output;
        self
    }

    /// The context, which must be present for anything we send
    pub fn require_context(&self) -> Result<&str, ODataError> {
        self.context
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ODataError::schema(format!("function '{}' has no context", self.name)))
    }

    /// `context.name`, or just the name for context-less functions
    pub fn qualified_name(&self) -> String {
        match &self.context {
            Some(context) => format!("{}.{}", context, self.name),
            None => self.name.clone(),
        }
    }
}
