//! Association reconciliation for many-to-many navigation properties
//!
//! The association pseudo-verbs compare the desired bound ids with the
//! existing references of an entity and emit `$ref` deletes and adds:
//!
//! - MERGE reads the current references first (`GET .../$ref`)
//! - ADD assumes nothing is bound yet
//! - REMOVE treats every supplied id as bound and desires none
//!
//! All generated requests run as one ordered sequence without rollback, a
//! failure halfway leaves the earlier requests applied.

use super::dispatcher::Dispatcher;
use super::operation::Method;
use super::request::{HttpRequest, HttpResponse};
use crate::api::constants::{REF_SEGMENT, annotations, methods};
use crate::api::error::{ODataError, Result};
use crate::api::logging::OperationContext;
use crate::api::query::target::AssociationTarget;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static REFERENCE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*\(([^)]+)\)").expect("valid reference key regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationMode {
    Merge,
    Add,
    Remove,
}

impl AssociationMode {
    pub fn from_method(method: Method) -> Option<Self> {
        match method {
            Method::MergeAssociations => Some(Self::Merge),
            Method::AddAssociations => Some(Self::Add),
            Method::RemoveAssociations => Some(Self::Remove),
            _ => None,
        }
    }
}

/// Body of a `GET .../$ref` response
#[derive(Debug, Deserialize)]
struct ReferenceList {
    #[serde(default)]
    value: Vec<Reference>,
}

#[derive(Debug, Deserialize)]
struct Reference {
    #[serde(rename = "@odata.id")]
    odata_id: Option<String>,
}

/// Key of the entity a reference URL points at: the content of the last
/// parenthesised group, or the last path segment for key-as-segment URLs
pub fn reference_key(odata_id: &str) -> String {
    if let Some(key) = REFERENCE_KEY.captures(odata_id).and_then(|c| c.get(1)) {
        return key.as_str().to_string();
    }
    odata_id
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(odata_id)
        .to_string()
}

/// Existing associations: bound key to full reference URL, in discovery order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationState {
    existing: Vec<(String, String)>,
}

impl AssociationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, url: String) {
        match self.existing.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = url,
            None => self.existing.push((key, url)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.existing.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.existing.iter().map(|(k, _)| k.as_str())
    }

    pub fn url(&self, key: &str) -> Option<&str> {
        self.existing
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, url)| url.as_str())
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }
}

pub struct AssociationReconciler<'d, 'a> {
    dispatcher: &'d Dispatcher<'a>,
}

impl<'d, 'a> AssociationReconciler<'d, 'a> {
    pub fn new(dispatcher: &'d Dispatcher<'a>) -> Self {
        Self { dispatcher }
    }

    /// Absolute URL of a bound entity
    fn entity_url(&self, target: &AssociationTarget, key: &str) -> String {
        format!(
            "{}/{}{}",
            self.dispatcher.definition.service_root(),
            target.collection,
            self.dispatcher.endpoint.key_suffix(key)
        )
    }

    /// `GET <target>/$ref`
    pub fn list_request(&self, target: &AssociationTarget) -> HttpRequest {
        self.dispatcher
            .reference_request(methods::GET, format!("{}/{}", target.target, REF_SEGMENT), None)
    }

    /// Parse the references currently bound
    pub fn parse_existing(&self, response: &HttpResponse) -> Result<AssociationState> {
        let mut state = AssociationState::new();
        let Some(body) = response.content() else {
            return Ok(state);
        };
        let list: ReferenceList = serde_json::from_slice(body)
            .map_err(|e| ODataError::Decode(format!("invalid reference list: {}", e)))?;
        for odata_id in list.value.into_iter().filter_map(|r| r.odata_id) {
            state.insert(reference_key(&odata_id), odata_id);
        }
        Ok(state)
    }

    /// Every supplied id reported as bound
    pub fn assume_existing(&self, target: &AssociationTarget) -> AssociationState {
        let mut state = AssociationState::new();
        for key in &target.bound_ids {
            state.insert(key.clone(), self.entity_url(target, key));
        }
        state
    }

    /// Deletes for bound ids no longer desired, then adds for missing ones
    pub fn plan(&self, target: &AssociationTarget, existing: &AssociationState, desired: &[String]) -> Vec<HttpRequest> {
        let mut requests = Vec::new();

        for key in existing.keys() {
            if !desired.iter().any(|d| d == key) {
                let delete_target = format!(
                    "{}{}/{}",
                    target.target,
                    self.dispatcher.endpoint.key_suffix(key),
                    REF_SEGMENT
                );
                requests.push(self.dispatcher.reference_request(methods::DELETE, delete_target, None));
            }
        }

        let add_method = if self.dispatcher.endpoint.use_post_for_relations {
            methods::POST
        } else {
            methods::PUT
        };
        let mut added: Vec<&str> = Vec::new();
        for key in desired {
            if existing.contains(key) || added.contains(&key.as_str()) {
                continue;
            }
            added.push(key);
            let mut body = serde_json::Map::new();
            body.insert(
                annotations::ID.to_string(),
                serde_json::Value::String(self.entity_url(target, key)),
            );
            requests.push(self.dispatcher.reference_request(
                add_method,
                format!("{}/{}", target.target, REF_SEGMENT),
                Some(serde_json::Value::Object(body).to_string().into_bytes()),
            ));
        }

        requests
    }

    pub async fn reconcile(
        &self,
        mode: AssociationMode,
        target: &AssociationTarget,
        operation: &OperationContext,
    ) -> Result<()> {
        let existing = match mode {
            AssociationMode::Merge => {
                let response = self.dispatcher.execute(self.list_request(target), operation).await?;
                self.parse_existing(&response)?
            }
            AssociationMode::Add => AssociationState::new(),
            AssociationMode::Remove => self.assume_existing(target),
        };
        let desired: &[String] = match mode {
            AssociationMode::Remove => &[],
            _ => &target.bound_ids,
        };

        let requests = self.plan(target, &existing, desired);
        debug!(
            "Reconciling {} on {}: {} existing, {} desired, {} requests",
            target.navigation_property,
            target.target,
            existing.len(),
            desired.len(),
            requests.len()
        );
        if !requests.is_empty() {
            self.dispatcher.execute_sequence(requests, operation).await?;
        }
        Ok(())
    }
}
