//! Schema marshaling.
//!
//! # Data Flow
//! ```text
//! ConfigParams + configuration instance
//!     → serialize instance to a JSON tree
//!     → per scope: resolve visibility (fixpoint over sibling predicates)
//!     → drop hidden fields, evaluate `required` on the rest
//!     → recurse into objects (with their value) and object arrays (with a
//!       zero-valued element as the template)
//!     → Vec<FieldSchema>
//! ```
//!
//! # Design Decisions
//! - Hidden fields are omitted, not flagged, so their values never reach
//!   the client
//! - Output follows registry insertion order and is deterministic
//! - Package-inventory candidates are fetched per call; failures degrade to
//!   an empty list

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::packages::PackageInventory;
use crate::params::error::MarshalError;
use crate::params::parameter::{Candidate, CandidateSource, InputType, Range};
use crate::params::predicate::Environment;
use crate::params::registry::{ConfigParams, Entry};
use crate::params::reflect::{FieldType, Reflect, StructRef};

/// Value type tag sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    String,
    Array,
    Map,
    Object,
    ObjectArray,
}

impl From<FieldType> for TypeTag {
    fn from(ty: FieldType) -> Self {
        match ty {
            FieldType::Bool => TypeTag::Bool,
            FieldType::Int => TypeTag::Int,
            FieldType::Float => TypeTag::Float,
            FieldType::String => TypeTag::String,
            FieldType::Array => TypeTag::Array,
            FieldType::Map => TypeTag::Map,
            FieldType::Object(_) => TypeTag::Object,
            FieldType::ObjectArray(_) => TypeTag::ObjectArray,
        }
    }
}

/// One field of a marshaled schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub key: String,
    pub label_zh: String,
    pub label_en: String,
    pub description_zh: String,
    pub description_en: String,
    pub input_type: InputType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
    pub required: bool,
    #[serde(rename = "type")]
    pub type_tag: TypeTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldSchema>>,
}

impl ConfigParams {
    /// Marshal the fields registered for `T` against `instance`.
    pub fn marshal<T: Reflect>(
        &self,
        instance: &T,
        inventory: &dyn PackageInventory,
    ) -> Result<Vec<FieldSchema>, MarshalError> {
        let value = serde_json::to_value(instance)?;
        self.marshal_scope(StructRef::of::<T>(), "", value.as_object(), inventory)
    }

    fn marshal_scope(
        &self,
        scope: StructRef,
        parent: &str,
        values: Option<&Map<String, Value>>,
        inventory: &dyn PackageInventory,
    ) -> Result<Vec<FieldSchema>, MarshalError> {
        let entries: Vec<&Entry> = self.scope(scope, parent).collect();
        let hidden = resolve_hidden(scope, values, &entries);
        // Requiredness reads sibling values even when the sibling is hidden.
        let unmasked = HashSet::new();
        let env = ScopeEnv {
            scope,
            values,
            hidden: &unmasked,
        };

        let mut fields = Vec::with_capacity(entries.len());
        for entry in entries {
            if hidden.contains(entry.field.name) {
                continue;
            }

            let required = entry
                .required
                .as_ref()
                .is_some_and(|p| p.evaluate(&env));

            let children = match entry.field.ty {
                FieldType::Object(nested) => {
                    let nested_values = values
                        .and_then(|v| v.get(entry.field.name))
                        .and_then(Value::as_object);
                    Some(self.marshal_scope(nested, &entry.key, nested_values, inventory)?)
                }
                FieldType::ObjectArray(nested) => {
                    let zero = nested.zero_value()?;
                    Some(self.marshal_scope(nested, &entry.key, zero.as_object(), inventory)?)
                }
                _ => None,
            };

            let param = &entry.param;
            let candidates = match param.candidate_source {
                CandidateSource::Static => param.candidates.clone(),
                CandidateSource::PackageInventory => package_candidates(inventory),
            };

            fields.push(FieldSchema {
                key: entry.key.clone(),
                label_zh: param.label_zh.clone(),
                label_en: param.label_en.clone(),
                description_zh: param.description_zh.clone(),
                description_en: param.description_en.clone(),
                input_type: param.input_type,
                default: param.default.clone(),
                candidates,
                range: param.range,
                required,
                type_tag: entry.field.ty.into(),
                children,
            });
        }

        Ok(fields)
    }
}

/// Hide every field whose `visible` predicate fails, repeating until no
/// new field is hidden. A predicate that reads a hidden sibling fails, so
/// hiding propagates and the loop terminates.
fn resolve_hidden(
    scope: StructRef,
    values: Option<&Map<String, Value>>,
    entries: &[&Entry],
) -> HashSet<&'static str> {
    let mut hidden = HashSet::new();
    loop {
        let env = ScopeEnv {
            scope,
            values,
            hidden: &hidden,
        };
        let newly_hidden: Vec<&'static str> = entries
            .iter()
            .filter(|e| !hidden.contains(e.field.name))
            .filter(|e| e.visible.as_ref().is_some_and(|p| !p.evaluate(&env)))
            .map(|e| e.field.name)
            .collect();

        if newly_hidden.is_empty() {
            return hidden;
        }
        hidden.extend(newly_hidden);
    }
}

fn package_candidates(inventory: &dyn PackageInventory) -> Vec<Candidate> {
    match inventory.versions() {
        Ok(versions) => versions.into_iter().map(Candidate::bare).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list package versions, offering no candidates");
            Vec::new()
        }
    }
}

/// Sibling values of one structure scope.
struct ScopeEnv<'a> {
    scope: StructRef,
    values: Option<&'a Map<String, Value>>,
    hidden: &'a HashSet<&'static str>,
}

impl Environment for ScopeEnv<'_> {
    fn lookup(&self, name: &str) -> Option<(FieldType, &Value)> {
        if self.hidden.contains(name) {
            return None;
        }
        let field = self.scope.field(name)?;
        let value = self.values?.get(name)?;
        Some((field.ty, value))
    }
}
