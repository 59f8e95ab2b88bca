//! Parameter registry.
//!
//! # Responsibilities
//! - Map dotted field paths to parameter descriptors, in insertion order
//! - Resolve the path of a field from the registrations of its parents
//! - Parse predicates once, when the descriptor is registered
//!
//! # Path Resolution
//! ```text
//! register::<ClusterConfig>("Shards")   → "Shards"   (Shard now lives under "Shards")
//! register::<Shard>("Replicas")         → "Shards.Replicas"
//! register::<Replica>("Ip")             → "Shards.Replicas.Ip"
//! register::<Disk>("Name")              → "Name"     (Disk has no parent yet)
//! ```
//!
//! # Design Decisions
//! - Populated once at startup, read-only afterwards
//! - Re-registering a key replaces the descriptor but keeps its slot

use std::any::TypeId;
use std::collections::HashMap;

use crate::params::error::RegisterError;
use crate::params::parameter::Parameter;
use crate::params::predicate::Predicate;
use crate::params::reflect::{FieldDef, Reflect, StructRef};

/// A registered descriptor with its resolved position.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) key: String,
    /// Path of the containing structure, empty at top level.
    pub(crate) parent: String,
    pub(crate) owner: StructRef,
    pub(crate) field: &'static FieldDef,
    pub(crate) param: Parameter,
    pub(crate) visible: Option<Predicate>,
    pub(crate) required: Option<Predicate>,
}

/// Ordered registry of parameter descriptors.
#[derive(Debug, Clone, Default)]
pub struct ConfigParams {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    /// Path under which each structure type was registered as a field.
    prefixes: HashMap<TypeId, String>,
}

impl ConfigParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor for `field` of `T`, returning its resolved key.
    pub fn register<T: Reflect>(
        &mut self,
        field: &str,
        param: Parameter,
    ) -> Result<String, RegisterError> {
        let owner = StructRef::of::<T>();
        let field_def = owner.field(field).ok_or_else(|| RegisterError::UnknownField {
            type_name: T::TYPE_NAME,
            field: field.to_string(),
        })?;

        let parent = self
            .prefixes
            .get(&owner.type_id())
            .cloned()
            .unwrap_or_default();
        let key = if parent.is_empty() {
            field_def.name.to_string()
        } else {
            format!("{}.{}", parent, field_def.name)
        };

        let visible = parse_predicate(&key, "visible", param.visible.as_deref())?;
        let required = parse_predicate(&key, "required", param.required.as_deref())?;

        if let Some(nested) = field_def.ty.nested() {
            self.prefixes.insert(nested.type_id(), key.clone());
        }

        let entry = Entry {
            key: key.clone(),
            parent,
            owner,
            field: field_def,
            param,
            visible,
            required,
        };

        match self.index.get(&key) {
            Some(&slot) => {
                tracing::trace!(key = %key, "Replacing parameter descriptor");
                self.entries[slot] = entry;
            }
            None => {
                tracing::trace!(key = %key, "Registering parameter descriptor");
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }

        Ok(key)
    }

    /// Register a descriptor, treating any failure as a programming error.
    ///
    /// # Panics
    /// Panics if `field` is not a field of `T` or a predicate does not parse.
    pub fn must_register<T: Reflect>(&mut self, field: &str, param: Parameter) {
        if let Err(e) = self.register::<T>(field, param) {
            panic!("parameter registration failed: {}", e);
        }
    }

    /// Descriptor registered under `key`.
    pub fn get(&self, key: &str) -> Option<&Parameter> {
        self.index.get(key).map(|&i| &self.entries[i].param)
    }

    /// Registered keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries declared on `owner` under `parent`, in insertion order.
    pub(crate) fn scope<'a>(
        &'a self,
        owner: StructRef,
        parent: &'a str,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.owner == owner && e.parent == parent)
    }
}

fn parse_predicate(
    key: &str,
    which: &'static str,
    source: Option<&str>,
) -> Result<Option<Predicate>, RegisterError> {
    source
        .map(Predicate::parse)
        .transpose()
        .map_err(|source| RegisterError::InvalidPredicate {
            key: key.to_string(),
            which,
            source,
        })
}
