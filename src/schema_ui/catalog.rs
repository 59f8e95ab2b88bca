//! Named schema lookup.
//!
//! # Responsibilities
//! - Build every registered schema once, at startup
//! - Resolve a requested kind (case-insensitive) to its registry
//! - Marshal it against a default-initialized cluster configuration

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::model::ClusterConfig;
use crate::packages::PackageInventory;
use crate::params::{ConfigParams, FieldSchema, MarshalError};
use crate::schema_ui::create::register_create_cluster_schema;
use crate::schema_ui::update::register_update_config_schema;

pub const SCHEMA_CREATE: &str = "create";
pub const SCHEMA_CONFIG: &str = "config";

type SchemaBuilder = fn() -> ConfigParams;

const SCHEMA_BUILDERS: &[(&str, SchemaBuilder)] = &[
    (SCHEMA_CREATE, register_create_cluster_schema),
    (SCHEMA_CONFIG, register_update_config_schema),
];

/// Errors returned to schema clients.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("schema type is required")]
    MissingKind,

    #[error("type {0} is not registered")]
    NotRegistered(String),

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

/// All schemas served to UI clients.
pub struct SchemaCatalog {
    schemas: HashMap<&'static str, ConfigParams>,
    inventory: Arc<dyn PackageInventory>,
}

impl SchemaCatalog {
    /// Build every registered schema.
    pub fn new(inventory: Arc<dyn PackageInventory>) -> Self {
        let schemas: HashMap<_, _> = SCHEMA_BUILDERS
            .iter()
            .map(|(kind, build)| (*kind, build()))
            .collect();

        tracing::info!(kinds = ?schemas.keys().collect::<Vec<_>>(), "Schema catalog initialized");
        Self { schemas, inventory }
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.schemas.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    /// `kind` as a registered kind name, or `unknown`. Safe as a metric label.
    pub fn kind_label(&self, kind: &str) -> &'static str {
        self.schemas
            .get_key_value(kind.to_lowercase().as_str())
            .map(|(name, _)| *name)
            .unwrap_or("unknown")
    }

    /// Marshal the schema registered under `kind`.
    pub fn get_schema(&self, kind: &str) -> Result<Vec<FieldSchema>, CatalogError> {
        if kind.is_empty() {
            return Err(CatalogError::MissingKind);
        }

        let params = self
            .schemas
            .get(kind.to_lowercase().as_str())
            .ok_or_else(|| CatalogError::NotRegistered(kind.to_string()))?;

        Ok(params.marshal(&ClusterConfig::default(), self.inventory.as_ref())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::InventoryError;

    struct Versions;

    impl PackageInventory for Versions {
        fn versions(&self) -> Result<Vec<String>, InventoryError> {
            Ok(vec!["22.3.2.2".to_string()])
        }
    }

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new(Arc::new(Versions))
    }

    #[test]
    fn test_kinds() {
        assert_eq!(catalog().kinds(), vec![SCHEMA_CONFIG, SCHEMA_CREATE]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let schema = catalog().get_schema("CREATE").unwrap();
        assert_eq!(schema[0].key, "Cluster");
    }

    #[test]
    fn test_missing_and_unknown_kind() {
        let catalog = catalog();
        assert!(matches!(catalog.get_schema(""), Err(CatalogError::MissingKind)));
        match catalog.get_schema("Delete") {
            Err(CatalogError::NotRegistered(kind)) => assert_eq!(kind, "Delete"),
            other => panic!("unexpected result: {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_kind_label_is_bounded() {
        let catalog = catalog();
        assert_eq!(catalog.kind_label("Create"), SCHEMA_CREATE);
        assert_eq!(catalog.kind_label("config"), SCHEMA_CONFIG);
        assert_eq!(catalog.kind_label("delete"), "unknown");
        assert_eq!(catalog.kind_label(""), "unknown");
    }

    #[test]
    fn test_create_schema_defaults() {
        let schema = catalog().get_schema(SCHEMA_CREATE).unwrap();
        let keys: Vec<_> = schema.iter().map(|f| f.key.as_str()).collect();

        // Public-key auth by default: no SSH password. Not replicated: no manual shards.
        assert!(!keys.contains(&"SshPassword"));
        assert!(!keys.contains(&"ManualShards"));
        assert_eq!(keys.last(), Some(&"Version"));

        // Requiredness reads ManualShards (false) even though it is hidden.
        let hosts = schema.iter().find(|f| f.key == "Hosts").unwrap();
        assert!(hosts.required);
        let shards = schema.iter().find(|f| f.key == "Shards").unwrap();
        assert!(!shards.required);
        let replica = shards.children.as_ref().unwrap()[0].children.as_ref().unwrap();
        assert_eq!(replica.len(), 1);
        assert_eq!(replica[0].key, "Shards.Replicas.Ip");

        let version = schema.last().unwrap();
        assert_eq!(version.candidates.len(), 1);
        assert_eq!(version.candidates[0].value, "22.3.2.2");
    }
}
