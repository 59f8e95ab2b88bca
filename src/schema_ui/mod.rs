//! UI form schemas.
//!
//! # Data Flow
//! ```text
//! startup: create.rs / update.rs build ConfigParams → catalog.rs
//! request: kind → SchemaCatalog::get_schema → marshaled FieldSchema tree
//! ```

pub mod catalog;
pub mod create;
pub mod update;

pub use catalog::{CatalogError, SchemaCatalog, SCHEMA_CONFIG, SCHEMA_CREATE};
