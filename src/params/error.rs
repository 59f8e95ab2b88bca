//! Schema registry error definitions.

use thiserror::Error;

use crate::params::predicate::PredicateError;

/// Configuration-time registration mistakes. These are programmer errors.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// The field does not exist on the registered type.
    #[error("type {type_name} has no field named '{field}'")]
    UnknownField {
        type_name: &'static str,
        field: String,
    },

    /// A `visible` or `required` predicate failed to parse.
    #[error("invalid {which} predicate on '{key}': {source}")]
    InvalidPredicate {
        key: String,
        which: &'static str,
        #[source]
        source: PredicateError,
    },
}

/// Errors produced while marshaling a schema.
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The configuration instance could not be serialized.
    #[error("failed to serialize configuration instance: {0}")]
    Serialize(#[from] serde_json::Error),
}
