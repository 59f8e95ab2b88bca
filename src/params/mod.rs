//! Parameter schema subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     Reflect tables (reflect.rs)
//!     → ConfigParams::must_register (registry.rs, predicates parsed by predicate.rs)
//!
//! per request:
//!     ConfigParams + configuration instance + package inventory
//!     → marshal.rs (visibility, requiredness, nesting)
//!     → Vec<FieldSchema> (the client's form description)
//! ```
//!
//! # Design Decisions
//! - Registries are write-once, then shared read-only
//! - Predicate evaluation never fails; unresolvable means `false`

pub mod error;
pub mod marshal;
pub mod parameter;
pub mod predicate;
pub mod reflect;
pub mod registry;

pub use error::{MarshalError, RegisterError};
pub use marshal::{FieldSchema, TypeTag};
pub use parameter::{Candidate, CandidateSource, InputType, Parameter, Range};
pub use predicate::{Predicate, PredicateError};
pub use reflect::{FieldDef, FieldType, Reflect, StructRef};
pub use registry::ConfigParams;
