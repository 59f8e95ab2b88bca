//! Static field tables for configuration structures.
//!
//! # Responsibilities
//! - Declare, per configuration type, its fields in order with their types
//! - Identify nested structure types so the registry can build dotted paths
//! - Produce the zero value of a type for template rendering
//!
//! # Design Decisions
//! - No runtime introspection: each type lists its fields once, by hand
//! - Field names are the serialized (PascalCase) names, so they double as
//!   schema keys and predicate identifiers
//! - Values are read from the instance's `serde_json` tree

use std::any::TypeId;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// A configuration structure that can be described by a schema registry.
pub trait Reflect: Serialize + Default + 'static {
    /// Human readable type name, used in registration errors.
    const TYPE_NAME: &'static str;

    /// Fields in declaration order.
    fn fields() -> &'static [FieldDef];
}

/// One field of a reflected structure.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldDef {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    String,
    /// Sequence of scalars.
    Array,
    /// Free-form string map.
    Map,
    /// Nested structure (possibly optional).
    Object(StructRef),
    /// Sequence of nested structures.
    ObjectArray(StructRef),
}

impl FieldType {
    /// The structure this field expands into, if any.
    pub fn nested(&self) -> Option<StructRef> {
        match self {
            FieldType::Object(s) | FieldType::ObjectArray(s) => Some(*s),
            _ => None,
        }
    }
}

/// Type-erased handle to a `Reflect` type.
#[derive(Clone, Copy)]
pub struct StructRef {
    name: &'static str,
    type_id: fn() -> TypeId,
    fields: fn() -> &'static [FieldDef],
    zero: fn() -> serde_json::Result<Value>,
}

impl StructRef {
    pub const fn of<T: Reflect>() -> Self {
        Self {
            name: T::TYPE_NAME,
            type_id: TypeId::of::<T>,
            fields: T::fields,
            zero: zero_value::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    pub fn fields(&self) -> &'static [FieldDef] {
        (self.fields)()
    }

    /// Look up a direct field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Serialized form of `T::default()`.
    pub fn zero_value(&self) -> serde_json::Result<Value> {
        (self.zero)()
    }
}

impl PartialEq for StructRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id() == other.type_id()
    }
}

impl Eq for StructRef {}

impl fmt::Debug for StructRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StructRef").field(&self.name).finish()
    }
}

fn zero_value<T: Reflect>() -> serde_json::Result<Value> {
    serde_json::to_value(T::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Default, Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Inner {
        name: String,
    }

    impl Reflect for Inner {
        const TYPE_NAME: &'static str = "Inner";
        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[FieldDef::new("Name", FieldType::String)];
            FIELDS
        }
    }

    #[derive(Default, Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Outer {
        items: Vec<Inner>,
    }

    impl Reflect for Outer {
        const TYPE_NAME: &'static str = "Outer";
        fn fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[FieldDef::new(
                "Items",
                FieldType::ObjectArray(StructRef::of::<Inner>()),
            )];
            FIELDS
        }
    }

    #[test]
    fn test_struct_ref_lookup() {
        let outer = StructRef::of::<Outer>();
        let items = outer.field("Items").unwrap();
        assert_eq!(items.ty.nested(), Some(StructRef::of::<Inner>()));
        assert!(outer.field("Missing").is_none());
        assert_ne!(outer, StructRef::of::<Inner>());
    }

    #[test]
    fn test_zero_value() {
        let zero = StructRef::of::<Inner>().zero_value().unwrap();
        assert_eq!(zero, serde_json::json!({ "Name": "" }));
    }
}
