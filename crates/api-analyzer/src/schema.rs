//! Canonical schema nodes describing API value shapes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A language-neutral description of a value's shape.
///
/// Produced by the type schema resolver for every parameter and payload type
/// it encounters. `required` is not part of the schema itself; it rides on
/// the [`ObjectField`] referencing the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Schema {
    /// A scalar with a canonical name ("Integer", "String", "DateTime", ...).
    /// Also the degraded form for unresolvable or cyclic types, carrying the
    /// type's literal textual name.
    Primitive { name: String },
    /// A composite with ordered named fields.
    Object {
        fields: IndexMap<String, ObjectField>,
        #[serde(rename = "ignoreUnknown", default, skip_serializing_if = "is_false")]
        ignore_unknown: bool,
    },
    /// A homogeneous collection.
    Array { items: Box<Schema> },
    /// A two-argument map.
    #[serde(rename_all = "camelCase")]
    Map {
        key_type: Box<Schema>,
        value_type: Box<Schema>,
    },
    /// An enumeration, carrying the serialized value type and the constant
    /// names in declaration order.
    #[serde(rename_all = "camelCase")]
    Enum {
        value_type: String,
        values: Vec<String>,
    },
    /// Placeholder for a persistence association skipped during resolution.
    Relation {},
}

impl Schema {
    pub fn primitive(name: impl Into<String>) -> Self {
        Schema::Primitive { name: name.into() }
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array {
            items: Box::new(items),
        }
    }

    pub fn map(key_type: Schema, value_type: Schema) -> Self {
        Schema::Map {
            key_type: Box::new(key_type),
            value_type: Box::new(value_type),
        }
    }
}

/// A named field inside an [`Schema::Object`], pairing the field's schema
/// with whether the field is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectField {
    #[serde(flatten)]
    pub schema: Schema,
    pub required: bool,
}

impl ObjectField {
    pub fn new(schema: Schema, required: bool) -> Self {
        Self { schema, required }
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}
