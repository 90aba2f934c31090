//! Per-kind field schemas
//!
//! A [`Schema`] lists the declared fields of one entity kind, in declaration
//! order, together with optional computed accessors that `includes` can
//! resolve during encoding. Schemas are finalized once by
//! [`SchemaBuilder::build`] and never change afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::entity::Entity;
use crate::core::error::ConfigError;
use crate::core::field::FieldValue;

/// Names injected by the encoder; fields may not use them
pub const IDENTITY_KEY: &str = "identity";
pub const IDENTITY_RAW_ID_KEY: &str = "identity_raw_id";

/// How a field's values are converted to and from JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Epoch milliseconds on the wire
    Timestamp,
    /// Epoch milliseconds of midnight UTC on the wire
    Date,
    /// Url-safe reference string on the wire
    Reference,
    /// Raw blob identifier on the wire
    Blob,
    /// Passed through unchanged
    Generic,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Timestamp => "timestamp",
            ValueKind::Date => "date",
            ValueKind::Reference => "reference",
            ValueKind::Blob => "blob",
            ValueKind::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// Schema metadata for one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,

    #[serde(rename = "type")]
    pub value_kind: ValueKind,

    #[serde(default)]
    pub repeated: bool,

    /// For reference fields: the kind the referenced entity must have
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_kind: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            value_kind,
            repeated: false,
            reference_kind: None,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn of_kind(mut self, kind: impl Into<String>) -> Self {
        self.reference_kind = Some(kind.into());
        self
    }
}

/// Zero-argument computed property evaluated against an entity
pub type Accessor = Arc<dyn Fn(&Entity) -> FieldValue + Send + Sync>;

/// Finalized field layout of one entity kind
#[derive(Clone)]
pub struct Schema {
    kind: String,
    fields: IndexMap<String, FieldDescriptor>,
    accessors: IndexMap<String, Accessor>,
}

impl Schema {
    /// Start declaring a schema for `kind`
    pub fn builder(kind: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(kind)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Look up a declared field
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.accessors.get(name)
    }

    /// Two schemas describe the same layout (accessors are not compared)
    pub fn same_layout(&self, other: &Schema) -> bool {
        self.kind == other.kind && self.fields == other.fields
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind)
            .field("fields", &self.fields.values().collect::<Vec<_>>())
            .field("accessors", &self.accessors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder collecting field declarations until [`SchemaBuilder::build`]
pub struct SchemaBuilder {
    kind: String,
    fields: Vec<FieldDescriptor>,
    accessors: Vec<(String, Accessor)>,
}

impl SchemaBuilder {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Declare a singular field
    pub fn field(mut self, name: impl Into<String>, value_kind: ValueKind) -> Self {
        self.fields.push(FieldDescriptor::new(name, value_kind));
        self
    }

    /// Declare a repeated field
    pub fn repeated(mut self, name: impl Into<String>, value_kind: ValueKind) -> Self {
        self.fields
            .push(FieldDescriptor::new(name, value_kind).repeated());
        self
    }

    /// Declare a fully described field
    pub fn descriptor(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    /// Register a computed property that `includes` may ask for
    pub fn accessor<F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&Entity) -> FieldValue + Send + Sync + 'static,
    {
        self.accessors.push((name.into(), Arc::new(accessor)));
        self
    }

    /// Validate the declarations and freeze them
    pub fn build(self) -> Result<Schema, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidSchema {
            kind: self.kind.clone(),
            message,
        };

        if self.kind.is_empty() {
            return Err(invalid("kind must not be empty".to_string()));
        }

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for descriptor in &self.fields {
            check_name(&descriptor.name).map_err(&invalid)?;
            if descriptor.reference_kind.is_some() && descriptor.value_kind != ValueKind::Reference
            {
                return Err(invalid(format!(
                    "field '{}' names a reference kind but is of type {}",
                    descriptor.name, descriptor.value_kind
                )));
            }
            if fields
                .insert(descriptor.name.clone(), descriptor.clone())
                .is_some()
            {
                return Err(invalid(format!("field '{}' declared twice", descriptor.name)));
            }
        }

        let mut accessors = IndexMap::with_capacity(self.accessors.len());
        for (name, accessor) in &self.accessors {
            check_name(name).map_err(&invalid)?;
            if fields.contains_key(name) || accessors.contains_key(name) {
                return Err(invalid(format!("accessor '{}' shadows another name", name)));
            }
            accessors.insert(name.clone(), Arc::clone(accessor));
        }

        Ok(Schema {
            kind: self.kind.clone(),
            fields,
            accessors,
        })
    }
}

fn check_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("field names must not be empty".to_string());
    }
    if name == IDENTITY_KEY || name == IDENTITY_RAW_ID_KEY {
        return Err(format!("'{}' is reserved for the entity identity", name));
    }
    Ok(())
}
