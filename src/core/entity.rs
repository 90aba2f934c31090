//! Entity records and the capability traits the mapper works against

use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::core::error::{ApiError, MappingError};
use crate::core::field::FieldValue;
use crate::core::reference::Reference;
use crate::core::schema::Schema;

static EMPTY_LIST: FieldValue = FieldValue::List(Vec::new());

/// An instance of a kind: declared field values, optional undeclared
/// attributes and the identity assigned by the datastore.
#[derive(Clone)]
pub struct Entity {
    schema: Arc<Schema>,
    identity: Option<Reference>,
    values: IndexMap<String, FieldValue>,
    attributes: IndexMap<String, FieldValue>,
}

impl Entity {
    /// Create an empty, unsaved entity of the schema's kind
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            identity: None,
            values: IndexMap::new(),
            attributes: IndexMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn kind(&self) -> &str {
        self.schema.kind()
    }

    /// Identity assigned by the datastore, `None` until saved
    pub fn identity(&self) -> Option<&Reference> {
        self.identity.as_ref()
    }

    /// Record the identity handed out by the persistence layer
    pub fn assign_identity(&mut self, identity: Reference) {
        self.identity = Some(identity);
    }

    pub fn with_identity(mut self, identity: Reference) -> Self {
        self.assign_identity(identity);
        self
    }

    /// Value of a declared field.
    ///
    /// Unset fields read as null, or as an empty list when repeated.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        let descriptor = self.schema.field(name)?;
        match self.values.get(name) {
            Some(value) => Some(value),
            None if descriptor.repeated => Some(&EMPTY_LIST),
            None => Some(&FieldValue::Null),
        }
    }

    /// Set a declared field
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), ApiError> {
        if self.schema.field(name).is_none() {
            return Err(MappingError::InvalidValue {
                field: name.to_string(),
                expected: format!("a field declared on '{}'", self.kind()),
                found: "undeclared field".to_string(),
            }
            .into());
        }
        let value = self.normalize(name, value.into());
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Builder-style [`Entity::set`]
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Result<Self, ApiError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Set several declared fields at once; nothing is applied if any name is undeclared
    pub fn populate(&mut self, values: IndexMap<String, FieldValue>) -> Result<(), ApiError> {
        if let Some(name) = values.keys().find(|name| self.schema.field(name).is_none()) {
            return Err(MappingError::InvalidValue {
                field: name.clone(),
                expected: format!("a field declared on '{}'", self.kind()),
                found: "undeclared field".to_string(),
            }
            .into());
        }
        let normalized: Vec<(String, FieldValue)> = values
            .into_iter()
            .map(|(name, value)| {
                let value = self.normalize(&name, value);
                (name, value)
            })
            .collect();
        self.values.extend(normalized);
        Ok(())
    }

    // A repeated field never holds null
    fn normalize(&self, name: &str, value: FieldValue) -> FieldValue {
        match (self.schema.field(name), value) {
            (Some(descriptor), FieldValue::Null) if descriptor.repeated => {
                FieldValue::List(Vec::new())
            }
            (_, value) => value,
        }
    }

    /// Attach an undeclared attribute, only visible to encoding `includes`
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&FieldValue> {
        self.attributes.get(name)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.identity == other.identity
            && self
                .schema
                .fields()
                .all(|field| self.get(&field.name) == other.get(&field.name))
            && self.attributes == other.attributes
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &self.kind())
            .field("identity", &self.identity)
            .field("values", &self.values)
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// Pretty form: `<Kind:` followed by one indented line per non-null field
impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:", self.kind())?;
        for field in self.schema.fields() {
            match self.values.get(&field.name) {
                None | Some(FieldValue::Null) => {}
                Some(value) => write!(f, "\n  {}: {:?}", field.name, value)?,
            }
        }
        write!(f, ">")
    }
}

/// Anything the mapper can encode: exposes itself as an [`Entity`]
pub trait Encodable {
    fn as_entity(&self) -> Cow<'_, Entity>;
}

impl Encodable for Entity {
    fn as_entity(&self) -> Cow<'_, Entity> {
        Cow::Borrowed(self)
    }
}

/// Strongly typed entity that can be rebuilt from a decoded [`Entity`]
///
/// # Example
///
/// ```rust,ignore
/// struct Person { name: String }
///
/// impl Encodable for Person {
///     fn as_entity(&self) -> Cow<'_, Entity> {
///         let mut entity = Entity::new(Person::schema());
///         entity.set("name", self.name.as_str()).ok();
///         Cow::Owned(entity)
///     }
/// }
///
/// impl Model for Person {
///     fn schema() -> Arc<Schema> { /* registry lookup */ }
///     fn from_entity(entity: Entity) -> Result<Self, ApiError> { /* ... */ }
/// }
/// ```
pub trait Model: Encodable + Sized {
    /// Schema this type is stored under
    fn schema() -> Arc<Schema>;

    /// Rebuild the typed value from a decoded entity
    fn from_entity(entity: Entity) -> Result<Self, ApiError>;
}
