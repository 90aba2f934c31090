//! Schema configuration loading
//!
//! Kind layouts can be declared in YAML instead of code:
//!
//! ```yaml
//! kinds:
//!   - kind: Person
//!     fields:
//!       - { name: name, type: generic }
//!       - { name: created, type: timestamp }
//!       - { name: employer, type: reference, reference_kind: Company }
//!       - { name: photos, type: blob, repeated: true }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::core::error::{ApiResult, ConfigError};
use crate::core::registry::SchemaRegistry;
use crate::core::schema::{FieldDescriptor, Schema};

/// Field layout of one entity kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindConfig {
    pub kind: String,

    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl KindConfig {
    /// Validate the layout into a finalized schema
    pub fn build_schema(&self) -> Result<Schema, ConfigError> {
        self.fields
            .iter()
            .cloned()
            .fold(Schema::builder(&self.kind), |builder, field| {
                builder.descriptor(field)
            })
            .build()
    }
}

/// Complete schema configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub kinds: Vec<KindConfig>,
}

impl SchemaConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                file: Some(path.display().to_string()),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> ApiResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Merge another configuration; kinds from `other` replace same-named ones
    pub fn merge(mut self, other: SchemaConfig) -> Self {
        for incoming in other.kinds {
            match self.kinds.iter_mut().find(|k| k.kind == incoming.kind) {
                Some(existing) => *existing = incoming,
                None => self.kinds.push(incoming),
            }
        }
        self
    }

    /// Build every declared schema without registering any of them
    pub fn build_schemas(&self) -> ApiResult<Vec<Schema>> {
        self.kinds
            .iter()
            .map(|kind| kind.build_schema().map_err(Into::into))
            .collect()
    }

    /// Build and register every declared kind.
    ///
    /// All schemas are built and checked for layout conflicts, against the
    /// registry and against each other, before the first registration. A
    /// broken or conflicting entry leaves the registry untouched.
    pub fn register_all(&self, registry: &SchemaRegistry) -> ApiResult<Vec<Arc<Schema>>> {
        let schemas = self.build_schemas()?;
        for (index, schema) in schemas.iter().enumerate() {
            let registered = registry
                .get(schema.kind())
                .is_some_and(|existing| !existing.same_layout(schema));
            let repeated = schemas[..index]
                .iter()
                .any(|earlier| earlier.kind() == schema.kind() && !earlier.same_layout(schema));
            if registered || repeated {
                return Err(ConfigError::SchemaConflict {
                    kind: schema.kind().to_string(),
                }
                .into());
            }
        }

        let registered = schemas
            .into_iter()
            .map(|schema| registry.register(schema).map_err(Into::into))
            .collect::<ApiResult<Vec<_>>>()?;

        tracing::debug!(kinds = registered.len(), "registered configured schemas");
        Ok(registered)
    }
}
