//! Process-wide registry of finalized schemas
//!
//! Schemas are registered once (at startup or lazily on first use) and read
//! concurrently afterwards.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::core::error::{ConfigError, MappingError};
use crate::core::schema::Schema;

/// Registry for all schemas known to the application, keyed by kind
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// The shared process-wide registry
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    /// Register a schema under its kind.
    ///
    /// Registering a schema with the same layout again returns the schema
    /// already stored; a different layout under the same kind is rejected.
    pub fn register(&self, schema: Schema) -> Result<Arc<Schema>, ConfigError> {
        let mut schemas = self
            .schemas
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(existing) = schemas.get(schema.kind()) {
            if existing.same_layout(&schema) {
                return Ok(Arc::clone(existing));
            }
            return Err(ConfigError::SchemaConflict {
                kind: schema.kind().to_string(),
            });
        }

        tracing::debug!(kind = schema.kind(), "registered schema");
        let schema = Arc::new(schema);
        schemas.insert(schema.kind().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Get the schema for a kind
    pub fn get(&self, kind: &str) -> Option<Arc<Schema>> {
        self.schemas
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(kind)
            .cloned()
    }

    /// Get the schema for a kind or fail with [`MappingError::UnknownKind`]
    pub fn require(&self, kind: &str) -> Result<Arc<Schema>, MappingError> {
        self.get(kind).ok_or_else(|| MappingError::UnknownKind {
            kind: kind.to_string(),
        })
    }

    /// Get all registered kinds
    pub fn kinds(&self) -> Vec<String> {
        self.schemas
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::ValueKind;

    fn person(extra: bool) -> Schema {
        let builder = Schema::builder("Person").field("name", ValueKind::Generic);
        let builder = if extra {
            builder.field("created", ValueKind::Timestamp)
        } else {
            builder
        };
        builder.build().unwrap()
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = SchemaRegistry::new();
        assert!(registry.kinds().is_empty());
        assert!(registry.get("Person").is_none());
    }

    #[test]
    fn test_register_and_get() {
        let registry = SchemaRegistry::new();
        registry.register(person(false)).unwrap();
        assert_eq!(registry.get("Person").unwrap().kind(), "Person");
        assert_eq!(registry.kinds(), vec!["Person".to_string()]);
    }

    #[test]
    fn test_register_same_layout_is_idempotent() {
        let registry = SchemaRegistry::new();
        let first = registry.register(person(false)).unwrap();
        let second = registry.register(person(false)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_register_conflicting_layout_fails() {
        let registry = SchemaRegistry::new();
        registry.register(person(false)).unwrap();
        assert!(matches!(
            registry.register(person(true)),
            Err(ConfigError::SchemaConflict { .. })
        ));
    }

    #[test]
    fn test_require_unknown_kind() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.require("Ghost"),
            Err(MappingError::UnknownKind { .. })
        ));
    }

    #[test]
    fn test_global_registry_is_shared() {
        let a = SchemaRegistry::global() as *const SchemaRegistry;
        let b = SchemaRegistry::global() as *const SchemaRegistry;
        assert_eq!(a, b);
    }
}
