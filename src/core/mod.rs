//! Core module containing the value types, schemas and errors of the crate

pub mod codec;
pub mod entity;
pub mod error;
pub mod field;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod service;

pub use codec::CodecError;
pub use entity::{Encodable, Entity, Model};
pub use error::{ApiError, ApiResult, MappingError};
pub use field::FieldValue;
pub use reference::{BlobKey, Cursor, Reference, ReferenceId};
pub use registry::SchemaRegistry;
pub use schema::{FieldDescriptor, Schema, SchemaBuilder, ValueKind};
pub use service::{BlobInfo, BlobStore, Upload};
