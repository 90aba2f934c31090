//! # Entity API
//!
//! Maps schema-described entities to JSON and CSV for HTTP APIs, and back.
//!
//! ## Features
//!
//! - **Schema-Driven Mapping**: Entities carry their kind's finalized field layout
//! - **Wire Codecs**: Timestamps as epoch milliseconds, references and blob keys as strings
//! - **Lenient by Default**: Unknown names are skipped and reported, never fatal
//! - **CSV Import/Export**: Streamed CSV rendering and header-aware upload parsing
//! - **Validated Forms**: An axum extractor accepting JSON bodies and form posts
//! - **Configuration-Based**: Declare kind layouts in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use entity_api::prelude::*;
//!
//! let person = SchemaRegistry::global().register(
//!     Schema::builder("Person")
//!         .field("name", ValueKind::Generic)
//!         .field("created", ValueKind::Timestamp)
//!         .build()?,
//! )?;
//!
//! let ann = Entity::new(person.clone())
//!     .with_identity(Reference::new("Person", "abc123")?)
//!     .with("name", "Ann")?;
//!
//! let encoded = encode(&ann, &EncodeOptions::default())?;
//! let back = decode(&person, &encoded.value)?;
//! ```

pub mod config;
pub mod core;
pub mod forms;
pub mod mapper;
pub mod storage;
pub mod table;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        codec::CodecError,
        entity::{Encodable, Entity, Model},
        error::{
            ApiError, ApiResult, ConfigError, MappingError, RequestError, StorageError,
            ValidationError,
        },
        field::FieldValue,
        reference::{BlobKey, Cursor, Reference, ReferenceId, parse_optional_reference},
        registry::SchemaRegistry,
        schema::{FieldDescriptor, Schema, SchemaBuilder, ValueKind},
        service::{BlobInfo, BlobStore, Upload},
    };

    // === Mapper ===
    pub use crate::mapper::{
        ApiValue, Decoded, Diagnostic, EncodeOptions, Encoded, JsonEncoder, OneOrMany, decode,
        decode_json, decode_many, decode_model, dumps, encode,
    };

    // === CSV ===
    pub use crate::table::{CsvWriter, is_csv, parse_csv_upload, send_csv_download};

    // === Forms ===
    pub use crate::forms::{Formed, check_reference_kind, validate_form};

    // === Storage ===
    pub use crate::storage::InMemoryBlobStore;

    // === Config ===
    pub use crate::config::{KindConfig, SchemaConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use validator::Validate;
}
