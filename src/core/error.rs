//! Typed error handling for the entity-api crate
//!
//! Errors are grouped by category so API handlers can match on the exact
//! failure instead of dealing with a generic `anyhow::Error`.
//!
//! # Error Categories
//!
//! - [`MappingError`]: entity/JSON conversion failures (bad references, bad values)
//! - [`ValidationError`]: form validation failures
//! - [`RequestError`]: malformed or empty request bodies
//! - [`StorageError`]: blob store collaborator failures
//! - [`ConfigError`]: schema configuration and registration problems
//!
//! Unknown fields are *not* errors: they are reported as
//! [`Diagnostic`](crate::mapper::Diagnostic)s next to the result.
//!
//! # Example
//!
//! ```rust,ignore
//! match mapper::decode(&schema, &payload) {
//!     Ok(decoded) => save(decoded.value),
//!     Err(ApiError::Mapping(MappingError::KindMismatch { field, .. })) => {
//!         println!("wrong reference kind in {:?}", field);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

use crate::core::codec::CodecError;

/// The main error type for the crate
#[derive(Debug)]
pub enum ApiError {
    /// Entity/JSON mapping errors
    Mapping(MappingError),

    /// Form validation errors
    Validation(ValidationError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Blob storage errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Mapping(e) => write!(f, "{}", e),
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::Request(e) => write!(f, "{}", e),
            ApiError::Storage(e) => write!(f, "{}", e),
            ApiError::Config(e) => write!(f, "{}", e),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Mapping(e) => Some(e),
            ApiError::Validation(e) => Some(e),
            ApiError::Request(e) => Some(e),
            ApiError::Storage(e) => Some(e),
            ApiError::Config(e) => Some(e),
            ApiError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Mapping(e) => e.status_code(),
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Request(e) => e.status_code(),
            ApiError::Storage(e) => e.status_code(),
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Mapping(e) => e.error_code(),
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Request(e) => e.error_code(),
            ApiError::Storage(e) => e.error_code(),
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Validation(ValidationError::FieldErrors(errors)) => {
                let fields: serde_json::Map<String, serde_json::Value> = errors
                    .iter()
                    .map(|e| (e.field.clone(), serde_json::Value::from(e.message.as_str())))
                    .collect();
                Some(serde_json::json!({ "fields": fields }))
            }
            ApiError::Mapping(MappingError::KindMismatch {
                field,
                expected,
                found,
            }) => Some(serde_json::json!({
                "field": field,
                "expected": expected,
                "found": found
            })),
            ApiError::Mapping(MappingError::InvalidValue { field, .. })
            | ApiError::Mapping(MappingError::InvalidReference {
                field: Some(field), ..
            }) => Some(serde_json::json!({ "field": field })),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors raised while converting between entities and JSON
#[derive(Debug)]
pub enum MappingError {
    /// Reference string could not be parsed
    InvalidReference {
        field: Option<String>,
        value: String,
        reason: String,
    },

    /// Reference parsed but points at the wrong kind
    KindMismatch {
        field: Option<String>,
        expected: String,
        found: String,
    },

    /// JSON value has the wrong shape for the declared field type
    InvalidValue {
        field: String,
        expected: String,
        found: String,
    },

    /// Value has no JSON representation
    Unserializable {
        type_name: String,
    },

    /// No schema registered under this kind
    UnknownKind {
        kind: String,
    },

    /// Malformed delimited text
    Csv {
        message: String,
    },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::InvalidReference {
                field,
                value,
                reason,
            } => match field {
                Some(field) => write!(
                    f,
                    "Invalid reference '{}' for field '{}': {}",
                    value, field, reason
                ),
                None => write!(f, "Invalid reference '{}': {}", value, reason),
            },
            MappingError::KindMismatch {
                field,
                expected,
                found,
            } => match field {
                Some(field) => write!(
                    f,
                    "Field '{}' expects a reference of kind '{}', got '{}'",
                    field, expected, found
                ),
                None => write!(
                    f,
                    "Expected a reference of kind '{}', got '{}'",
                    expected, found
                ),
            },
            MappingError::InvalidValue {
                field,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Invalid value for field '{}': expected {}, got {}",
                    field, expected, found
                )
            }
            MappingError::Unserializable { type_name } => {
                write!(f, "Object of type '{}' is not JSON serializable", type_name)
            }
            MappingError::UnknownKind { kind } => {
                write!(f, "No schema registered for kind '{}'", kind)
            }
            MappingError::Csv { message } => write!(f, "CSV error: {}", message),
        }
    }
}

impl std::error::Error for MappingError {}

impl MappingError {
    /// Attach the field being converted to a codec failure
    pub fn from_codec(field: Option<&str>, err: CodecError) -> Self {
        let field = field.map(str::to_string);
        match err {
            CodecError::InvalidReference { value, reason } => MappingError::InvalidReference {
                field,
                value,
                reason,
            },
            CodecError::KindMismatch { expected, found } => MappingError::KindMismatch {
                field,
                expected,
                found,
            },
            other => MappingError::InvalidValue {
                field: field.unwrap_or_default(),
                expected: "a convertible value".to_string(),
                found: other.to_string(),
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            MappingError::InvalidReference { .. } => StatusCode::BAD_REQUEST,
            MappingError::KindMismatch { .. } => StatusCode::BAD_REQUEST,
            MappingError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            MappingError::Unserializable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            MappingError::UnknownKind { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            MappingError::Csv { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            MappingError::InvalidReference { .. } => "INVALID_REFERENCE",
            MappingError::KindMismatch { .. } => "REFERENCE_KIND_MISMATCH",
            MappingError::InvalidValue { .. } => "INVALID_FIELD_VALUE",
            MappingError::Unserializable { .. } => "UNSERIALIZABLE_TYPE",
            MappingError::UnknownKind { .. } => "UNKNOWN_KIND",
            MappingError::Csv { .. } => "CSV_ERROR",
        }
    }
}

impl From<MappingError> for ApiError {
    fn from(err: MappingError) -> Self {
        ApiError::Mapping(err)
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        ApiError::Mapping(MappingError::from_codec(None, err))
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to form validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON format
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Request carried no usable payload
    BadRequest { message: String },

    /// Body could not be read or parsed
    InvalidBody { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::BadRequest { message } => write!(f, "Bad request: {}", message),
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::BadRequest { .. } => "BAD_REQUEST",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        ApiError::Request(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by the blob store collaborator
#[derive(Debug)]
pub enum StorageError {
    /// No blob stored under this key
    BlobNotFound { key: String },

    /// Backend operation failed
    OperationFailed { operation: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::BlobNotFound { key } => write!(f, "Blob '{}' not found", key),
            StorageError::OperationFailed { operation, message } => {
                write!(f, "Blob {} failed: {}", operation, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl StorageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StorageError::BlobNotFound { .. } => StatusCode::NOT_FOUND,
            StorageError::OperationFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::BlobNotFound { .. } => "BLOB_NOT_FOUND",
            StorageError::OperationFailed { .. } => "STORAGE_ERROR",
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to schema configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },

    /// Schema definition is not well formed
    InvalidSchema { kind: String, message: String },

    /// A different schema is already registered under this kind
    SchemaConflict { kind: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => write!(f, "IO error: {}", message),
            ConfigError::InvalidSchema { kind, message } => {
                write!(f, "Invalid schema for kind '{}': {}", kind, message)
            }
            ConfigError::SchemaConflict { kind } => {
                write!(
                    f,
                    "A different schema is already registered for kind '{}'",
                    kind
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::Config(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for ApiError {
    fn from(err: serde_yaml::Error) -> Self {
        ApiError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::Mapping(MappingError::Csv {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for entity-api operations
pub type ApiResult<T> = Result<T, ApiError>;
