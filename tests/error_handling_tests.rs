//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Error conversions work correctly

use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use entity_api::core::error::{ErrorResponse, FieldValidationError};
use entity_api::prelude::*;
use serde_json::Value;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_invalid_reference_returns_400() {
        let err: ApiError = MappingError::InvalidReference {
            field: Some("owner".to_string()),
            value: "???".to_string(),
            reason: "not base64".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_REFERENCE");
    }

    #[test]
    fn test_unknown_kind_and_unserializable() {
        let err: ApiError = MappingError::UnknownKind {
            kind: "Ghost".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "UNKNOWN_KIND");

        let err: ApiError = MappingError::Unserializable {
            type_name: "Socket".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_returns_400() {
        let err: ApiError = ValidationError::FieldError {
            field: "email".to_string(),
            message: "Invalid email address.".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_config_returns_500() {
        let err: ApiError = ConfigError::SchemaConflict {
            kind: "Person".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}

// =============================================================================
// Response Format Tests
// =============================================================================

mod response_tests {
    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_kind_mismatch_details() {
        let (status, body) = body_of(
            MappingError::KindMismatch {
                field: Some("employer".to_string()),
                expected: "Company".to_string(),
                found: "Person".to_string(),
            }
            .into(),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "REFERENCE_KIND_MISMATCH");
        assert_eq!(body["details"]["expected"], "Company");
        assert_eq!(body["details"]["found"], "Person");
        assert_eq!(body["details"]["field"], "employer");
    }

    #[tokio::test]
    async fn test_field_errors_details() {
        let (_, body) = body_of(
            ValidationError::FieldErrors(vec![FieldValidationError {
                field: "name".to_string(),
                message: "Name is required.".to_string(),
            }])
            .into(),
        )
        .await;

        assert_eq!(body["details"]["fields"]["name"], "Name is required.");
        assert!(body["message"].as_str().unwrap().contains("name"));
    }

    #[test]
    fn test_details_omitted_when_absent() {
        let err = ApiError::Internal("boom".to_string());
        let response: ErrorResponse = err.to_response();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }
}

// =============================================================================
// Conversion Tests
// =============================================================================

mod conversion_tests {
    use super::*;

    #[test]
    fn test_codec_error_converts() {
        let err: ApiError = CodecError::EmptyBlobKey.into();
        assert!(matches!(err, ApiError::Mapping(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_yaml_error_converts() {
        let err = SchemaConfig::from_yaml_str("kinds: [").unwrap_err();
        assert!(matches!(
            err,
            ApiError::Config(ConfigError::ParseError { file: None, .. })
        ));
    }

    #[test]
    fn test_anyhow_error_converts() {
        let err: ApiError = anyhow::anyhow!("backend exploded").into();
        assert!(matches!(err, ApiError::Internal(ref msg) if msg.contains("exploded")));
    }

    #[test]
    fn test_invalid_reference_string() {
        let err = decode(
            &std::sync::Arc::new(
                Schema::builder("Person")
                    .field("employer", ValueKind::Reference)
                    .build()
                    .unwrap(),
            ),
            serde_json::json!({ "employer": "not a key" })
                .as_object()
                .unwrap(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REFERENCE");
    }
}
