//! Axum extractor for validated forms
//!
//! `Formed<F>` gathers a form payload from any of the shapes clients send,
//! deserializes it into `F` and runs its `validator` rules before the
//! handler sees it.

use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use validator::{Validate, ValidationErrors};

use crate::core::error::{
    ApiError, ApiResult, FieldValidationError, RequestError, ValidationError,
};

/// Form field carrying a JSON document in url-encoded bodies
pub const JSON_FORM_FIELD: &str = "json";

/// Key of the JSON body object holding the form parameters
pub const PARAMS_KEY: &str = "params";

/// Axum extractor yielding a deserialized, validated form
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_person(Formed(form): Formed<PersonForm>) -> ApiResult<Response> {
///     // form passed every validation rule
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Formed<F>(pub F);

impl<F> Formed<F> {
    pub fn into_inner(self) -> F {
        self.0
    }
}

impl<F> std::ops::Deref for Formed<F> {
    type Target = F;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, F> FromRequest<S> for Formed<F>
where
    S: Send + Sync,
    F: DeserializeOwned + Validate + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        let payload = if is_json {
            let Json(body): Json<Value> = Json::from_request(req, state)
                .await
                .map_err(|e| invalid_body(e.body_text()))?;
            body.get(PARAMS_KEY).cloned().unwrap_or(Value::Null)
        } else {
            let Form(fields): Form<HashMap<String, String>> = Form::from_request(req, state)
                .await
                .map_err(|e| bad_request(e.body_text()))?;
            form_payload(fields)?
        };

        if is_empty_payload(&payload) {
            return Err(bad_request("request carries no form data".to_string()));
        }

        validate_form(payload).map(Formed)
    }
}

/// Deserialize a payload into `F` and run its validation rules.
///
/// Messages of a field with several failures are concatenated.
pub fn validate_form<F>(payload: Value) -> ApiResult<F>
where
    F: DeserializeOwned + Validate,
{
    let form: F = serde_json::from_value(payload).map_err(|e| ValidationError::InvalidJson {
        message: e.to_string(),
    })?;

    if let Err(errors) = form.validate() {
        let fields = field_errors(&errors);
        tracing::warn!(errors = ?fields, "form validation failed");
        return Err(ValidationError::FieldErrors(fields).into());
    }

    Ok(form)
}

fn form_payload(mut fields: HashMap<String, String>) -> ApiResult<Value> {
    if let Some(text) = fields.remove(JSON_FORM_FIELD) {
        return Ok(serde_json::from_str(&text)?);
    }

    Ok(Value::Object(
        fields
            .into_iter()
            .map(|(name, value)| (name, Value::String(value)))
            .collect::<Map<String, Value>>(),
    ))
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldValidationError> {
    let mut fields: Vec<FieldValidationError> = errors
        .field_errors()
        .into_iter()
        .map(|(field, failures)| FieldValidationError {
            field: field.to_string(),
            message: failures
                .iter()
                .map(|failure| match &failure.message {
                    Some(message) => message.to_string(),
                    None => failure.code.to_string(),
                })
                .collect::<String>(),
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    fields
}

fn bad_request(message: String) -> ApiError {
    RequestError::BadRequest { message }.into()
}

fn invalid_body(message: String) -> ApiError {
    RequestError::InvalidBody { message }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    struct SignupForm {
        #[validate(length(min = 1, message = "Name is required."))]
        name: String,
        #[validate(email(message = "Not an email."))]
        email: String,
    }

    #[test]
    fn test_validate_form_accepts_valid_payload() {
        let form: SignupForm =
            validate_form(json!({"name": "Ann", "email": "ann@example.com"})).unwrap();
        assert_eq!(form.name, "Ann");
    }

    #[test]
    fn test_validate_form_collects_field_messages() {
        let err = validate_form::<SignupForm>(json!({"name": "", "email": "nope"})).unwrap_err();
        match err {
            ApiError::Validation(ValidationError::FieldErrors(fields)) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "email");
                assert_eq!(fields[0].message, "Not an email.");
                assert_eq!(fields[1].message, "Name is required.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_validate_form_rejects_wrong_shape() {
        let err = validate_form::<SignupForm>(json!({"name": 3})).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_form_payload_prefers_json_field() {
        let mut fields = HashMap::new();
        fields.insert("json".to_string(), r#"{"name": "Ann"}"#.to_string());
        fields.insert("name".to_string(), "ignored".to_string());
        assert_eq!(form_payload(fields).unwrap(), json!({"name": "Ann"}));
    }

    #[test]
    fn test_form_payload_plain_fields_are_strings() {
        let mut fields = HashMap::new();
        fields.insert("age".to_string(), "31".to_string());
        assert_eq!(form_payload(fields).unwrap(), json!({"age": "31"}));
    }

    #[test]
    fn test_empty_payloads() {
        assert!(is_empty_payload(&Value::Null));
        assert!(is_empty_payload(&json!({})));
        assert!(!is_empty_payload(&json!({"a": 1})));
    }
}
