//! HTTP-level tests of the `Formed` extractor

use axum::{Json, Router, http::StatusCode, routing::post};
use axum_test::TestServer;
use entity_api::prelude::*;
use serde_json::{Value, json};

// =============================================================================
// Test Forms
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
struct ContactForm {
    #[validate(length(min = 1, message = "Name is required."))]
    name: String,
    #[validate(email(message = "Invalid email address."))]
    email: String,
}

#[derive(Debug, Deserialize, Validate)]
struct AssignForm {
    #[validate(custom(function = "company_reference"))]
    company: Reference,
}

fn company_reference(value: &Reference) -> Result<(), validator::ValidationError> {
    check_reference_kind(value, "Company")
}

async fn contact(Formed(form): Formed<ContactForm>) -> Json<Value> {
    Json(json!({ "name": form.name, "email": form.email }))
}

async fn assign(Formed(form): Formed<AssignForm>) -> Json<Value> {
    Json(json!({ "company": form.company.id().to_json() }))
}

fn create_test_server() -> TestServer {
    let app = Router::new()
        .route("/contact", post(contact))
        .route("/assign", post(assign));
    TestServer::try_new(app).expect("Failed to create test server")
}

// =============================================================================
// Payload Shapes
// =============================================================================

#[tokio::test]
async fn test_json_body_params() {
    let server = create_test_server();

    let response = server
        .post("/contact")
        .json(&json!({ "params": { "name": "Ann", "email": "ann@example.com" } }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "name": "Ann", "email": "ann@example.com" }));
}

#[tokio::test]
async fn test_form_json_field() {
    let server = create_test_server();

    let response = server
        .post("/contact")
        .form(&[("json", r#"{"name": "Bob", "email": "bob@example.com"}"#)])
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["name"], "Bob");
}

#[tokio::test]
async fn test_plain_form_fields() {
    let server = create_test_server();

    let response = server
        .post("/contact")
        .form(&[("name", "Cid"), ("email", "cid@example.com")])
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["email"], "cid@example.com");
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn test_json_without_params_is_bad_request() {
    let server = create_test_server();

    let response = server
        .post("/contact")
        .json(&json!({ "name": "Ann" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_json_body_is_invalid_body() {
    let server = create_test_server();

    let response = server
        .post("/contact")
        .content_type("application/json")
        .bytes(r#"{"params": {"name": "#.into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_multipart_body_is_bad_request() {
    let server = create_test_server();

    let body = "--XYZ\r\nContent-Disposition: form-data; name=\"json\"\r\n\r\n{\"name\": \"Ann\"}\r\n--XYZ--\r\n";
    let response = server
        .post("/contact")
        .content_type("multipart/form-data; boundary=XYZ")
        .bytes(body.into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_empty_body_is_bad_request() {
    let server = create_test_server();

    let response = server.post("/contact").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_validation_failure_lists_fields() {
    let server = create_test_server();

    let response = server
        .post("/contact")
        .json(&json!({ "params": { "name": "", "email": "not-an-email" } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["fields"]["name"], "Name is required.");
    assert_eq!(body["details"]["fields"]["email"], "Invalid email address.");
}

#[tokio::test]
async fn test_reference_field_kind() {
    let server = create_test_server();

    let response = server
        .post("/assign")
        .json(&json!({ "params": { "company": Reference::new("Company", 12).unwrap().urlsafe() } }))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({ "company": 12 }));

    let response = server
        .post("/assign")
        .json(&json!({ "params": { "company": Reference::new("Person", 12).unwrap().urlsafe() } }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(
        response.json::<Value>()["details"]["fields"]["company"]
            .as_str()
            .unwrap()
            .contains("Company")
    );
}

#[tokio::test]
async fn test_malformed_reference_is_rejected() {
    let server = create_test_server();

    let response = server
        .post("/assign")
        .json(&json!({ "params": { "company": "%%%" } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
