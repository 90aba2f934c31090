//! CSV export and upload ingestion against the in-memory blob store

use axum::body::to_bytes;
use axum::http::{StatusCode, header};
use entity_api::prelude::*;
use entity_api::table::read_rows;
use serde_json::json;
use std::sync::Arc;

fn fieldnames(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn book_schema() -> Arc<Schema> {
    Arc::new(
        Schema::builder("Book")
            .field("title", ValueKind::Generic)
            .field("pages", ValueKind::Generic)
            .field("published", ValueKind::Date)
            .build()
            .unwrap(),
    )
}

#[test]
fn test_export_encoded_entities() {
    let schema = book_schema();
    let books = [
        Entity::new(schema.clone())
            .with("title", "Dune")
            .unwrap()
            .with("pages", 412_i64)
            .unwrap(),
        Entity::new(schema.clone()).with("title", "Emma, Vol. 1").unwrap(),
    ];

    let names = fieldnames(&["title", "pages"]);
    let mut writer = CsvWriter::new(names.clone());
    writer.write_header().unwrap();
    for book in &books {
        let encoded = encode(book, &EncodeOptions::default()).unwrap();
        writer.write_row(&encoded.value).unwrap();
    }

    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(text, "title,pages\r\nDune,412\r\n\"Emma, Vol. 1\",\r\n");
}

#[test]
fn test_export_then_import() {
    let names = fieldnames(&["name", "note"]);
    let mut writer = CsvWriter::new(names.clone());
    writer.write_header().unwrap();
    writer
        .write_row(json!({"name": "Zoë", "note": "line\nbreak"}).as_object().unwrap())
        .unwrap();

    let rows = read_rows(writer.stream_data(), &names).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Zoë");
    assert_eq!(rows[0]["note"], "line\nbreak");
}

#[tokio::test]
async fn test_parse_csv_upload_consumes_blob() {
    let store = InMemoryBlobStore::new();
    let key = store
        .put("people.csv", b"Name,Age\nAnn,31\nBob\n".to_vec())
        .await
        .unwrap();

    let rows = parse_csv_upload(&store, &key, &fieldnames(&["name", "age"]))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "Ann");
    assert_eq!(rows[0]["age"], "31");
    assert_eq!(rows[1]["age"], "");
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_parse_csv_upload_without_info_keeps_blob() {
    let store = InMemoryBlobStore::new();
    let key = store.put("people.csv", b"h\nAnn\n".to_vec()).await.unwrap();
    store.forget_info(&key).unwrap();

    let rows = parse_csv_upload(&store, &key, &fieldnames(&["name"]))
        .await
        .unwrap();

    assert_eq!(rows[0]["name"], "Ann");
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_parse_csv_upload_missing_blob() {
    let store = InMemoryBlobStore::new();
    let key = BlobKey::new("nothing-here").unwrap();

    let err = parse_csv_upload(&store, &key, &fieldnames(&["name"]))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.error_code(), "BLOB_NOT_FOUND");
}

#[test]
fn test_upload_is_csv() {
    let upload = Upload {
        name: "Export.CSV".to_string(),
        blob_key: BlobKey::generate(),
    };
    assert!(upload.is_csv());
    assert!(!is_csv("export.xlsx"));
}

#[tokio::test]
async fn test_send_csv_download() {
    let rows = vec![
        json!({"a": "1", "b": 2}).as_object().unwrap().clone(),
        json!({"b": null}).as_object().unwrap().clone(),
    ];

    let response = send_csv_download(&fieldnames(&["a", "b"]), &rows, "out.csv").unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=out.csv"
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"a,b\r\n1,2\r\n,\r\n");
}
