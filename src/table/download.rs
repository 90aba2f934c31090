//! File download responses

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};

use crate::core::error::{ApiError, ApiResult};
use crate::table::writer::CsvWriter;

/// Send bytes as a `text/plain` attachment named `filename`
pub fn send_file_download(data: Vec<u8>, filename: &str) -> ApiResult<Response> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename={}", filename))
        .map_err(|_| ApiError::Internal(format!("invalid download filename '{}'", filename)))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// Render rows as CSV, header first, and send them as an attachment
pub fn send_csv_download<'r, I>(
    fieldnames: &[String],
    rows: I,
    filename: &str,
) -> ApiResult<Response>
where
    I: IntoIterator<Item = &'r Map<String, Value>>,
{
    let mut writer = CsvWriter::new(fieldnames.iter().cloned());
    writer.write_header()?;
    writer.write_rows(rows)?;
    send_file_download(writer.into_inner(), filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_file_download_headers() {
        let response = send_file_download(b"hello".to_vec(), "hello.txt").unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=hello.txt"
        );
    }

    #[test]
    fn test_invalid_filename_rejected() {
        assert!(send_file_download(Vec::new(), "bad\nname.csv").is_err());
    }

    #[test]
    fn test_csv_download_headers() {
        let rows: Vec<Map<String, Value>> = Vec::new();
        let response =
            send_csv_download(&["a".to_string()], &rows, "export.csv").unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=export.csv"
        );
    }
}
