//! CSV upload ingestion

use indexmap::IndexMap;

use crate::core::error::{ApiResult, StorageError};
use crate::core::reference::BlobKey;
use crate::core::service::BlobStore;

/// One parsed data row, keyed by the caller's field names
pub type CsvRow = IndexMap<String, String>;

/// Parse CSV bytes into rows keyed by `fieldnames`.
///
/// The first row is always a header and is discarded. Short rows are padded
/// with empty strings, surplus cells are dropped and invalid UTF-8 is
/// replaced rather than rejected.
pub fn read_rows(data: &[u8], fieldnames: &[String]) -> ApiResult<Vec<CsvRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false) // We handle headers ourselves
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    let mut header_skipped = false;
    let mut record = csv::ByteRecord::new();

    while reader.read_byte_record(&mut record)? {
        if !header_skipped {
            header_skipped = true;
            continue;
        }

        let row = fieldnames
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let cell = record
                    .get(index)
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    .unwrap_or_default();
                (name.clone(), cell)
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Read an uploaded CSV blob, delete it, and parse its rows.
///
/// A blob without metadata is still parsed; only its deletion is skipped.
pub async fn parse_csv_upload(
    store: &dyn BlobStore,
    key: &BlobKey,
    fieldnames: &[String],
) -> ApiResult<Vec<CsvRow>> {
    let data = store
        .read(key)
        .await
        .map_err(|e| StorageError::OperationFailed {
            operation: "read".to_string(),
            message: e.to_string(),
        })?
        .ok_or_else(|| StorageError::BlobNotFound {
            key: key.to_string(),
        })?;

    match store.info(key).await {
        Ok(Some(_)) => {
            if let Err(e) = store.delete(key).await {
                tracing::warn!(key = %key, error = %e, "failed to delete consumed upload");
            }
        }
        Ok(None) => {
            tracing::warn!(key = %key, "no blob info for upload, skipping delete");
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "blob info lookup failed, skipping delete");
        }
    }

    let rows = read_rows(&data, fieldnames)?;
    tracing::debug!(key = %key, rows = rows.len(), "parsed csv upload");
    Ok(rows)
}
