//! Collaborator traits implemented by storage backends

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::reference::BlobKey;

/// Metadata the blob store keeps next to each blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInfo {
    pub key: BlobKey,
    pub filename: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
}

/// A file received through an upload form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Client-side file name
    pub name: String,
    pub blob_key: BlobKey,
}

impl Upload {
    /// Whether the uploaded file looks like CSV, judged by its name
    pub fn is_csv(&self) -> bool {
        crate::table::is_csv(&self.name)
    }
}

/// Service trait for storing and reading uploaded binary content
///
/// Upload handlers `put` incoming files; CSV ingestion reads an upload and
/// deletes it once consumed.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store content and hand out its key
    async fn put(&self, filename: &str, data: Vec<u8>) -> Result<BlobKey>;

    /// Raw content of a blob, `None` if the key is unknown
    async fn read(&self, key: &BlobKey) -> Result<Option<Vec<u8>>>;

    /// Metadata of a blob, `None` if the key is unknown
    async fn info(&self, key: &BlobKey) -> Result<Option<BlobInfo>>;

    /// Remove a blob and its metadata
    async fn delete(&self, key: &BlobKey) -> Result<()>;
}
