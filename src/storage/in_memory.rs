//! In-memory implementation of BlobStore for testing and development

use crate::core::reference::BlobKey;
use crate::core::service::{BlobInfo, BlobStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Blobs {
    contents: HashMap<BlobKey, Vec<u8>>,
    infos: HashMap<BlobKey, BlobInfo>,
}

/// In-memory blob store implementation
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<Blobs>>,
}

impl InMemoryBlobStore {
    /// Create a new in-memory blob store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs
            .read()
            .map(|blobs| blobs.contents.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop only the metadata of a blob, keeping its content readable
    pub fn forget_info(&self, key: &BlobKey) -> Result<()> {
        self.blobs
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?
            .infos
            .remove(key);
        Ok(())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, filename: &str, data: Vec<u8>) -> Result<BlobKey> {
        let key = BlobKey::generate();
        let info = BlobInfo {
            key: key.clone(),
            filename: filename.to_string(),
            size: data.len(),
            created_at: Utc::now(),
        };

        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        blobs.contents.insert(key.clone(), data);
        blobs.infos.insert(key.clone(), info);

        Ok(key)
    }

    async fn read(&self, key: &BlobKey) -> Result<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(blobs.contents.get(key).cloned())
    }

    async fn info(&self, key: &BlobKey) -> Result<Option<BlobInfo>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(blobs.infos.get(key).cloned())
    }

    async fn delete(&self, key: &BlobKey) -> Result<()> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        blobs.contents.remove(key);
        blobs.infos.remove(key);

        Ok(())
    }
}
