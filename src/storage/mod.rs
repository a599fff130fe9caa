use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Allowed attachment extensions
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "pdf"];

/// Maximum file size (10 MB)
const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Reference to a stored blob: the public URL served to clients, and the
/// opaque id used to release it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub url: String,
    pub storage_id: String,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn upload(&self, filename: &str, data: &[u8]) -> Result<StoredFile>;
    async fn destroy(&self, storage_id: &str) -> Result<()>;
}

/// Stores uploads on the local filesystem under a configured directory,
/// served as static files by the router.
pub struct LocalFileStore {
    uploads_dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn upload(&self, filename: &str, data: &[u8]) -> Result<StoredFile> {
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::Validation("File too large (max 10 MB)".to_string()));
        }

        let extension = filename
            .rsplit('.')
            .next()
            .map(|s| s.to_lowercase())
            .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(AppError::Validation(format!(
                "Invalid file type. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        fs::create_dir_all(&self.uploads_dir)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create uploads directory: {}", e)))?;

        let storage_id = format!("{}.{}", Uuid::new_v4(), extension);
        let file_path = self.uploads_dir.join(&storage_id);

        let mut file = fs::File::create(&file_path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create file: {}", e)))?;

        file.write_all(data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {}", e)))?;

        Ok(StoredFile {
            url: format!("uploads/{}", storage_id),
            storage_id,
        })
    }

    async fn destroy(&self, storage_id: &str) -> Result<()> {
        // storage ids are generated server-side; refuse anything that could
        // escape the uploads directory
        if storage_id.contains('/') || storage_id.contains("..") {
            return Err(AppError::Storage(format!("Invalid storage id: {}", storage_id)));
        }

        let path = self.uploads_dir.join(storage_id);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {}", e))),
        }
    }
}

/// In-memory store used by tests: records every upload and destroy so
/// assertions can check compensating cleanup actually happened.
#[derive(Default)]
pub struct FakeFileStore {
    pub uploads: std::sync::Mutex<Vec<String>>,
    pub destroyed: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl FileStore for FakeFileStore {
    async fn upload(&self, filename: &str, _data: &[u8]) -> Result<StoredFile> {
        let storage_id = format!("{}-{}", Uuid::new_v4(), filename);
        self.uploads.lock().unwrap().push(storage_id.clone());
        Ok(StoredFile {
            url: format!("fake://{}", storage_id),
            storage_id,
        })
    }

    async fn destroy(&self, storage_id: &str) -> Result<()> {
        self.destroyed.lock().unwrap().push(storage_id.to_string());
        Ok(())
    }
}
