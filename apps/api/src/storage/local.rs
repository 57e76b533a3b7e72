//! Local filesystem storage — the default backend for development.

use async_trait::async_trait;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::storage::{object_name_for, ContentStream, FileStore, StorageError};

pub struct LocalDiskStore {
    root: PathBuf,
}

impl LocalDiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn io_err(path: &std::path::Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl FileStore for LocalDiskStore {
    async fn upload(
        &self,
        job_id: &str,
        file_name: &str,
        mut content: ContentStream<'_>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let dir = self.root.join(job_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_err(&dir, e))?;

        let path = dir.join(object_name_for(file_name));
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| io_err(&path, e))?;

        // Chunks are written through as they arrive; a failure mid-stream
        // leaves a partial file behind (same orphan condition as an aborted
        // upload batch).
        while let Some(chunk) = content.next().await {
            let chunk = chunk.map_err(|e| io_err(&path, e))?;
            file.write_all(&chunk).await.map_err(|e| io_err(&path, e))?;
        }
        file.flush().await.map_err(|e| io_err(&path, e))?;

        info!("Stored file locally: {}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }

    async fn delete(&self, file_ref: &str) -> Result<(), StorageError> {
        let path = PathBuf::from(file_ref);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted local file: {}", path.display());
                Ok(())
            }
            // Already gone is fine.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path, e)),
        }
    }

    async fn exists(&self, file_ref: &str) -> Result<bool, StorageError> {
        let path = PathBuf::from(file_ref);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| io_err(&path, e))
    }
}
