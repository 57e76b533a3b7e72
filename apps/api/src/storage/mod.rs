//! File storage gateway — pluggable backend for uploaded resume documents.
//!
//! Uploads return an opaque reference token whose shape is backend-specific:
//! a filesystem path for `LocalDiskStore`, an object key for `ObjectStore`.
//! `delete`/`exists` accept tokens produced by either backend; the
//! `remotestore://bucket/key` URI form is resolved to its key component here,
//! at the boundary, so orchestrators never sniff token shapes themselves.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;
use uuid::Uuid;

pub mod local;
pub mod object;

pub use local::LocalDiskStore;
pub use object::ObjectStore;

const REMOTE_URI_SCHEME: &str = "remotestore://";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("object store error for {key}: {message}")]
    Remote { key: String, message: String },
}

/// Chunked file content as it arrives off the request body.
pub type ContentStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

/// File storage capability. One backend is selected at startup and carried in
/// `AppState` as `Arc<dyn FileStore>`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Drains `content` chunk by chunk into the backend — the whole file is
    /// never required to be resident in memory — under a collision-resistant
    /// name derived from a fresh UUID (never the original filename),
    /// preserving the extension. Returns the backend-specific reference token
    /// for the stored object.
    async fn upload(
        &self,
        job_id: &str,
        file_name: &str,
        content: ContentStream<'_>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Deletes the object behind `file_ref`. Deleting an absent object is not
    /// an error.
    async fn delete(&self, file_ref: &str) -> Result<(), StorageError>;

    /// Returns `Ok(false)` when the object is absent; errors only on genuine
    /// I/O or auth failures.
    async fn exists(&self, file_ref: &str) -> Result<bool, StorageError>;
}

/// Resolves a reference token to a bare object key. Tokens in the
/// `remotestore://bucket/key` URI form yield their key component; anything
/// else is returned unchanged. A migration may leave both forms in the
/// database, so both must keep working.
pub(crate) fn resolve_object_key(file_ref: &str) -> &str {
    match file_ref.strip_prefix(REMOTE_URI_SCHEME) {
        Some(rest) => match rest.split_once('/') {
            Some((_bucket, key)) => key,
            None => rest,
        },
        None => file_ref,
    }
}

/// Generates the stored object's name: a fresh UUID with the original
/// file's extension (lowercased) appended, or no extension if there is none.
pub(crate) fn object_name_for(file_name: &str) -> String {
    match std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_lowercase()),
        None => Uuid::new_v4().to_string(),
    }
}

/// Builds a `ContentStream` from in-memory chunks. Test fixture shared by the
/// storage and upload test modules.
#[cfg(test)]
pub(crate) fn content_from(chunks: Vec<Bytes>) -> ContentStream<'static> {
    use futures::StreamExt;
    futures::stream::iter(chunks.into_iter().map(Ok)).boxed()
}
