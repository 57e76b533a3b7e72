//! Remote object storage over S3-compatible backends (AWS or MinIO).
//!
//! Every write goes under a job-scoped key prefix and requests server-side
//! encryption. Reference tokens may come back as bare keys or as
//! `remotestore://bucket/key` URIs; both are accepted for delete/exists.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;
use aws_sdk_s3::Client as S3Client;
use bytes::BytesMut;
use futures::StreamExt;
use tracing::info;

use crate::storage::{object_name_for, resolve_object_key, ContentStream, FileStore, StorageError};

pub struct ObjectStore {
    client: S3Client,
    bucket: String,
}

impl ObjectStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    fn remote_err(key: &str, message: impl ToString) -> StorageError {
        StorageError::Remote {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl FileStore for ObjectStore {
    async fn upload(
        &self,
        job_id: &str,
        file_name: &str,
        mut content: ContentStream<'_>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = format!("resumes/{}/{}", job_id, object_name_for(file_name));

        // PutObject requires a body with a known length, so the chunks are
        // gathered here; the request body cap bounds this buffer.
        let mut body = BytesMut::new();
        while let Some(chunk) = content.next().await {
            let chunk = chunk.map_err(|e| Self::remote_err(&key, e))?;
            body.extend_from_slice(&chunk);
        }

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body.freeze()))
            .content_type(content_type)
            .server_side_encryption(ServerSideEncryption::Aes256)
            .send()
            .await
            .map_err(|e| Self::remote_err(&key, e))?;

        info!("Uploaded object to s3://{}/{}", self.bucket, key);

        // The bare key is the reference token; the bucket is configuration.
        Ok(key)
    }

    async fn delete(&self, file_ref: &str) -> Result<(), StorageError> {
        let key = resolve_object_key(file_ref);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::remote_err(key, e))?;

        info!("Deleted object s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn exists(&self, file_ref: &str) -> Result<bool, StorageError> {
        let key = resolve_object_key(file_ref);

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service_err| service_err.is_not_found())
                {
                    Ok(false)
                } else {
                    Err(Self::remote_err(key, err))
                }
            }
        }
    }
}
