//! Upload orchestration: stream each submitted file into storage as it
//! arrives off the wire, parse it through the agent gateway, then persist all
//! candidate records as one batch.
//!
//! Partial-failure contract (deliberate, not an oversight): a storage or
//! parse failure for one file aborts the remaining files and nothing from
//! the batch is persisted — but blobs already written for earlier files are
//! NOT rolled back. Cleaning those orphans up is an out-of-band concern.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use futures::StreamExt;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::agents::ResumeParser;
use crate::errors::AppError;
use crate::models::resume::NewResume;
use crate::state::AppState;
use crate::storage::{ContentStream, FileStore};

const ALLOWED_EXTENSIONS: [&str; 2] = ["pdf", "docx"];

/// One file lifted out of the multipart request. `content` is the live body
/// stream for that part, not a buffered copy.
pub struct UploadedFile<'a> {
    pub file_name: String,
    pub content_type: String,
    pub content: ContentStream<'a>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub job_id: String,
    pub received: usize,
    pub persisted: usize,
}

/// POST /api/v1/jobs/:id/resumes
///
/// Multipart parts are consumed strictly in order, each one streamed into
/// storage before the next is read, so at no point is a whole file (let alone
/// the whole batch) resident in memory.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    if state.jobs.get(&id).is_none() {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }

    let mut received = 0;
    let mut rows = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let file_name = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue, // non-file form fields are ignored
        };
        received += 1;
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let file = UploadedFile {
            file_name,
            content_type,
            content: field_content(field),
        };
        if let Some(row) =
            build_candidate(&id, file, state.storage.as_ref(), state.parser.as_ref()).await?
        {
            rows.push(row);
        }
    }

    if received == 0 {
        return Err(AppError::Validation(
            "Please select at least one file.".to_string(),
        ));
    }

    let persisted = rows.len();
    persist_batch(&state.db, &rows).await?;

    info!("Persisted {persisted} of {received} uploaded files for job {id}");
    Ok(Json(UploadResponse {
        job_id: id,
        received,
        persisted,
    }))
}

/// Adapts a multipart field into the storage-facing chunk stream.
fn field_content(field: Field<'_>) -> ContentStream<'_> {
    futures::stream::try_unfold(field, |mut field| async move {
        let chunk = field
            .chunk()
            .await
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        Ok(chunk.map(|bytes| (bytes, field)))
    })
    .boxed()
}

/// Stores and parses a single file, building its candidate record.
///
/// Files with unsupported extensions are skipped silently (`Ok(None)`); their
/// content is never read. A storage/parse failure propagates and aborts the
/// batch — records built so far are dropped (never persisted), while their
/// stored blobs remain.
pub async fn build_candidate(
    job_id: &str,
    file: UploadedFile<'_>,
    storage: &dyn FileStore,
    parser: &dyn ResumeParser,
) -> Result<Option<NewResume>, AppError> {
    if !has_allowed_extension(&file.file_name) {
        debug!("Skipping {} (unsupported extension)", file.file_name);
        return Ok(None);
    }

    let file_ref = storage
        .upload(job_id, &file.file_name, file.content, &file.content_type)
        .await?;
    let parsed = parser.parse(&file_ref).await?;
    let parsed_data = serde_json::to_string(&parsed).map_err(anyhow::Error::from)?;

    Ok(Some(NewResume {
        job_id: job_id.to_string(),
        file_name: file.file_name,
        file_ref,
        candidate_name: parsed.candidate_name,
        parsed_data,
    }))
}

fn has_allowed_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Inserts the whole batch inside one transaction.
async fn persist_batch(pool: &PgPool, rows: &[NewResume]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO resumes (job_id, file_name, file_ref, candidate_name, parsed_data, uploaded_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&row.job_id)
        .bind(&row.file_name)
        .bind(&row.file_ref)
        .bind(&row.candidate_name)
        .bind(&row.parsed_data)
        .bind(chrono::Utc::now())
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}
