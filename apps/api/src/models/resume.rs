use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One uploaded resume tied to a job.
///
/// `file_ref` is the opaque storage reference returned by the `FileStore`
/// backend that stored the document. Nothing outside the storage layer
/// interprets its shape.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub job_id: String,
    pub file_name: String,
    pub file_ref: String,
    pub candidate_name: String,
    /// Parser agent output, serialized verbatim at upload time.
    pub parsed_data: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// A resume constructed during an upload batch, before it has a row id.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub job_id: String,
    pub file_name: String,
    pub file_ref: String,
    pub candidate_name: String,
    pub parsed_data: String,
}

/// Structured extraction produced by a `ResumeParser` backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedResumeData {
    pub candidate_name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub suitable_roles: Vec<SuitableRole>,
}

/// One suggested role for a candidate. Scores are typically 0-100 but the
/// contract does not bound them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuitableRole {
    pub role: String,
    pub score: i64,
}
