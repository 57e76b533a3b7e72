use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted score for a resume against a job. The set of rows sharing a
/// `job_id` is that job's current ranking snapshot; reranking replaces the
/// whole set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RankingRow {
    pub id: i64,
    pub resume_id: i64,
    pub job_id: String,
    pub skill_match_score: f64,
    pub experience_match_score: f64,
    pub overall_score: f64,
    pub summary: String,
    pub ranked_at: DateTime<Utc>,
}

/// A ranking produced by a `ResumeRanker` backend, before it has a row id.
#[derive(Debug, Clone)]
pub struct NewRanking {
    pub resume_id: i64,
    pub job_id: String,
    pub skill_match_score: f64,
    pub experience_match_score: f64,
    pub overall_score: f64,
    pub summary: String,
    pub ranked_at: DateTime<Utc>,
}
