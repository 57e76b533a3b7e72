//! Static job catalog plus the read-only job endpoints.
//!
//! The catalog is loaded once at startup from a JSON file and never mutated;
//! everything candidate-shaped lives in the database, not here.

use std::collections::HashMap;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::job::JobDescription;
use crate::models::ranking::RankingRow;
use crate::models::resume::{ResumeRow, SuitableRole};
use crate::roles::decode_suitable_roles;
use crate::state::AppState;

pub struct JobCatalog {
    jobs: Vec<JobDescription>,
}

impl JobCatalog {
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job catalog at {}", path.display()))?;
        let jobs: Vec<JobDescription> =
            serde_json::from_str(&raw).context("Job catalog is not valid JSON")?;
        info!("Loaded {} jobs from {}", jobs.len(), path.display());
        Ok(Self { jobs })
    }

    pub fn all(&self) -> &[JobDescription] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&JobDescription> {
        self.jobs.iter().find(|j| j.id == id)
    }
}

#[derive(Serialize)]
pub struct JobSummary {
    #[serde(flatten)]
    pub job: JobDescription,
    pub resume_count: i64,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobSummary>>, AppError> {
    let counts: Vec<(String, i64)> =
        sqlx::query_as("SELECT job_id, COUNT(*) FROM resumes GROUP BY job_id")
            .fetch_all(&state.db)
            .await?;
    let counts: HashMap<String, i64> = counts.into_iter().collect();

    let summaries = state
        .jobs
        .all()
        .iter()
        .map(|job| JobSummary {
            resume_count: counts.get(&job.id).copied().unwrap_or(0),
            job: job.clone(),
        })
        .collect();

    Ok(Json(summaries))
}

#[derive(Serialize)]
pub struct ResumeView {
    pub id: i64,
    pub file_name: String,
    pub candidate_name: String,
    pub uploaded_at: DateTime<Utc>,
    pub suitable_roles: Vec<SuitableRole>,
}

#[derive(Serialize)]
pub struct RankingView {
    pub resume_id: i64,
    pub candidate_name: String,
    pub skill_match_score: f64,
    pub experience_match_score: f64,
    pub overall_score: f64,
    pub summary: String,
    pub ranked_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub job: JobDescription,
    pub resumes: Vec<ResumeView>,
    pub rankings: Vec<RankingView>,
}

/// GET /api/v1/jobs/:id
///
/// The job, its resumes newest-first (each with the embedded payload's role
/// suggestions decoded for display), and the current ranking snapshot sorted
/// by overall score.
pub async fn handle_job_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobDetailResponse>, AppError> {
    let job = state
        .jobs
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let resumes: Vec<ResumeRow> =
        sqlx::query_as("SELECT * FROM resumes WHERE job_id = $1 ORDER BY uploaded_at DESC")
            .bind(&id)
            .fetch_all(&state.db)
            .await?;

    let rankings: Vec<RankingRow> =
        sqlx::query_as("SELECT * FROM rankings WHERE job_id = $1 ORDER BY overall_score DESC")
            .bind(&id)
            .fetch_all(&state.db)
            .await?;

    let names: HashMap<i64, String> = resumes
        .iter()
        .map(|r| (r.id, r.candidate_name.clone()))
        .collect();

    let rankings = rankings
        .into_iter()
        .map(|row| RankingView {
            candidate_name: names.get(&row.resume_id).cloned().unwrap_or_default(),
            resume_id: row.resume_id,
            skill_match_score: row.skill_match_score,
            experience_match_score: row.experience_match_score,
            overall_score: row.overall_score,
            summary: row.summary,
            ranked_at: row.ranked_at,
        })
        .collect();

    let resumes = resumes
        .into_iter()
        .map(|row| ResumeView {
            suitable_roles: decode_suitable_roles(row.parsed_data.as_deref()),
            id: row.id,
            file_name: row.file_name,
            candidate_name: row.candidate_name,
            uploaded_at: row.uploaded_at,
        })
        .collect();

    Ok(Json(JobDetailResponse {
        job,
        resumes,
        rankings,
    }))
}
