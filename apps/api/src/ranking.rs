//! Rerank orchestration and candidate deletion.
//!
//! A job's ranking snapshot is replaced in whole-snapshot units: delete every
//! existing row, rank the full candidate set once, insert the returned rows.
//! The sequence is deliberately not atomic — a ranker failure after the
//! delete leaves the job with an empty snapshot until the rerank is retried.
//! Two concurrent reranks of the same job race on delete-then-insert and the
//! last insert wins; nothing serializes them (known limitation).
//!
//! Both flows run their persistence through `RankingRepo` so the ordering
//! contracts above are enforced by unit tests, not just by reading the SQL.

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::agents::ResumeRanker;
use crate::errors::AppError;
use crate::models::job::JobDescription;
use crate::models::ranking::NewRanking;
use crate::models::resume::ResumeRow;
use crate::state::AppState;
use crate::storage::FileStore;

/// Persistence operations behind the rerank and delete flows.
#[async_trait]
pub trait RankingRepo: Send + Sync {
    async fn resumes_for_job(&self, job_id: &str) -> Result<Vec<ResumeRow>, AppError>;
    async fn clear_snapshot(&self, job_id: &str) -> Result<(), AppError>;
    async fn insert_snapshot(&self, rows: &[NewRanking]) -> Result<(), AppError>;
    async fn find_resume(&self, job_id: &str, resume_id: i64)
        -> Result<Option<ResumeRow>, AppError>;
    async fn delete_rankings_for_resume(&self, resume_id: i64) -> Result<(), AppError>;
    async fn delete_resume_row(&self, resume_id: i64) -> Result<(), AppError>;
}

#[async_trait]
impl RankingRepo for PgPool {
    async fn resumes_for_job(&self, job_id: &str) -> Result<Vec<ResumeRow>, AppError> {
        let rows = sqlx::query_as("SELECT * FROM resumes WHERE job_id = $1 ORDER BY id")
            .bind(job_id)
            .fetch_all(self)
            .await?;
        Ok(rows)
    }

    async fn clear_snapshot(&self, job_id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM rankings WHERE job_id = $1")
            .bind(job_id)
            .execute(self)
            .await?;
        Ok(())
    }

    /// Inserts the whole snapshot inside one transaction.
    async fn insert_snapshot(&self, rows: &[NewRanking]) -> Result<(), AppError> {
        let mut tx = self.begin().await.map_err(AppError::Database)?;
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO rankings
                    (resume_id, job_id, skill_match_score, experience_match_score,
                     overall_score, summary, ranked_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(row.resume_id)
            .bind(&row.job_id)
            .bind(row.skill_match_score)
            .bind(row.experience_match_score)
            .bind(row.overall_score)
            .bind(&row.summary)
            .bind(row.ranked_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await.map_err(AppError::Database)
    }

    async fn find_resume(
        &self,
        job_id: &str,
        resume_id: i64,
    ) -> Result<Option<ResumeRow>, AppError> {
        let row = sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND job_id = $2")
            .bind(resume_id)
            .bind(job_id)
            .fetch_optional(self)
            .await?;
        Ok(row)
    }

    async fn delete_rankings_for_resume(&self, resume_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM rankings WHERE resume_id = $1")
            .bind(resume_id)
            .execute(self)
            .await?;
        Ok(())
    }

    async fn delete_resume_row(&self, resume_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(resume_id)
            .execute(self)
            .await?;
        Ok(())
    }
}

pub struct RerankOutcome {
    pub candidates: usize,
    pub ranked: usize,
}

/// Replaces a job's ranking snapshot.
///
/// No candidates: leave any existing snapshot untouched and return without
/// touching the ranker. This is the defined no-op policy, distinct from
/// clearing the snapshot. Otherwise the old snapshot is cleared first; from
/// that point until the insert lands, readers observe an empty snapshot.
pub async fn rerank_job(
    repo: &dyn RankingRepo,
    ranker: &dyn ResumeRanker,
    job: &JobDescription,
) -> Result<RerankOutcome, AppError> {
    let resumes = repo.resumes_for_job(&job.id).await?;
    if resumes.is_empty() {
        info!("Rerank requested for job {} with no resumes; nothing to do", job.id);
        return Ok(RerankOutcome {
            candidates: 0,
            ranked: 0,
        });
    }

    repo.clear_snapshot(&job.id).await?;

    let results = ranker.rank(&resumes, job).await?;
    let ranked = results.len();
    if ranked != resumes.len() {
        warn!(
            "Ranker returned {ranked} results for {} resumes on job {}",
            resumes.len(),
            job.id
        );
    }

    repo.insert_snapshot(&results).await?;

    Ok(RerankOutcome {
        candidates: resumes.len(),
        ranked,
    })
}

/// Deletes one candidate, children before parent: ranking rows, then the
/// stored file, then the resume row. A crash mid-way can orphan the later
/// steps but never leaves a ranking pointing at a deleted resume.
pub async fn delete_candidate(
    repo: &dyn RankingRepo,
    storage: &dyn FileStore,
    job_id: &str,
    resume_id: i64,
) -> Result<ResumeRow, AppError> {
    let resume = repo.find_resume(job_id, resume_id).await?.ok_or_else(|| {
        AppError::NotFound(format!("Resume {resume_id} not found for job {job_id}"))
    })?;

    repo.delete_rankings_for_resume(resume_id).await?;
    storage.delete(&resume.file_ref).await?;
    repo.delete_resume_row(resume_id).await?;

    Ok(resume)
}

#[derive(Serialize)]
pub struct RerankResponse {
    pub job_id: String,
    pub candidates: usize,
    pub ranked: usize,
}

/// POST /api/v1/jobs/:id/rankings
pub async fn handle_rerank(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RerankResponse>, AppError> {
    let job = state
        .jobs
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let outcome = rerank_job(&state.db, state.ranker.as_ref(), job).await?;

    info!("Reranked job {id}: {} rankings persisted", outcome.ranked);
    Ok(Json(RerankResponse {
        job_id: id,
        candidates: outcome.candidates,
        ranked: outcome.ranked,
    }))
}

/// DELETE /api/v1/jobs/:id/resumes/:resume_id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path((id, resume_id)): Path<(String, i64)>,
) -> Result<StatusCode, AppError> {
    let resume = delete_candidate(&state.db, state.storage.as_ref(), &id, resume_id).await?;

    info!("Deleted resume {resume_id} ({}) for job {id}", resume.file_name);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    use crate::agents::stub::StubRankingAgent;
    use crate::agents::AgentError;
    use crate::storage::{ContentStream, StorageError};

    type EventLog = Arc<Mutex<Vec<&'static str>>>;

    /// Repo over in-memory state that logs every mutating call in order.
    struct FakeRepo {
        resumes: Vec<ResumeRow>,
        snapshot: Mutex<Vec<NewRanking>>,
        events: EventLog,
    }

    impl FakeRepo {
        fn new(resumes: Vec<ResumeRow>, snapshot: Vec<NewRanking>, events: EventLog) -> Self {
            Self {
                resumes,
                snapshot: Mutex::new(snapshot),
                events,
            }
        }

        fn snapshot_len(&self) -> usize {
            self.snapshot.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RankingRepo for FakeRepo {
        async fn resumes_for_job(&self, job_id: &str) -> Result<Vec<ResumeRow>, AppError> {
            Ok(self
                .resumes
                .iter()
                .filter(|r| r.job_id == job_id)
                .cloned()
                .collect())
        }

        async fn clear_snapshot(&self, _job_id: &str) -> Result<(), AppError> {
            self.events.lock().unwrap().push("clear_snapshot");
            self.snapshot.lock().unwrap().clear();
            Ok(())
        }

        async fn insert_snapshot(&self, rows: &[NewRanking]) -> Result<(), AppError> {
            self.events.lock().unwrap().push("insert_snapshot");
            self.snapshot.lock().unwrap().extend_from_slice(rows);
            Ok(())
        }

        async fn find_resume(
            &self,
            job_id: &str,
            resume_id: i64,
        ) -> Result<Option<ResumeRow>, AppError> {
            Ok(self
                .resumes
                .iter()
                .find(|r| r.id == resume_id && r.job_id == job_id)
                .cloned())
        }

        async fn delete_rankings_for_resume(&self, resume_id: i64) -> Result<(), AppError> {
            self.events.lock().unwrap().push("delete_rankings");
            self.snapshot
                .lock()
                .unwrap()
                .retain(|r| r.resume_id != resume_id);
            Ok(())
        }

        async fn delete_resume_row(&self, _resume_id: i64) -> Result<(), AppError> {
            self.events.lock().unwrap().push("delete_resume_row");
            Ok(())
        }
    }

    /// Store that logs deletes into the shared event log.
    struct LogStore {
        events: EventLog,
        fail_delete: bool,
        deleted: Mutex<Vec<String>>,
    }

    impl LogStore {
        fn new(events: EventLog) -> Self {
            Self {
                events,
                fail_delete: false,
                deleted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FileStore for LogStore {
        async fn upload(
            &self,
            _job_id: &str,
            _file_name: &str,
            _content: ContentStream<'_>,
            _content_type: &str,
        ) -> Result<String, StorageError> {
            Ok("unused".to_string())
        }

        async fn delete(&self, file_ref: &str) -> Result<(), StorageError> {
            if self.fail_delete {
                return Err(StorageError::Remote {
                    key: file_ref.to_string(),
                    message: "store down".to_string(),
                });
            }
            self.events.lock().unwrap().push("delete_file");
            self.deleted.lock().unwrap().push(file_ref.to_string());
            Ok(())
        }

        async fn exists(&self, file_ref: &str) -> Result<bool, StorageError> {
            Ok(!self.deleted.lock().unwrap().iter().any(|r| r == file_ref))
        }
    }

    /// Ranker that always fails, for observing state mid-flow.
    struct FailingRanker;

    #[async_trait]
    impl ResumeRanker for FailingRanker {
        async fn rank(
            &self,
            _resumes: &[ResumeRow],
            _job: &JobDescription,
        ) -> Result<Vec<NewRanking>, AgentError> {
            Err(AgentError::Unreachable("ranker down".to_string()))
        }
    }

    fn job(id: &str) -> JobDescription {
        JobDescription {
            id: id.to_string(),
            title: "Backend Engineer".to_string(),
            department: "Engineering".to_string(),
            description: "Build services".to_string(),
            required_skills: vec!["Rust".to_string()],
            preferred_skills: vec![],
            experience_level: "Senior".to_string(),
            location: "Remote".to_string(),
        }
    }

    fn resume(id: i64, job_id: &str) -> ResumeRow {
        ResumeRow {
            id,
            job_id: job_id.to_string(),
            file_name: format!("resume-{id}.pdf"),
            file_ref: format!("mem/{job_id}/resume-{id}.pdf"),
            candidate_name: format!("Candidate {id}"),
            parsed_data: None,
            uploaded_at: Utc::now(),
        }
    }

    fn ranking(resume_id: i64, job_id: &str) -> NewRanking {
        NewRanking {
            resume_id,
            job_id: job_id.to_string(),
            skill_match_score: 50.0,
            experience_match_score: 50.0,
            overall_score: 50.0,
            summary: "old snapshot row".to_string(),
            ranked_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_rerank_with_no_candidates_leaves_snapshot_untouched() {
        let events: EventLog = Arc::default();
        // A stale snapshot row for a resume that has since been removed.
        let repo = FakeRepo::new(vec![], vec![ranking(9, "job-1")], events.clone());

        let outcome = rerank_job(&repo, &StubRankingAgent, &job("job-1"))
            .await
            .unwrap();

        assert_eq!(outcome.candidates, 0);
        assert_eq!(outcome.ranked, 0);
        assert_eq!(repo.snapshot_len(), 1);
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rerank_clears_old_snapshot_before_inserting_new_one() {
        let events: EventLog = Arc::default();
        let repo = FakeRepo::new(
            vec![resume(1, "job-1"), resume(2, "job-1")],
            vec![ranking(1, "job-1")],
            events.clone(),
        );

        let outcome = rerank_job(&repo, &StubRankingAgent, &job("job-1"))
            .await
            .unwrap();

        assert_eq!(outcome.candidates, 2);
        assert_eq!(outcome.ranked, 2);
        assert_eq!(repo.snapshot_len(), 2);
        assert!(repo
            .snapshot
            .lock()
            .unwrap()
            .iter()
            .all(|r| r.summary != "old snapshot row"));
        assert_eq!(
            *events.lock().unwrap(),
            vec!["clear_snapshot", "insert_snapshot"]
        );
    }

    #[tokio::test]
    async fn test_ranker_failure_after_clear_leaves_empty_snapshot() {
        let events: EventLog = Arc::default();
        let repo = FakeRepo::new(
            vec![resume(1, "job-1")],
            vec![ranking(1, "job-1")],
            events.clone(),
        );

        let result = rerank_job(&repo, &FailingRanker, &job("job-1")).await;

        assert!(matches!(result, Err(AppError::Agent(_))));
        // The old snapshot is gone and nothing replaced it.
        assert_eq!(repo.snapshot_len(), 0);
        assert_eq!(*events.lock().unwrap(), vec!["clear_snapshot"]);
    }

    #[tokio::test]
    async fn test_delete_removes_children_before_parent() {
        let events: EventLog = Arc::default();
        let repo = FakeRepo::new(
            vec![resume(1, "job-1")],
            vec![ranking(1, "job-1")],
            events.clone(),
        );
        let store = LogStore::new(events.clone());

        let deleted = delete_candidate(&repo, &store, "job-1", 1).await.unwrap();

        assert_eq!(deleted.id, 1);
        assert_eq!(repo.snapshot_len(), 0);
        assert!(!store.exists(&deleted.file_ref).await.unwrap());
        assert_eq!(
            *events.lock().unwrap(),
            vec!["delete_rankings", "delete_file", "delete_resume_row"]
        );
    }

    #[tokio::test]
    async fn test_delete_keeps_resume_row_when_file_delete_fails() {
        let events: EventLog = Arc::default();
        let repo = FakeRepo::new(
            vec![resume(1, "job-1")],
            vec![ranking(1, "job-1")],
            events.clone(),
        );
        let mut store = LogStore::new(events.clone());
        store.fail_delete = true;

        let result = delete_candidate(&repo, &store, "job-1", 1).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        // Rankings went first; the resume row was never touched.
        assert_eq!(*events.lock().unwrap(), vec!["delete_rankings"]);
    }

    #[tokio::test]
    async fn test_delete_of_unknown_resume_is_not_found() {
        let events: EventLog = Arc::default();
        let repo = FakeRepo::new(vec![resume(1, "job-1")], vec![], events.clone());
        let store = LogStore::new(events.clone());

        // Wrong id, and right id under the wrong job.
        let result = delete_candidate(&repo, &store, "job-1", 99).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        let result = delete_candidate(&repo, &store, "job-2", 1).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(events.lock().unwrap().is_empty());
    }
}
