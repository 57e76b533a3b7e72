//! Offline stub agents — deterministic, no network. Default for local
//! development and tests.

use async_trait::async_trait;

use crate::agents::{AgentError, ResumeParser, ResumeRanker};
use crate::models::job::JobDescription;
use crate::models::ranking::NewRanking;
use crate::models::resume::{ParsedResumeData, ResumeRow};

pub struct StubParserAgent;

#[async_trait]
impl ResumeParser for StubParserAgent {
    async fn parse(&self, file_ref: &str) -> Result<ParsedResumeData, AgentError> {
        let stem = std::path::Path::new(file_ref)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown Candidate");
        let candidate_name = stem.replace(['_', '-'], " ");

        Ok(ParsedResumeData {
            candidate_name,
            skills: Vec::new(),
            experience_level: Some("Unknown".to_string()),
            summary: Some("Parsed from uploaded resume file.".to_string()),
            suitable_roles: Vec::new(),
        })
    }
}

pub struct StubRankingAgent;

#[async_trait]
impl ResumeRanker for StubRankingAgent {
    async fn rank(
        &self,
        resumes: &[ResumeRow],
        job: &JobDescription,
    ) -> Result<Vec<NewRanking>, AgentError> {
        let ranked_at = chrono::Utc::now();
        Ok(resumes
            .iter()
            .map(|resume| {
                let skill_match_score = pseudo_score(&resume.candidate_name, 1);
                let experience_match_score = pseudo_score(&resume.candidate_name, 2);
                let overall_score =
                    round1(skill_match_score * 0.6 + experience_match_score * 0.4);
                NewRanking {
                    resume_id: resume.id,
                    job_id: job.id.clone(),
                    skill_match_score,
                    experience_match_score,
                    overall_score,
                    summary: format!("Stub ranking for {}", resume.candidate_name),
                    ranked_at,
                }
            })
            .collect())
    }
}

/// Deterministic 0.0-99.9 score derived from the candidate name, so repeated
/// stub runs produce identical output.
fn pseudo_score(name: &str, salt: u32) -> f64 {
    let mut h: u32 = salt;
    for byte in name.bytes() {
        h = h.wrapping_mul(31).wrapping_add(byte as u32);
    }
    (h % 1000) as f64 / 10.0
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn resume_row(id: i64, candidate_name: &str) -> ResumeRow {
        ResumeRow {
            id,
            job_id: "backend-1".to_string(),
            file_name: "resume.pdf".to_string(),
            file_ref: format!("uploads/backend-1/{id}.pdf"),
            candidate_name: candidate_name.to_string(),
            parsed_data: None,
            uploaded_at: Utc::now(),
        }
    }

    fn job() -> JobDescription {
        JobDescription {
            id: "backend-1".to_string(),
            title: "Backend Engineer".to_string(),
            department: "Engineering".to_string(),
            description: "Build services".to_string(),
            required_skills: vec![],
            preferred_skills: vec![],
            experience_level: "Senior".to_string(),
            location: "Remote".to_string(),
        }
    }

    #[tokio::test]
    async fn test_stub_parser_derives_name_from_file_stem() {
        let parsed = StubParserAgent
            .parse("uploads/backend-1/jane_doe-resume.pdf")
            .await
            .unwrap();
        assert_eq!(parsed.candidate_name, "jane doe resume");
        assert!(parsed.skills.is_empty());
        assert_eq!(parsed.experience_level.as_deref(), Some("Unknown"));
    }

    #[tokio::test]
    async fn test_stub_ranker_returns_one_result_per_resume() {
        let resumes = vec![resume_row(1, "Jane Doe"), resume_row(2, "John Smith")];
        let results = StubRankingAgent.rank(&resumes, &job()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].resume_id, 1);
        assert_eq!(results[1].resume_id, 2);
        assert_eq!(results[0].summary, "Stub ranking for Jane Doe");
    }

    #[tokio::test]
    async fn test_stub_ranker_is_deterministic() {
        let resumes = vec![resume_row(1, "Jane Doe")];
        let first = StubRankingAgent.rank(&resumes, &job()).await.unwrap();
        let second = StubRankingAgent.rank(&resumes, &job()).await.unwrap();
        assert_eq!(first[0].skill_match_score, second[0].skill_match_score);
        assert_eq!(first[0].overall_score, second[0].overall_score);
    }

    #[tokio::test]
    async fn test_stub_overall_is_weighted_blend() {
        let resumes = vec![resume_row(1, "Jane Doe")];
        let results = StubRankingAgent.rank(&resumes, &job()).await.unwrap();
        let r = &results[0];
        let expected = round1(r.skill_match_score * 0.6 + r.experience_match_score * 0.4);
        assert_eq!(r.overall_score, expected);
    }
}
