//! Wire shapes shared by the remote and cloud agent backends.
//!
//! Field names are lower-snake on the wire. The role-suggestion list has two
//! historical shapes — bare strings (legacy) and `{role, score}` objects —
//! modeled as an untagged union and normalized into `SuitableRole` here.

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::job::JobDescription;
use crate::models::ranking::NewRanking;
use crate::models::resume::{ParsedResumeData, ResumeRow, SuitableRole};

// ── Parse ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ParseRequest<'a> {
    pub file_path: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ParseResponse {
    pub candidate_name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub suitable_roles: Vec<WireRole>,
}

/// A role suggestion as it appears on the wire: either the legacy bare-string
/// shape or the current scored-object shape (accepting capitalized field
/// names from older agent builds).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireRole {
    Scored {
        #[serde(alias = "Role")]
        role: String,
        // Agents may omit the score entirely; treat that like a zero, the
        // same as the legacy shape.
        #[serde(default, alias = "Score")]
        score: i64,
    },
    Legacy(String),
}

impl From<WireRole> for SuitableRole {
    fn from(wire: WireRole) -> Self {
        match wire {
            WireRole::Scored { role, score } => SuitableRole { role, score },
            WireRole::Legacy(role) => SuitableRole { role, score: 0 },
        }
    }
}

impl ParseResponse {
    pub fn into_parsed(self) -> ParsedResumeData {
        ParsedResumeData {
            candidate_name: self.candidate_name,
            skills: self.skills,
            experience_level: self.experience_level,
            summary: self.summary,
            suitable_roles: self.suitable_roles.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Rank ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RankRequest<'a> {
    pub resumes: Vec<RankResume>,
    pub job: RankJob<'a>,
}

#[derive(Debug, Serialize)]
pub struct RankResume {
    pub resume_id: i64,
    pub candidate_name: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RankJob<'a> {
    pub job_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub required_skills: &'a [String],
    pub preferred_skills: &'a [String],
    pub experience_level: &'a str,
}

impl<'a> RankRequest<'a> {
    pub fn build(resumes: &[ResumeRow], job: &'a JobDescription) -> Self {
        let resumes = resumes
            .iter()
            .map(|row| {
                // The embedded payload is best-effort here: an undecodable
                // blob degrades to empty skills rather than failing the rank.
                let parsed = row
                    .parsed_data
                    .as_deref()
                    .and_then(|raw| serde_json::from_str::<ParsedResumeData>(raw).ok());
                let (skills, experience_level, summary) = match parsed {
                    Some(p) => (p.skills, p.experience_level, p.summary),
                    None => (Vec::new(), None, None),
                };
                RankResume {
                    resume_id: row.id,
                    candidate_name: row.candidate_name.clone(),
                    skills,
                    experience_level,
                    summary,
                }
            })
            .collect();

        RankRequest {
            resumes,
            job: RankJob {
                job_id: &job.id,
                title: &job.title,
                description: &job.description,
                required_skills: &job.required_skills,
                preferred_skills: &job.preferred_skills,
                experience_level: &job.experience_level,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RankResponse {
    pub rankings: Vec<RankScore>,
}

#[derive(Debug, Deserialize)]
pub struct RankScore {
    pub resume_id: i64,
    pub skill_match_score: f64,
    pub experience_match_score: f64,
    pub overall_score: f64,
    pub summary: String,
}

/// Correlates agent scores back to resumes by id and stamps them for the
/// job. Scores for ids that were not in the request are dropped with a
/// warning rather than persisted against nothing.
pub fn into_rankings(response: RankResponse, job_id: &str, sent_ids: &HashSet<i64>) -> Vec<NewRanking> {
    let ranked_at = Utc::now();
    response
        .rankings
        .into_iter()
        .filter(|score| {
            let known = sent_ids.contains(&score.resume_id);
            if !known {
                warn!(
                    "Ranking agent returned unknown resume_id {} for job {}; dropping",
                    score.resume_id, job_id
                );
            }
            known
        })
        .map(|score| NewRanking {
            resume_id: score.resume_id,
            job_id: job_id.to_string(),
            skill_match_score: score.skill_match_score,
            experience_match_score: score.experience_match_score,
            overall_score: score.overall_score,
            summary: score.summary,
            ranked_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn resume_row(id: i64, parsed_data: Option<&str>) -> ResumeRow {
        ResumeRow {
            id,
            job_id: "backend-1".to_string(),
            file_name: "resume.pdf".to_string(),
            file_ref: "resumes/backend-1/x.pdf".to_string(),
            candidate_name: "Jane Doe".to_string(),
            parsed_data: parsed_data.map(String::from),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_wire_role_legacy_string_scores_zero() {
        let roles: Vec<WireRole> = serde_json::from_str(r#"["Backend Engineer"]"#).unwrap();
        let role: SuitableRole = roles.into_iter().next().unwrap().into();
        assert_eq!(role.role, "Backend Engineer");
        assert_eq!(role.score, 0);
    }

    #[test]
    fn test_wire_role_scored_object() {
        let roles: Vec<WireRole> =
            serde_json::from_str(r#"[{"role": "DevOps Engineer", "score": 82}]"#).unwrap();
        let role: SuitableRole = roles.into_iter().next().unwrap().into();
        assert_eq!(role.role, "DevOps Engineer");
        assert_eq!(role.score, 82);
    }

    #[test]
    fn test_wire_role_object_without_score_defaults_to_zero() {
        let roles: Vec<WireRole> = serde_json::from_str(r#"[{"role": "X"}]"#).unwrap();
        let role: SuitableRole = roles.into_iter().next().unwrap().into();
        assert_eq!(role.role, "X");
        assert_eq!(role.score, 0);
    }

    #[test]
    fn test_wire_role_capitalized_fields() {
        let roles: Vec<WireRole> =
            serde_json::from_str(r#"[{"Role": "Cloud Engineer", "Score": 70}]"#).unwrap();
        let role: SuitableRole = roles.into_iter().next().unwrap().into();
        assert_eq!(role.role, "Cloud Engineer");
        assert_eq!(role.score, 70);
    }

    #[test]
    fn test_parse_response_without_optionals() {
        let resp: ParseResponse =
            serde_json::from_str(r#"{"candidate_name": "Jane Doe"}"#).unwrap();
        let parsed = resp.into_parsed();
        assert_eq!(parsed.candidate_name, "Jane Doe");
        assert!(parsed.skills.is_empty());
        assert!(parsed.experience_level.is_none());
        assert!(parsed.suitable_roles.is_empty());
    }

    #[test]
    fn test_rank_request_embeds_parsed_skills() {
        let job = JobDescription {
            id: "backend-1".to_string(),
            title: "Backend Engineer".to_string(),
            department: "Engineering".to_string(),
            description: "Build services".to_string(),
            required_skills: vec!["Rust".to_string()],
            preferred_skills: vec![],
            experience_level: "Senior".to_string(),
            location: "Remote".to_string(),
        };
        let rows = vec![resume_row(
            7,
            Some(r#"{"candidate_name": "Jane Doe", "skills": ["Rust", "SQL"]}"#),
        )];

        let request = RankRequest::build(&rows, &job);
        assert_eq!(request.resumes.len(), 1);
        assert_eq!(request.resumes[0].resume_id, 7);
        assert_eq!(request.resumes[0].skills, vec!["Rust", "SQL"]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["job"]["job_id"], "backend-1");
        assert_eq!(json["resumes"][0]["candidate_name"], "Jane Doe");
    }

    #[test]
    fn test_rank_request_tolerates_undecodable_payload() {
        let rows = vec![resume_row(3, Some("not json"))];
        let job = JobDescription {
            id: "j".to_string(),
            title: String::new(),
            department: String::new(),
            description: String::new(),
            required_skills: vec![],
            preferred_skills: vec![],
            experience_level: String::new(),
            location: String::new(),
        };
        let request = RankRequest::build(&rows, &job);
        assert!(request.resumes[0].skills.is_empty());
        assert!(request.resumes[0].experience_level.is_none());
    }

    #[test]
    fn test_into_rankings_drops_unknown_resume_ids() {
        let response = RankResponse {
            rankings: vec![
                RankScore {
                    resume_id: 1,
                    skill_match_score: 80.0,
                    experience_match_score: 60.0,
                    overall_score: 72.0,
                    summary: "Strong match".to_string(),
                },
                RankScore {
                    resume_id: 999,
                    skill_match_score: 10.0,
                    experience_match_score: 10.0,
                    overall_score: 10.0,
                    summary: "Phantom".to_string(),
                },
            ],
        };
        let sent: HashSet<i64> = [1].into_iter().collect();
        let rankings = into_rankings(response, "backend-1", &sent);
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].resume_id, 1);
        assert_eq!(rankings[0].job_id, "backend-1");
    }
}
