//! Agents backed by co-located network services (one per capability).

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use crate::agents::wire::{into_rankings, ParseRequest, ParseResponse, RankRequest, RankResponse};
use crate::agents::{AgentError, ResumeParser, ResumeRanker};
use crate::models::job::JobDescription;
use crate::models::ranking::NewRanking;
use crate::models::resume::{ParsedResumeData, ResumeRow};

const PARSE_TIMEOUT: Duration = Duration::from_secs(30);
const RANK_TIMEOUT: Duration = Duration::from_secs(120);

pub struct RemoteParserAgent {
    client: Client,
    base_url: String,
}

impl RemoteParserAgent {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(PARSE_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ResumeParser for RemoteParserAgent {
    async fn parse(&self, file_ref: &str) -> Result<ParsedResumeData, AgentError> {
        let url = format!("{}/parse", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ParseRequest { file_path: file_ref })
            .send()
            .await
            .map_err(|e| {
                error!("Resume parser call failed for {file_ref}: {e}");
                AgentError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Resume parser returned {status} for {file_ref}: {body}");
            return Err(AgentError::InvalidResponse(format!(
                "parser returned status {status}"
            )));
        }

        let parsed: ParseResponse = response.json().await?;
        Ok(parsed.into_parsed())
    }
}

pub struct RemoteRankingAgent {
    client: Client,
    base_url: String,
}

impl RemoteRankingAgent {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(RANK_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ResumeRanker for RemoteRankingAgent {
    async fn rank(
        &self,
        resumes: &[ResumeRow],
        job: &JobDescription,
    ) -> Result<Vec<NewRanking>, AgentError> {
        info!(
            "Calling ranking agent for job {} with {} resumes",
            job.id,
            resumes.len()
        );

        let url = format!("{}/rank", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RankRequest::build(resumes, job))
            .send()
            .await
            .map_err(|e| {
                error!("Ranking agent call failed for job {}: {e}", job.id);
                AgentError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Ranking agent returned {status} for job {}: {body}", job.id);
            return Err(AgentError::InvalidResponse(format!(
                "ranker returned status {status}"
            )));
        }

        let scores: RankResponse = response.json().await?;
        info!("Ranking agent scored {} resumes", scores.rankings.len());

        let sent_ids: HashSet<i64> = resumes.iter().map(|r| r.id).collect();
        Ok(into_rankings(scores, &job.id, &sent_ids))
    }
}
