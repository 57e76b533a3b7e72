//! Agent gateway — pluggable resume-parsing and resume-ranking backends.
//!
//! Parsing and ranking are independent capabilities; a backend for each is
//! selected once at startup from `AgentMode` and carried in `AppState` as
//! `Arc<dyn ResumeParser>` / `Arc<dyn ResumeRanker>`. The gateway performs
//! no retries: any failure is fatal to the operation that triggered the call.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AgentMode, Config};
use crate::models::job::JobDescription;
use crate::models::ranking::NewRanking;
use crate::models::resume::{ParsedResumeData, ResumeRow};

pub mod cloud;
pub mod remote;
pub mod stub;
pub mod wire;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent unreachable: {0}")]
    Unreachable(String),

    #[error("agent call timed out")]
    Timeout,

    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AgentError::Timeout
        } else if e.is_decode() {
            AgentError::InvalidResponse(e.to_string())
        } else {
            AgentError::Unreachable(e.to_string())
        }
    }
}

/// Resume parsing capability: turns a stored-file reference into structured
/// candidate data.
#[async_trait]
pub trait ResumeParser: Send + Sync {
    async fn parse(&self, file_ref: &str) -> Result<ParsedResumeData, AgentError>;
}

/// Resume ranking capability: scores a set of resumes against one job.
///
/// Never called with an empty slice. The backend is not required to return
/// exactly one result per resume or preserve order; callers correlate by
/// `resume_id`.
#[async_trait]
pub trait ResumeRanker: Send + Sync {
    async fn rank(
        &self,
        resumes: &[ResumeRow],
        job: &JobDescription,
    ) -> Result<Vec<NewRanking>, AgentError>;
}

/// Builds the parser and ranker backends for the configured agent mode.
pub fn build_agents(
    config: &Config,
) -> anyhow::Result<(Arc<dyn ResumeParser>, Arc<dyn ResumeRanker>)> {
    match config.agent_mode {
        AgentMode::Stub => Ok((
            Arc::new(stub::StubParserAgent),
            Arc::new(stub::StubRankingAgent),
        )),
        AgentMode::Remote => Ok((
            Arc::new(remote::RemoteParserAgent::new(
                config.parser_agent_url.clone(),
            )),
            Arc::new(remote::RemoteRankingAgent::new(
                config.ranking_agent_url.clone(),
            )),
        )),
        AgentMode::Cloud => {
            let base_url = config
                .cloud_gateway_url
                .clone()
                .context("CLOUD_GATEWAY_URL is required when AGENT_MODE=cloud")?;
            Ok((
                Arc::new(cloud::CloudParserAgent::new(base_url.clone())),
                Arc::new(cloud::CloudRankingAgent::new(base_url)),
            ))
        }
    }
}
