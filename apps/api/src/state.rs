use std::sync::Arc;

use sqlx::PgPool;

use crate::agents::{ResumeParser, ResumeRanker};
use crate::catalog::JobCatalog;
use crate::config::Config;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The three capability objects are chosen once at startup from config and
/// never swapped per-call.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jobs: Arc<JobCatalog>,
    pub storage: Arc<dyn FileStore>,
    pub parser: Arc<dyn ResumeParser>,
    pub ranker: Arc<dyn ResumeRanker>,
    pub config: Config,
}
