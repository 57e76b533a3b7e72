pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::catalog;
use crate::ranking;
use crate::state::AppState;
use crate::upload;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/jobs", get(catalog::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(catalog::handle_job_detail))
        .route("/api/v1/jobs/:id/resumes", post(upload::handle_upload))
        .route(
            "/api/v1/jobs/:id/resumes/:resume_id",
            delete(ranking::handle_delete_resume),
        )
        .route("/api/v1/jobs/:id/rankings", post(ranking::handle_rerank))
        .with_state(state)
}
