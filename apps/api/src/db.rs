use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Ensures the two tables the service owns exist. Idempotent; runs at every
/// startup.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resumes (
            id BIGSERIAL PRIMARY KEY,
            job_id TEXT NOT NULL,
            file_name TEXT NOT NULL,
            file_ref TEXT NOT NULL,
            candidate_name TEXT NOT NULL,
            parsed_data TEXT,
            uploaded_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_resumes_job_id ON resumes (job_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rankings (
            id BIGSERIAL PRIMARY KEY,
            resume_id BIGINT NOT NULL REFERENCES resumes (id) ON DELETE CASCADE,
            job_id TEXT NOT NULL,
            skill_match_score DOUBLE PRECISION NOT NULL,
            experience_match_score DOUBLE PRECISION NOT NULL,
            overall_score DOUBLE PRECISION NOT NULL,
            summary TEXT NOT NULL,
            ranked_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_rankings_job_id ON rankings (job_id)")
        .execute(pool)
        .await?;

    info!("Database schema ready");
    Ok(())
}
