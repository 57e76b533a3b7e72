mod agents;
mod catalog;
mod config;
mod db;
mod errors;
mod models;
mod ranking;
mod roles;
mod routes;
mod state;
mod storage;
mod upload;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agents::build_agents;
use crate::catalog::JobCatalog;
use crate::config::{Config, S3Settings, StorageBackendKind};
use crate::db::{create_pool, init_schema};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStore, LocalDiskStore, ObjectStore};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentSift API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    // Load the static job catalog (immutable after startup)
    let jobs = Arc::new(JobCatalog::load(std::path::Path::new(&config.jobs_file))?);

    // Select the file storage backend
    let storage: Arc<dyn FileStore> = match config.storage_backend {
        StorageBackendKind::Local => {
            info!("File storage: local disk at {}", config.upload_dir);
            Arc::new(LocalDiskStore::new(config.upload_dir.clone()))
        }
        StorageBackendKind::Object => {
            let settings = config
                .s3
                .clone()
                .context("object storage selected without S3 settings")?;
            let client = build_s3_client(&settings).await;
            info!("File storage: object store bucket {}", settings.bucket);
            Arc::new(ObjectStore::new(client, settings.bucket))
        }
    };

    // Select the agent backends
    let (parser, ranker) = build_agents(&config)?;
    info!("Agent mode: {:?}", config.agent_mode);

    // Build app state
    let state = AppState {
        db,
        jobs,
        storage,
        parser,
        ranker,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(settings: &S3Settings) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &settings.access_key_id,
        &settings.secret_access_key,
        None,
        None,
        "talentsift-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&settings.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
