use anyhow::{bail, Context, Result};

/// Which agent backend pair serves parse/rank calls. Selected once at
/// startup; there is no per-call switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentMode {
    Stub,
    Remote,
    Cloud,
}

/// Which file storage backend holds uploaded documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    Local,
    Object,
}

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub agent_mode: AgentMode,
    pub storage_backend: StorageBackendKind,
    pub parser_agent_url: String,
    pub ranking_agent_url: String,
    pub cloud_gateway_url: Option<String>,
    /// Present iff `storage_backend` is `Object`.
    pub s3: Option<S3Settings>,
    pub upload_dir: String,
    pub jobs_file: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let agent_mode = parse_agent_mode(
            &std::env::var("AGENT_MODE").unwrap_or_else(|_| "stub".to_string()),
        )?;
        let storage_backend = parse_storage_backend(
            &std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "local".to_string()),
        )?;

        // S3 settings are only demanded when the object backend is selected,
        // so stub/local setups need no cloud credentials at all.
        let s3 = match storage_backend {
            StorageBackendKind::Object => Some(S3Settings {
                bucket: require_env("S3_BUCKET")?,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            StorageBackendKind::Local => None,
        };

        let cloud_gateway_url = match agent_mode {
            AgentMode::Cloud => Some(require_env("CLOUD_GATEWAY_URL")?),
            _ => std::env::var("CLOUD_GATEWAY_URL").ok(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            agent_mode,
            storage_backend,
            parser_agent_url: std::env::var("PARSER_AGENT_URL")
                .unwrap_or_else(|_| "http://localhost:5100".to_string()),
            ranking_agent_url: std::env::var("RANKING_AGENT_URL")
                .unwrap_or_else(|_| "http://localhost:5101".to_string()),
            cloud_gateway_url,
            s3,
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            jobs_file: std::env::var("JOBS_FILE").unwrap_or_else(|_| "data/jobs.json".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn parse_agent_mode(raw: &str) -> Result<AgentMode> {
    match raw.to_lowercase().as_str() {
        "stub" => Ok(AgentMode::Stub),
        "remote" => Ok(AgentMode::Remote),
        "cloud" => Ok(AgentMode::Cloud),
        other => bail!("Unknown AGENT_MODE '{other}' (expected stub, remote, or cloud)"),
    }
}

fn parse_storage_backend(raw: &str) -> Result<StorageBackendKind> {
    match raw.to_lowercase().as_str() {
        "local" => Ok(StorageBackendKind::Local),
        "object" => Ok(StorageBackendKind::Object),
        other => bail!("Unknown STORAGE_BACKEND '{other}' (expected local or object)"),
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
