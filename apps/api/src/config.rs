use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// all-MiniLM-L6-v2 run in process through fastembed.
    Local,
    /// Hosted sentence-transformer behind an HTTP feature-extraction endpoint.
    Remote,
    /// Local feature hashing. No network, lower quality.
    Hashing,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            "hashing" => Ok(Self::Hashing),
            other => Err(anyhow!(
                "EMBEDDING_BACKEND must be 'local', 'remote' or 'hashing', got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStoreBackend {
    Fs,
    S3(S3Config),
}

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Unset → resumes are kept in process memory.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_api_url: String,
    pub embedding_model: String,
    pub hf_api_key: Option<String>,
    pub embedding_timeout: Duration,
    /// Download cache for the local model; fastembed's default when unset.
    pub embedding_cache_dir: Option<PathBuf>,
    pub model_store: ModelStoreBackend,
    /// Filesystem path, or object key when the store is S3.
    pub model_artifact_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let model_store = match var("MODEL_STORE").as_deref().unwrap_or("fs") {
            "fs" => ModelStoreBackend::Fs,
            "s3" => ModelStoreBackend::S3(S3Config {
                bucket: require("S3_BUCKET")?,
                endpoint: require("S3_ENDPOINT")?,
                access_key_id: require("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            }),
            other => bail!("MODEL_STORE must be 'fs' or 's3', got '{other}'"),
        };

        let embedding_timeout_secs = var("EMBEDDING_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .context("EMBEDDING_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Config {
            database_url: var("DATABASE_URL"),
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            embedding_backend: var("EMBEDDING_BACKEND")
                .as_deref()
                .unwrap_or("local")
                .parse()?,
            embedding_api_url: var("EMBEDDING_API_URL")
                .unwrap_or_else(|| "https://api-inference.huggingface.co".to_string()),
            embedding_model: var("EMBEDDING_MODEL")
                .unwrap_or_else(|| "sentence-transformers/all-MiniLM-L6-v2".to_string()),
            hf_api_key: var("HF_API_KEY"),
            embedding_timeout: Duration::from_secs(embedding_timeout_secs.max(1)),
            embedding_cache_dir: var("EMBEDDING_CACHE_DIR").map(PathBuf::from),
            model_store,
            model_artifact_path: var("MODEL_ARTIFACT_PATH")
                .unwrap_or_else(|| "data/ranker.model".to_string()),
        })
    }

    /// Offline configuration for tests: in-memory resumes, hashing embeddings.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            port: 0,
            rust_log: "debug".to_string(),
            embedding_backend: EmbeddingBackend::Hashing,
            embedding_api_url: String::new(),
            embedding_model: String::new(),
            hf_api_key: None,
            embedding_timeout: Duration::from_secs(5),
            embedding_cache_dir: None,
            model_store: ModelStoreBackend::Fs,
            model_artifact_path: String::new(),
        }
    }
}
