//! Model artifact persistence for the ML ranker.
//!
//! Artifacts are opaque byte blobs. Every backend replaces the artifact
//! wholesale: readers see either the previous blob or the new one.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::config::{Config, ModelStoreBackend};
use crate::matching::ml_ranker::RankerError;

#[async_trait]
pub trait ModelArtifactStore: Send + Sync {
    /// Returns `None` when no artifact has been saved yet.
    async fn load(&self) -> Result<Option<Vec<u8>>, RankerError>;

    async fn save(&self, bytes: &[u8]) -> Result<(), RankerError>;

    async fn exists(&self) -> Result<bool, RankerError>;

    /// Human-readable location for logs.
    fn location(&self) -> String;
}

// ────────────────────────────────────────────────────────────────────────────
// Filesystem
// ────────────────────────────────────────────────────────────────────────────

/// Stores the artifact at a fixed path. Saves write a sibling temp file and
/// rename it over the target.
pub struct FsModelStore {
    path: PathBuf,
}

impl FsModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModelArtifactStore for FsModelStore {
    async fn load(&self) -> Result<Option<Vec<u8>>, RankerError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RankerError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, bytes: &[u8]) -> Result<(), RankerError> {
        let path = self.path.clone();
        let bytes = bytes.to_vec();

        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            };
            std::fs::create_dir_all(&dir)?;

            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| RankerError::Storage(format!("artifact write task failed: {e}")))?
        .map_err(|e| {
            RankerError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })?;

        info!("Saved model artifact to {}", self.path.display());
        Ok(())
    }

    async fn exists(&self) -> Result<bool, RankerError> {
        tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| RankerError::Storage(format!("failed to stat {}: {e}", self.path.display())))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 / MinIO
// ────────────────────────────────────────────────────────────────────────────

/// Stores the artifact as a single object. A PUT replaces the object atomically.
pub struct S3ModelStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    key: String,
}

impl S3ModelStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, key: String) -> Self {
        Self {
            client,
            bucket,
            key,
        }
    }
}

#[async_trait]
impl ModelArtifactStore for S3ModelStore {
    async fn load(&self) -> Result<Option<Vec<u8>>, RankerError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                return match e.into_service_error() {
                    GetObjectError::NoSuchKey(_) => Ok(None),
                    other => Err(RankerError::Storage(format!("S3 get failed: {other}"))),
                }
            }
        };

        let body: bytes::Bytes = output
            .body
            .collect()
            .await
            .map_err(|e| RankerError::Storage(format!("S3 body read failed: {e}")))?
            .into_bytes();
        Ok(Some(body.to_vec()))
    }

    async fn save(&self, bytes: &[u8]) -> Result<(), RankerError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type("application/octet-stream")
            .send()
            .await
            .map_err(|e| RankerError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded model artifact to s3://{}/{}", self.bucket, self.key);
        Ok(())
    }

    async fn exists(&self) -> Result<bool, RankerError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match e.into_service_error() {
                HeadObjectError::NotFound(_) => Ok(false),
                other => Err(RankerError::Storage(format!("S3 head failed: {other}"))),
            },
        }
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(
    endpoint: &str,
    access_key_id: &str,
    secret_access_key: &str,
) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        access_key_id,
        secret_access_key,
        None,
        None,
        "ranker-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(endpoint)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

/// Builds the configured artifact backend.
pub async fn build_model_store(config: &Config) -> anyhow::Result<Arc<dyn ModelArtifactStore>> {
    Ok(match &config.model_store {
        ModelStoreBackend::Fs => Arc::new(FsModelStore::new(&config.model_artifact_path)),
        ModelStoreBackend::S3(s3) => {
            let client =
                build_s3_client(&s3.endpoint, &s3.access_key_id, &s3.secret_access_key).await;
            Arc::new(S3ModelStore::new(
                client,
                s3.bucket.clone(),
                config.model_artifact_path.clone(),
            ))
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory (tests)
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[derive(Default)]
pub struct InMemoryModelStore {
    bytes: std::sync::Mutex<Option<Vec<u8>>>,
}

#[cfg(test)]
#[async_trait]
impl ModelArtifactStore for InMemoryModelStore {
    async fn load(&self) -> Result<Option<Vec<u8>>, RankerError> {
        Ok(self.bytes.lock().unwrap().clone())
    }

    async fn save(&self, bytes: &[u8]) -> Result<(), RankerError> {
        *self.bytes.lock().unwrap() = Some(bytes.to_vec());
        Ok(())
    }

    async fn exists(&self) -> Result<bool, RankerError> {
        Ok(self.bytes.lock().unwrap().is_some())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
