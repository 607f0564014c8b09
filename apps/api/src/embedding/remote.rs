//! Remote embedding backend: sentence-transformer models served over a
//! Hugging Face style feature-extraction endpoint.
//!
//! The model handle is resolved lazily on the first non-empty `embed` call and
//! shared read-only afterwards. Resolution calls the endpoint once to learn
//! the output dimension, so every later vector can be checked against it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::{EmbeddingError, EmbeddingProvider};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const WARMUP_TEXT: &str = "dimension check";

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: [&'a str; 1],
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

/// Batched inputs come back as a list of vectors; some deployments return a
/// bare vector for a single input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Batch(Vec<Vec<f32>>),
    Single(Vec<f32>),
}

impl FeatureExtractionResponse {
    fn into_first(self) -> Option<Vec<f32>> {
        match self {
            FeatureExtractionResponse::Batch(batch) => batch.into_iter().next(),
            FeatureExtractionResponse::Single(vector) => Some(vector),
        }
    }
}

#[derive(Debug)]
struct LoadedModel {
    url: String,
    dimension: usize,
}

pub struct RemoteEmbeddingProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    loaded: OnceCell<LoadedModel>,
}

impl RemoteEmbeddingProvider {
    pub fn new(
        base_url: String,
        model: String,
        api_key: Option<String>,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EmbeddingError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            model,
            api_key,
            loaded: OnceCell::new(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/pipeline/feature-extraction/{}",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn load(&self) -> Result<LoadedModel, EmbeddingError> {
        let url = self.endpoint();
        info!("Loading embedding model {} from {}", self.model, url);

        let sample = self.request(&url, WARMUP_TEXT).await?;
        if sample.is_empty() {
            return Err(EmbeddingError::Unavailable(format!(
                "model {} returned an empty vector",
                self.model
            )));
        }

        info!(
            "Embedding model {} ready (dimension {})",
            self.model,
            sample.len()
        );
        Ok(LoadedModel {
            url,
            dimension: sample.len(),
        })
    }

    /// Posts one input. Retries on 429 and 5xx with exponential backoff.
    async fn request(&self, url: &str, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = FeatureExtractionRequest {
            inputs: [text],
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let mut last_error: Option<EmbeddingError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Embedding call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self.client.post(url).json(&body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbeddingError::Unavailable(format!("HTTP error: {e}")));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let text = response.text().await.unwrap_or_default();
                warn!("Embedding API returned {}: {}", status, text);
                last_error = Some(EmbeddingError::Unavailable(format!(
                    "API returned {status}"
                )));
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Unavailable(format!(
                    "API returned {status}: {text}"
                )));
            }

            let parsed: FeatureExtractionResponse = response.json().await.map_err(|e| {
                EmbeddingError::Unavailable(format!("unexpected response shape: {e}"))
            })?;

            let vector = parsed.into_first().unwrap_or_default();
            debug!("Embedding call succeeded: dimension={}", vector.len());
            return Ok(vector);
        }

        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::Unavailable(format!("gave up after {MAX_RETRIES} retries"))
        }))
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let model = self.loaded.get_or_try_init(|| self.load()).await?;
        let vector = self.request(&model.url, text).await?;

        if vector.len() != model.dimension {
            return Err(EmbeddingError::Unavailable(format!(
                "model {} returned dimension {}, expected {}",
                self.model,
                vector.len(),
                model.dimension
            )));
        }
        Ok(vector)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> Option<usize> {
        self.loaded.get().map(|model| model.dimension)
    }
}
