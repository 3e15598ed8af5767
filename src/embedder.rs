use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::error::{IndexError, IndexResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Embedding collaborator seam. Implementations must be length- and
/// order-preserving, and return unit-length vectors so that inner
/// product equals cosine similarity.
pub trait Embedder {
    fn dim(&self) -> usize;

    /// Embed chunk texts for indexing, preserving input order.
    fn embed_passages(&self, texts: &[String]) -> IndexResult<Vec<Vec<f32>>>;

    /// Embed a search query.
    fn embed_query(&self, text: &str) -> IndexResult<Vec<f32>>;
}

/// Blocking embeddings client for OpenAI-compatible `/v1/embeddings`
/// endpoints. Applies the E5 `passage:` / `query:` prefixes and
/// normalizes vectors client-side. No retries: a failed batch fails the
/// build, which is a corpus-level error, not a per-document one.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    config: EmbeddingConfig,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl HttpEmbedder {
    pub fn new(endpoint: impl Into<String>, config: EmbeddingConfig) -> IndexResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| IndexError::Embedding(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            config,
        })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// One request for one batch, already within the configured batch size.
    fn embed_batch(&self, inputs: &[String]) -> IndexResult<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: inputs,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(IndexError::Embedding(format!(
                "embedding endpoint returned {status}: {body}"
            )));
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .map_err(|e| IndexError::Embedding(format!("malformed embedding response: {e}")))?;
        parsed.data.sort_by_key(|entry| entry.index);

        if parsed.data.len() != inputs.len() {
            return Err(IndexError::LengthMismatch {
                sent: inputs.len(),
                received: parsed.data.len(),
            });
        }

        let mut vectors = Vec::with_capacity(parsed.data.len());
        for entry in parsed.data {
            if entry.embedding.len() != self.config.dim {
                return Err(IndexError::DimensionMismatch {
                    expected: self.config.dim,
                    actual: entry.embedding.len(),
                });
            }
            let mut v = entry.embedding;
            normalize(&mut v);
            vectors.push(v);
        }
        Ok(vectors)
    }
}

impl Embedder for HttpEmbedder {
    fn dim(&self) -> usize {
        self.config.dim
    }

    fn embed_passages(&self, texts: &[String]) -> IndexResult<Vec<Vec<f32>>> {
        let prefixed: Vec<String> = texts.iter().map(|t| format!("passage: {t}")).collect();
        let mut vectors = Vec::with_capacity(prefixed.len());
        for batch in prefixed.chunks(self.config.batch_size.max(1)) {
            debug!(batch_len = batch.len(), "embedding batch");
            vectors.extend(self.embed_batch(batch)?);
        }
        Ok(vectors)
    }

    fn embed_query(&self, text: &str) -> IndexResult<Vec<f32>> {
        let vectors = self.embed_batch(&[format!("query: {text}")])?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::Embedding("empty response for query".to_string()))
    }
}

/// L2-normalize in place; the zero vector is left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
