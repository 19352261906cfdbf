//! Semantic similarity — pluggable, trait-based embedding backend.
//!
//! Default: `HashEmbedder` (pure-Rust, fast, deterministic, fully testable).
//! Optional: `HttpEmbedder`, calling an external embedding service over HTTP.
//!
//! `AppState` holds an `Arc<dyn Embedder>`, swapped at startup via config.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding service returned an empty vector")]
    EmptyEmbedding,
}

/// The embedding boundary. Implement this to swap backends without touching
/// the metric calculators.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Backend label reported in response metadata.
    fn name(&self) -> &'static str;
}

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude or
/// the dimensions disagree.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Embeds both texts and returns their cosine similarity clamped to [0, 1].
/// Negative similarity is treated as "no similarity", never an error.
pub async fn semantic_similarity(
    embedder: &dyn Embedder,
    a: &str,
    b: &str,
) -> Result<f32, EmbedError> {
    let va = embedder.embed(a).await?;
    let vb = embedder.embed(b).await?;
    Ok(cosine_similarity(&va, &vb).clamp(0.0, 1.0))
}

// ────────────────────────────────────────────────────────────────────────────
// HashEmbedder — deterministic in-process default
// ────────────────────────────────────────────────────────────────────────────

const HASH_DIMS: usize = 256;

/// Bag-of-words embedding via feature hashing. Tokens are lowercased,
/// punctuation-stripped, hashed into a fixed-size vector, then L2-normalized.
/// Identical text always embeds identically, which keeps full analysis
/// idempotent without an external model.
pub struct HashEmbedder {
    dims: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self { dims: HASH_DIMS }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vector = vec![0.0_f32; self.dims];

        for token in text.split_whitespace() {
            let token: String = token
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let idx = (hasher.finish() % self.dims as u64) as usize;
            vector[idx] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        Ok(vector)
    }

    fn name(&self) -> &'static str {
        "hash"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HttpEmbedder — external embedding service backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Calls `POST {endpoint}` with `{"text": ...}` and expects
/// `{"embedding": [...]}`. Timeouts around this slow external call are the
/// host layer's responsibility; the client carries a generous ceiling only.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
}

impl HttpEmbedder {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("failed to build HTTP client"),
            endpoint,
        }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbedResponse = response.json().await?;
        if body.embedding.is_empty() {
            return Err(EmbedError::EmptyEmbedding);
        }

        debug!("embedding fetched: {} dims", body.embedding.len());
        Ok(body.embedding)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
