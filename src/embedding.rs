//! Blocking client for the remote embedding service.
//!
//! Speaks the OpenAI-compatible `/v1/embeddings` shape. One best-effort
//! request per call with a bounded timeout; callers decide whether to retry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::Error;

/// Client for generating text embeddings via a remote model server.
///
/// Cheap to share: the underlying agent pools connections and the client is
/// `Send + Sync`, so concurrent callers embed in parallel.
pub struct EmbeddingClient {
    agent: ureq::Agent,
    url: String,
    model: String,
    dims: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    /// Create a client for the given endpoint, model, and vector dimension.
    pub fn new(url: &str, model: &str, dims: usize, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        EmbeddingClient {
            agent,
            url: url.to_string(),
            model: model.to_string(),
            dims,
        }
    }

    /// Generate an embedding for a single text.
    ///
    /// Returns a vector of exactly the configured dimension; responses of any
    /// other length are rejected so the index never ingests a malformed
    /// vector.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if the text is empty or whitespace-only
    /// - `Error::UpstreamUnavailable` on transport failure or timeout
    /// - `Error::UpstreamProtocol` on a non-2xx status or malformed body
    /// - `Error::DimensionMismatch` if the returned length differs from the
    ///   configured dimension
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        if text.trim().is_empty() {
            return Err(Error::Validation("cannot embed empty text".to_string()));
        }

        debug!(model = %self.model, chars = text.len(), "requesting embedding");

        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = match self.agent.post(&self.url).send_json(&request) {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                warn!(code, "embedding service returned error status");
                return Err(Error::UpstreamProtocol(format!(
                    "embedding service returned HTTP {code}: {body}"
                )));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(Error::UpstreamUnavailable {
                    url: self.url.clone(),
                    reason: transport.to_string(),
                });
            }
        };

        let parsed: EmbeddingResponse = response.into_json().map_err(|e| {
            Error::UpstreamProtocol(format!("malformed embedding response: {e}"))
        })?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                Error::UpstreamProtocol("embedding response contained no data".to_string())
            })?;

        if embedding.len() != self.dims {
            return Err(Error::DimensionMismatch {
                expected: self.dims,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    /// Get the configured model identifier.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the configured endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the configured vector dimension.
    pub fn dims(&self) -> usize {
        self.dims
    }
}
