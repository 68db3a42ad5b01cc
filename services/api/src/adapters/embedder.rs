//! services/api/src/adapters/embedder.rs
//!
//! This module contains the adapter for the OpenAI embeddings API.
//! It implements the `EmbeddingService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::CreateEmbeddingRequestArgs, Client,
};
use async_trait::async_trait;
use docuchat_core::ports::{CoreError, CoreResult, EmbeddingService};

/// How many inputs to send per embeddings request. Batching keeps the
/// request count (and latency) down when a large document is trained.
const EMBED_BATCH_SIZE: usize = 64;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EmbeddingService` using the OpenAI embeddings API.
#[derive(Clone)]
pub struct OpenAiEmbeddingAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbeddingAdapter {
    /// Creates a new `OpenAiEmbeddingAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `EmbeddingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingAdapter {
    /// Computes one embedding vector per input text, preserving input order.
    async fn embed(&self, texts: &[String]) -> CoreResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(batch.to_vec())
                .build()
                .map_err(|e| CoreError::Upstream(e.to_string()))?;

            // Call the API and manually map the error, which respects the orphan rule.
            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e: OpenAIError| CoreError::Upstream(e.to_string()))?;

            if response.data.len() != batch.len() {
                return Err(CoreError::Upstream(format!(
                    "Embeddings API returned {} vectors for {} inputs",
                    response.data.len(),
                    batch.len()
                )));
            }

            // The API reports an index per vector; sort so order matches the input.
            let mut data = response.data;
            data.sort_by_key(|d| d.index);
            vectors.extend(data.into_iter().map(|d| d.embedding));
        }

        Ok(vectors)
    }
}
