//! OpenAI-compatible inference backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use picpost_core::{defaults, EmbeddingBackend, Error, Result, Vector};

use super::error::{from_http_failure, Operation};
use super::types::*;
use crate::vision::{image_data_url, VisionBackend};

/// Configuration for OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key for authentication (optional for local endpoints).
    pub api_key: Option<String>,
    /// Model to use for embeddings.
    pub embed_model: String,
    /// Multimodal model used to describe and caption images.
    pub vision_model: String,
    /// Expected embedding dimension.
    pub embed_dimension: usize,
    /// Token cap for vision responses.
    pub vision_max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::OPENAI_URL.to_string(),
            api_key: None,
            embed_model: defaults::EMBED_MODEL.to_string(),
            vision_model: defaults::VISION_MODEL.to_string(),
            embed_dimension: defaults::EMBEDDING_DIMENSION,
            vision_max_tokens: defaults::VISION_MAX_TOKENS,
            timeout_seconds: defaults::INFERENCE_TIMEOUT_SECS,
        }
    }
}

/// OpenAI-compatible inference backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            base_url = %config.base_url,
            embed_model = %config.embed_model,
            vision_model = %config.vision_model,
            "Initializing OpenAI backend"
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        req.header("Content-Type", "application/json")
    }

    async fn send_json<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
        op: Operation,
    ) -> Result<reqwest::Response> {
        let response = self.build_request(endpoint).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(from_http_failure(status.as_u16(), &body, op));
        }
        Ok(response)
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAIBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let request = EmbeddingRequest {
            model: self.config.embed_model.clone(),
            input: texts.to_vec(),
            encoding_format: Some("float".to_string()),
        };

        let result: EmbeddingResponse = self
            .send_json("/embeddings", &request, Operation::Embedding)
            .await?
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        if result.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        // Sort by index to ensure correct ordering
        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        let vectors: Vec<Vector> = data
            .into_iter()
            .map(|d| Vector::from(d.embedding))
            .collect();

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "embed",
            model = %self.config.embed_model,
            count = vectors.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generated embeddings"
        );
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.embed_dimension
    }

    fn model_name(&self) -> &str {
        &self.config.embed_model
    }
}

#[async_trait]
impl VisionBackend for OpenAIBackend {
    async fn describe_image(
        &self,
        image_data: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        let start = Instant::now();
        let request = ChatCompletionRequest {
            model: self.config.vision_model.clone(),
            messages: vec![ChatMessage::user_with_image(
                prompt,
                image_data_url(image_data, mime_type),
            )],
            max_tokens: Some(self.config.vision_max_tokens),
        };

        let result: ChatCompletionResponse = self
            .send_json("/chat/completions", &request, Operation::Vision)
            .await?
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Inference("Vision response had no content".to_string()))?;

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "describe_image",
            model = %self.config.vision_model,
            image_bytes = image_data.len(),
            response_len = content.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Vision completion finished"
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.vision_model
    }
}
