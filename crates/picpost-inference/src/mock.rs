//! Mock inference backend for deterministic testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use picpost_core::{EmbeddingBackend, Error, Result, Vector};

use crate::vision::VisionBackend;

/// Mock backend implementing both embedding and vision.
///
/// Embeddings are filled with the text length so tests can tell inputs apart.
#[derive(Clone)]
pub struct MockInferenceBackend {
    dimension: usize,
    response: String,
    fail_vision: bool,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Embed(Vec<String>),
    Describe { mime_type: String, prompt: String },
}

impl MockInferenceBackend {
    pub fn new() -> Self {
        Self {
            dimension: 1536,
            response: "  A lighthouse on a cliff at sunset.  ".to_string(),
            fail_vision: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    pub fn failing_vision(mut self) -> Self {
        self.fail_vision = true;
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingBackend for MockInferenceBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        self.calls.lock().unwrap().push(MockCall::Embed(texts.to_vec()));
        Ok(texts
            .iter()
            .map(|t| Vector::from(vec![t.len() as f32; self.dimension]))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

#[async_trait]
impl VisionBackend for MockInferenceBackend {
    async fn describe_image(
        &self,
        _image_data: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        self.calls.lock().unwrap().push(MockCall::Describe {
            mime_type: mime_type.to_string(),
            prompt: prompt.to_string(),
        });
        if self.fail_vision {
            return Err(Error::Inference("mock vision failure".to_string()));
        }
        Ok(self.response.clone())
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}
