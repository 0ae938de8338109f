//! Vision backend trait for image description.

use async_trait::async_trait;
use base64::Engine;
use picpost_core::Result;

/// Backend for describing images using multimodal models.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Describe an image following the given prompt.
    async fn describe_image(&self, image_data: &[u8], mime_type: &str, prompt: &str)
        -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Encode image bytes as a `data:` URL for inline transport.
pub fn image_data_url(image_data: &[u8], mime_type: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(image_data);
    format!("data:{};base64,{}", mime_type, encoded)
}
