//! OpenAI-compatible inference backend.
//!
//! Works with any endpoint that speaks the OpenAI `/embeddings` and
//! `/chat/completions` APIs with image content parts (OpenAI cloud, Azure
//! OpenAI, vLLM, LM Studio, Ollama in compatibility mode).
//!
//! # Example
//!
//! ```rust,no_run
//! use picpost_core::EmbeddingBackend;
//! use picpost_inference::openai::{OpenAIBackend, OpenAIConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         api_key: Some("sk-...".to_string()),
//!         ..Default::default()
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!
//!     let texts = vec!["A tabby cat asleep on a windowsill".to_string()];
//!     let vectors = backend.embed_texts(&texts).await.unwrap();
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{OpenAIBackend, OpenAIConfig};
pub use error::{from_http_failure, to_core_error, OpenAIErrorCode, Operation};
pub use types::*;
