//! # picpost-inference
//!
//! AI collaborators for picpost image indexing.
//!
//! This crate provides:
//! - An OpenAI-compatible backend for text embeddings and image description
//! - The [`VisionBackend`] trait for multimodal models
//! - [`ImageIndexer`], which turns stored images into catalog embeddings and
//!   caption suggestions
//!
//! Nothing here runs on the request path. The admin CLI constructs an
//! indexer explicitly from configuration.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use picpost_inference::{ImageIndexer, OpenAIBackend, OpenAIConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Arc::new(OpenAIBackend::new(OpenAIConfig::default()).unwrap());
//!     let indexer = ImageIndexer::new(backend.clone(), backend);
//!     let caption = indexer.generate_caption(&[], "image/png").await;
//! }
//! ```

pub mod indexer;
pub mod openai;
pub mod vision;

// Mock inference backend for testing
#[cfg(test)]
pub mod mock;

// Re-export core types
pub use picpost_core::*;

pub use indexer::{ImageIndexer, IndexReport, CAPTION_PROMPT, DESCRIBE_PROMPT};
pub use openai::{OpenAIBackend, OpenAIConfig};
pub use vision::{image_data_url, VisionBackend};
