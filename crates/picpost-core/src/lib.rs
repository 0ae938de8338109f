//! # picpost-core
//!
//! Core types, traits, and abstractions for picpost.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the storage, inference, and API crates depend on.

pub mod defaults;
pub mod error;
pub mod media;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use media::{detect_content_type, image_extension, is_image_media_type, is_safe_blob_name};
pub use models::*;
pub use traits::*;
