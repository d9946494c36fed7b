//! Infrastructure layer module
//!
//! Concrete implementations behind the domain ports and the ambient stack:
//! - Document extraction and text normalization
//! - Chunking, hashing embeddings and the flat vector index
//! - Gemini generation client
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod extract;
pub mod gemini;
pub mod logging;
pub mod vector;
