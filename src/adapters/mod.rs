//! Adapters for storage and embedding backends.

pub mod embeddings;
pub mod memory;
pub mod sqlite;
