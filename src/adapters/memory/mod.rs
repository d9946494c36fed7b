//! Process-local adapters.

pub mod chunk_repository;

pub use chunk_repository::InMemoryChunkRepository;
