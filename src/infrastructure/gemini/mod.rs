//! Gemini text generation adapter

pub mod client;
pub mod errors;
pub mod types;

pub use client::GeminiGenerator;
pub use errors::GeminiApiError;
