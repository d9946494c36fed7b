//! Document extraction and normalization
//!
//! Turns a document source into raw text, and raw text into the clean text
//! the chunker consumes.

pub mod extractor;
pub mod html;
pub mod preprocessor;

pub use extractor::{DocumentExtractor, FileKind};
pub use html::visible_text;
pub use preprocessor::normalize;
