//! Domain layer for the ragline retrieval pipeline
//!
//! Core models, errors and the port traits that adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, ErrorCategory};
