//! services/chat/src/error.rs
//!
//! Defines the primary error type for the entire chat service.

use crate::adapters::ingest::ReadError;
use crate::config::ConfigError;
use rag_chat_core::ports::GenerationError;

/// The primary error type for the `chat` service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a generation-oracle failure that escaped a turn.
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    /// Represents a single-file ingestion failure.
    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    /// Represents a standard Input/Output error (e.g., reading stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
