//! crates/rag_chat_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to stay independent of any specific language-model provider.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::prompt::ContentPart;

//=========================================================================================
// Generation Error and Result Types
//=========================================================================================

/// The error type for oracle operations. The upstream cause is carried as
/// text; it is logged at the turn boundary and never shown to the end user.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// The streaming request could not be issued at all.
    #[error("generation request failed: {0}")]
    Request(String),
    /// The stream broke after it started, possibly mid-answer.
    #[error("generation stream interrupted: {0}")]
    Stream(String),
}

/// A convenience type alias for `Result<T, GenerationError>`.
pub type GenResult<T> = Result<T, GenerationError>;

/// An asynchronous sequence of incremental answer-text chunks, terminated
/// normally by end-of-stream or by a transport/service error.
pub type ChunkStream = Pin<Box<dyn Stream<Item = GenResult<String>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The generation oracle boundary: one streaming text-generation request.
///
/// Implementations are explicitly constructed and injected, so tests can
/// substitute a stub. No retry happens behind this trait.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Issues a single streaming generation request carrying a system
    /// instruction and an ordered list of content parts.
    ///
    /// Chunks are yielded in arrival order and may be empty.
    async fn stream_generation(
        &self,
        system_instruction: &str,
        parts: Vec<ContentPart>,
    ) -> GenResult<ChunkStream>;
}
