pub mod domain;
pub mod ports;
pub mod prompt;

pub use domain::{Document, DocumentKind, Message, Role};
pub use ports::{ChunkStream, GenResult, GenerationError, GenerationService};
pub use prompt::{assemble, ContentPart, HISTORY_WINDOW, SYSTEM_INSTRUCTION};
