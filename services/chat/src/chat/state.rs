//! services/chat/src/chat/state.rs
//!
//! Defines the session-lifetime conversation state: the ordered message
//! list and the knowledge-base document set.

use rag_chat_core::domain::{Document, Message};
use uuid::Uuid;

/// The state for one chat session. Lives only for the process lifetime;
/// nothing is persisted.
///
/// Messages are append-only, except for the in-place text update of the
/// currently streaming model placeholder. Documents keep insertion order and
/// are removed only by id.
#[derive(Default)]
pub struct Conversation {
    pub(crate) documents: Vec<Document>,
    pub(crate) messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn add_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Removes a document by id. Returns false when no document matched.
    pub fn remove_document(&mut self, id: &Uuid) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != *id);
        self.documents.len() != before
    }

    /// True while a model placeholder is still streaming. Submission is
    /// rejected while busy (single-flight).
    pub fn is_busy(&self) -> bool {
        self.messages.iter().any(|m| m.is_streaming)
    }
}
