//! crates/rag_chat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or rendering format.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// The label used when flattening history into prompt text.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Model => "Model",
        }
    }
}

/// How an ingested file is carried in a document's `content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// `content` is decoded UTF-8 text.
    Text,
    /// `content` is a base64 data URI (`data:<mime>;base64,<payload>`).
    Image,
}

/// One normalized, immutable knowledge-base item.
///
/// Created once from a successful file read and never mutated afterwards;
/// removal is only by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// Original filename, display-only. Duplicates across documents are fine.
    pub name: String,
    pub kind: DocumentKind,
    pub content: String,
    pub mime_type: String,
    /// Original file size in bytes, display-only.
    pub byte_size: u64,
}

impl Document {
    /// Normalizes a raw uploaded file into a `Document`.
    ///
    /// A file is an image when its declared MIME type starts with `image/`;
    /// everything else (code, markdown, CSV, JSON alike) is treated as plain
    /// text and decoded verbatim. A missing MIME type defaults to
    /// `text/plain`.
    pub fn from_bytes(name: &str, declared_mime: Option<&str>, bytes: &[u8], byte_size: u64) -> Self {
        let mime_type = match declared_mime {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => "text/plain".to_string(),
        };

        let (kind, content) = if mime_type.starts_with("image/") {
            let encoded = BASE64.encode(bytes);
            (
                DocumentKind::Image,
                format!("data:{};base64,{}", mime_type, encoded),
            )
        } else {
            // Mirrors a browser text read: invalid sequences are replaced,
            // never rejected.
            (DocumentKind::Text, String::from_utf8_lossy(bytes).into_owned())
        };

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            kind,
            content,
            mime_type,
            byte_size,
        }
    }

    /// Extracts the raw base64 payload from an image document's data URI:
    /// everything after the first `,`. Returns `None` when the URI has no
    /// comma or the payload is empty.
    pub fn inline_payload(&self) -> Option<&str> {
        match self.content.split_once(',') {
            Some((_, payload)) if !payload.is_empty() => Some(payload),
            _ => None,
        }
    }
}

/// One turn in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// True only for the single in-flight model placeholder; settled
    /// messages and user messages are never streaming.
    pub is_streaming: bool,
}

impl Message {
    /// A finished user turn. The text is immutable from creation.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
            is_streaming: false,
        }
    }

    /// An empty model placeholder, updated in place while the answer streams.
    pub fn model_placeholder() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Model,
            text: String::new(),
            timestamp: Utc::now(),
            is_streaming: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_mime_prefix_classifies_as_image() {
        let doc = Document::from_bytes("photo.png", Some("image/png"), &[0xff, 0x00], 2);
        assert_eq!(doc.kind, DocumentKind::Image);
        assert!(doc.content.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn non_image_mime_classifies_as_text() {
        let doc = Document::from_bytes("notes.md", Some("text/markdown"), b"# hi", 4);
        assert_eq!(doc.kind, DocumentKind::Text);
        assert_eq!(doc.content, "# hi");
        assert_eq!(doc.mime_type, "text/markdown");
    }

    #[test]
    fn missing_mime_defaults_to_text_plain() {
        let doc = Document::from_bytes("raw", None, b"data", 4);
        assert_eq!(doc.mime_type, "text/plain");
        assert_eq!(doc.kind, DocumentKind::Text);

        let doc = Document::from_bytes("raw", Some(""), b"data", 4);
        assert_eq!(doc.mime_type, "text/plain");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let doc = Document::from_bytes("bin.txt", Some("text/plain"), &[0x68, 0x69, 0xff], 3);
        assert_eq!(doc.content, "hi\u{fffd}");
    }

    #[test]
    fn duplicate_names_get_distinct_ids() {
        let a = Document::from_bytes("same.txt", None, b"a", 1);
        let b = Document::from_bytes("same.txt", None, b"b", 1);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn inline_payload_strips_up_to_first_comma() {
        let doc = Document::from_bytes("p.png", Some("image/png"), b"abc", 3);
        let payload = doc.inline_payload().expect("payload");
        assert_eq!(payload, BASE64.encode(b"abc"));
        // Round-trip: the payload decodes back to the original bytes.
        assert_eq!(BASE64.decode(payload).unwrap(), b"abc");
    }

    #[test]
    fn inline_payload_without_comma_is_none() {
        let mut doc = Document::from_bytes("p.png", Some("image/png"), b"abc", 3);
        doc.content = "data:image/png;base64".to_string();
        assert_eq!(doc.inline_payload(), None);
    }

    #[test]
    fn inline_payload_empty_after_comma_is_none() {
        let doc = Document::from_bytes("p.png", Some("image/png"), b"", 0);
        assert_eq!(doc.inline_payload(), None);
    }

    #[test]
    fn model_placeholder_starts_empty_and_streaming() {
        let msg = Message::model_placeholder();
        assert_eq!(msg.role, Role::Model);
        assert!(msg.text.is_empty());
        assert!(msg.is_streaming);
    }

    #[test]
    fn user_message_is_never_streaming() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        assert!(!msg.is_streaming);
    }
}
