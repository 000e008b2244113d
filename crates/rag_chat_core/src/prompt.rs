//! crates/rag_chat_core/src/prompt.rs
//!
//! Deterministic assembly of one generation request from the knowledge base,
//! a bounded tail of conversation history, and the current question.
//!
//! This is in-context RAG: nothing is retrieved or reranked, all reference
//! material is injected verbatim. The part ordering (knowledge base, images,
//! history, question) is fixed so the model consistently treats the knowledge
//! base as primary context regardless of how much of it there is.

use serde::{Deserialize, Serialize};

use crate::domain::{Document, DocumentKind, Message};

/// The fixed system instruction declaring the assistant's RAG role.
pub const SYSTEM_INSTRUCTION: &str = "You are an advanced RAG (Retrieval Augmented Generation) \
assistant. You analyze uploaded documents and images to provide fact-based answers.";

/// How many trailing history entries are flattened into the prompt.
pub const HISTORY_WINDOW: usize = 6;

const KNOWLEDGE_BASE_INTRO: &str =
    "Here is the available Knowledge Base / Context for your reference:\n\n";
const EMPTY_KNOWLEDGE_BASE: &str = "No text documents loaded in knowledge base.\n";
const HISTORY_HEADER: &str = "\n\nConversation History:\n";

/// One discrete unit submitted as part of a single generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentPart {
    Text(String),
    /// Inline binary data: a MIME type plus the raw base64 payload
    /// (without any data-URI prefix).
    InlineData { mime_type: String, data: String },
}

/// Builds the ordered content parts for one request. Pure function of its
/// inputs.
///
/// 1. One text part labeling and concatenating every text document, or a
///    fixed placeholder line when none are loaded.
/// 2. One inline part per image document, in document order; images whose
///    data URI yields no payload are silently skipped.
/// 3. One text part flattening the most recent [`HISTORY_WINDOW`] history
///    entries, oldest-first.
/// 4. One text part with the current question and the fixed answering
///    instruction.
pub fn assemble(documents: &[Document], history: &[Message], question: &str) -> Vec<ContentPart> {
    let mut parts = Vec::new();

    // 1. Text documents as labeled context blocks.
    let text_docs: Vec<&Document> = documents
        .iter()
        .filter(|d| d.kind == DocumentKind::Text)
        .collect();

    if text_docs.is_empty() {
        parts.push(ContentPart::Text(EMPTY_KNOWLEDGE_BASE.to_string()));
    } else {
        let mut context_block = KNOWLEDGE_BASE_INTRO.to_string();
        for (index, doc) in text_docs.iter().enumerate() {
            context_block.push_str(&format!(
                "--- Document {}: {} ---\n{}\n\n",
                index + 1,
                doc.name,
                doc.content
            ));
        }
        parts.push(ContentPart::Text(context_block));
    }

    // 2. Image documents as inline data. The oracle expects the raw base64
    // payload without the data-URI prefix.
    for doc in documents.iter().filter(|d| d.kind == DocumentKind::Image) {
        if let Some(payload) = doc.inline_payload() {
            parts.push(ContentPart::InlineData {
                mime_type: doc.mime_type.clone(),
                data: payload.to_string(),
            });
        }
    }

    // 3. A raw bounded tail of the conversation, oldest-first.
    let mut conversation_context = HISTORY_HEADER.to_string();
    let tail_start = history.len().saturating_sub(HISTORY_WINDOW);
    for msg in &history[tail_start..] {
        conversation_context.push_str(&format!("{}: {}\n", msg.role.label(), msg.text));
    }
    parts.push(ContentPart::Text(conversation_context));

    // 4. The current question with the fixed answering instruction.
    parts.push(ContentPart::Text(format!(
        "\nUser's Current Question: {}\n\nAnswer the user's question based strictly on the \
provided documents/context above if applicable. If the answer is not in the context, use \
your general knowledge but mention that it wasn't found in the docs.",
        question
    )));

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, Role};

    fn text_doc(name: &str, content: &str) -> Document {
        Document::from_bytes(name, None, content.as_bytes(), content.len() as u64)
    }

    fn image_doc(name: &str, bytes: &[u8]) -> Document {
        Document::from_bytes(name, Some("image/png"), bytes, bytes.len() as u64)
    }

    fn text_of(part: &ContentPart) -> &str {
        match part {
            ContentPart::Text(t) => t,
            other => panic!("expected text part, got {:?}", other),
        }
    }

    #[test]
    fn knowledge_base_contains_one_labeled_block_per_text_document() {
        let docs = vec![
            text_doc("a.txt", "alpha"),
            text_doc("b.txt", "beta"),
            text_doc("c.txt", "gamma"),
        ];
        let parts = assemble(&docs, &[], "q");

        let kb = text_of(&parts[0]);
        assert!(kb.starts_with("Here is the available Knowledge Base"));
        assert!(kb.contains("--- Document 1: a.txt ---\nalpha\n\n"));
        assert!(kb.contains("--- Document 2: b.txt ---\nbeta\n\n"));
        assert!(kb.contains("--- Document 3: c.txt ---\ngamma\n\n"));
        assert_eq!(kb.matches("--- Document").count(), 3);
    }

    #[test]
    fn empty_knowledge_base_is_exactly_the_placeholder_line() {
        let parts = assemble(&[], &[], "q");
        assert_eq!(text_of(&parts[0]), "No text documents loaded in knowledge base.\n");
    }

    #[test]
    fn text_document_indices_skip_interleaved_images() {
        let docs = vec![
            text_doc("a.txt", "alpha"),
            image_doc("pic.png", b"png-bytes"),
            text_doc("b.txt", "beta"),
        ];
        let parts = assemble(&docs, &[], "q");

        let kb = text_of(&parts[0]);
        assert!(kb.contains("--- Document 1: a.txt ---"));
        assert!(kb.contains("--- Document 2: b.txt ---"));
    }

    #[test]
    fn image_documents_become_inline_parts_with_stripped_payload() {
        let doc = image_doc("pic.png", b"png-bytes");
        let expected_payload = doc.inline_payload().unwrap().to_string();

        let parts = assemble(&[doc], &[], "q");
        // parts: knowledge-base placeholder, inline image, history, question.
        assert_eq!(parts.len(), 4);
        assert_eq!(
            parts[1],
            ContentPart::InlineData {
                mime_type: "image/png".to_string(),
                data: expected_payload,
            }
        );
    }

    #[test]
    fn image_with_no_data_uri_payload_is_silently_skipped() {
        let mut doc = image_doc("broken.png", b"x");
        doc.content = "data:image/png;base64".to_string();

        let parts = assemble(&[doc], &[], "q");
        assert_eq!(parts.len(), 3);
        assert!(parts
            .iter()
            .all(|p| !matches!(p, ContentPart::InlineData { .. })));
    }

    #[test]
    fn history_is_windowed_to_last_six_oldest_first() {
        let history: Vec<Message> = (0..9)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("q{}", i))
                } else {
                    let mut m = Message::model_placeholder();
                    m.text = format!("a{}", i);
                    m.is_streaming = false;
                    m
                }
            })
            .collect();

        let parts = assemble(&[], &history, "q");
        let history_part = text_of(&parts[1]);

        assert!(history_part.starts_with("\n\nConversation History:\n"));
        // Entries 0..3 fall outside the window of 6.
        assert!(!history_part.contains("q0"));
        assert!(!history_part.contains("q2"));
        assert_eq!(
            history_part,
            "\n\nConversation History:\n\
             Model: a3\nUser: q4\nModel: a5\nUser: q6\nModel: a7\nUser: q8\n"
        );
    }

    #[test]
    fn history_entries_are_role_labeled() {
        let mut answer = Message::model_placeholder();
        answer.text = "The answer.".to_string();
        answer.is_streaming = false;
        let history = vec![Message::user("The question?"), answer];

        let parts = assemble(&[], &history, "next");
        let history_part = text_of(&parts[1]);
        assert!(history_part.contains("User: The question?\n"));
        assert!(history_part.contains("Model: The answer.\n"));
    }

    #[test]
    fn question_part_carries_literal_question_and_instruction() {
        let parts = assemble(&[], &[], "What color is the sky?");
        let question_part = text_of(parts.last().unwrap());
        assert!(question_part.starts_with("\nUser's Current Question: What color is the sky?\n"));
        assert!(question_part.contains("based strictly on the provided documents/context"));
        assert!(question_part.contains("mention that it wasn't found in the docs"));
    }

    #[test]
    fn part_order_is_knowledge_base_images_history_question() {
        let docs = vec![text_doc("a.txt", "alpha"), image_doc("p.png", b"img")];
        let parts = assemble(&docs, &[Message::user("hi")], "q");

        assert_eq!(parts.len(), 4);
        assert!(text_of(&parts[0]).contains("--- Document 1: a.txt ---"));
        assert!(matches!(parts[1], ContentPart::InlineData { .. }));
        assert!(text_of(&parts[2]).starts_with("\n\nConversation History:\n"));
        assert!(text_of(&parts[3]).starts_with("\nUser's Current Question:"));
    }

    #[test]
    fn assembled_prompt_matches_end_to_end_expectation() {
        let docs = vec![text_doc("notes.txt", "The sky is blue.")];
        let parts = assemble(&docs, &[], "What color is the sky?");
        let kb = text_of(&parts[0]);
        assert!(kb.contains("--- Document 1: notes.txt ---\nThe sky is blue."));
    }

    #[test]
    fn assemble_is_deterministic_for_identical_inputs() {
        let docs = vec![text_doc("a.txt", "alpha"), image_doc("p.png", b"img")];
        let history = vec![Message::user("hi")];
        assert_eq!(
            assemble(&docs, &history, "q"),
            assemble(&docs, &history, "q")
        );
    }
}
