//! services/chat/src/chat/turn.rs
//!
//! This module contains the asynchronous "worker" logic for a single
//! question-and-answer turn: consume the oracle's chunk stream, surface
//! accumulated text per increment, and settle the placeholder message.

use crate::chat::state::Conversation;
use rag_chat_core::{
    domain::Message,
    ports::{GenResult, GenerationService},
    prompt::{self, ContentPart, SYSTEM_INSTRUCTION},
};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// The fixed user-facing text shown when a turn fails. Raw error detail is
/// logged, never displayed.
pub const GENERATION_FAILURE_MESSAGE: &str =
    "Error generating response. Please check your API key or connection.";

/// Represents the outcome of one submitted turn.
/// This tells the caller what happened without exposing internal errors.
#[derive(Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The stream completed and the answer is settled in the placeholder.
    Answered,
    /// The oracle failed; the placeholder holds the fixed failure message.
    Failed,
    /// The turn was cancelled mid-stream; the placeholder keeps whatever
    /// text had accumulated.
    Cancelled,
    /// The trimmed input was empty. State is untouched.
    RejectedEmpty,
    /// A request was already in flight. State is untouched.
    RejectedBusy,
}

/// How a chunk stream ended, when it did not fail.
#[derive(Debug, PartialEq, Eq)]
pub enum StreamEnd {
    /// Normal end-of-stream, carrying the full accumulated text.
    Completed(String),
    /// Cancelled between chunk awaits, carrying the partial text.
    Cancelled(String),
}

/// Drives one streaming generation request.
///
/// Every `on_increment` call receives the full accumulated answer-to-date
/// (never a delta), strictly in chunk-arrival order, so a consumer can simply
/// replace its displayed text each time. Empty chunks are skipped. On
/// failure the accumulated text is discarded by the caller's error path, not
/// returned here.
pub async fn stream_answer(
    oracle: &dyn GenerationService,
    parts: Vec<ContentPart>,
    cancellation: &CancellationToken,
    mut on_increment: impl FnMut(&str),
) -> GenResult<StreamEnd> {
    let mut chunks = oracle.stream_generation(SYSTEM_INSTRUCTION, parts).await?;

    let mut full_text = String::new();
    loop {
        tokio::select! {
            _ = cancellation.cancelled() => {
                info!("Generation stream cancelled; keeping partial text.");
                return Ok(StreamEnd::Cancelled(full_text));
            }
            chunk = chunks.next() => match chunk {
                Some(Ok(text)) => {
                    if text.is_empty() {
                        continue;
                    }
                    full_text.push_str(&text);
                    on_increment(&full_text);
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(StreamEnd::Completed(full_text)),
            },
        }
    }
}

/// Runs one full conversational turn against the oracle.
///
/// Appends the user message and a streaming model placeholder, assembles the
/// prompt from the current document set and a pre-turn history snapshot, then
/// streams the answer into the placeholder. All settle paths (success,
/// failure, cancellation) leave the placeholder not-streaming and the machine
/// ready for the next submission.
pub async fn submit_question(
    conversation: &mut Conversation,
    oracle: &dyn GenerationService,
    input: &str,
    cancellation: &CancellationToken,
    mut on_increment: impl FnMut(&str),
) -> TurnOutcome {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return TurnOutcome::RejectedEmpty;
    }
    if conversation.is_busy() {
        warn!("Submission ignored: a request is already in flight.");
        return TurnOutcome::RejectedBusy;
    }

    // Snapshot the history before this turn's messages are appended; the
    // current question reaches the model through the question part, not
    // through history.
    let history: Vec<Message> = conversation.messages.to_vec();

    conversation.messages.push(Message::user(trimmed));

    let placeholder = Message::model_placeholder();
    let placeholder_id = placeholder.id;
    conversation.messages.push(placeholder);

    let parts = prompt::assemble(&conversation.documents, &history, trimmed);

    let messages = &mut conversation.messages;
    let result = stream_answer(oracle, parts, cancellation, |accumulated| {
        // Identity is preserved by id: only the placeholder is updated.
        if let Some(msg) = messages.iter_mut().find(|m| m.id == placeholder_id) {
            msg.text = accumulated.to_string();
        }
        on_increment(accumulated);
    })
    .await;

    let outcome = match result {
        Ok(StreamEnd::Completed(_)) => TurnOutcome::Answered,
        Ok(StreamEnd::Cancelled(_)) => TurnOutcome::Cancelled,
        Err(e) => {
            error!("Generation failed: {}", e);
            if let Some(msg) = conversation
                .messages
                .iter_mut()
                .find(|m| m.id == placeholder_id)
            {
                // No partial answer on failure: a fixed message only.
                msg.text = GENERATION_FAILURE_MESSAGE.to_string();
            }
            TurnOutcome::Failed
        }
    };

    if let Some(msg) = conversation
        .messages
        .iter_mut()
        .find(|m| m.id == placeholder_id)
    {
        msg.is_streaming = false;
    }

    outcome
}
