//! services/chat/src/adapters/oracle.rs
//!
//! This module contains the adapter for the generation oracle.
//! It implements the `GenerationService` port from the `core` crate over the
//! OpenAI-compatible chat-completions streaming API.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs,
        ImageUrlArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use rag_chat_core::{
    ports::{ChunkStream, GenResult, GenerationError, GenerationService},
    prompt::ContentPart,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GenerationService` using an OpenAI-compatible
/// streaming LLM. The client is injected so tests and alternative endpoints
/// can substitute their own.
#[derive(Clone)]
pub struct OpenAiOracleAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiOracleAdapter {
    /// Creates a new `OpenAiOracleAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn to_user_part(
    part: ContentPart,
) -> GenResult<ChatCompletionRequestUserMessageContentPart> {
    match part {
        ContentPart::Text(text) => {
            let built = ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(text)
                .build()
                .map_err(|e| GenerationError::Request(e.to_string()))?;
            Ok(ChatCompletionRequestUserMessageContentPart::Text(built))
        }
        ContentPart::InlineData { mime_type, data } => {
            // The wire format wants the full data URI back; the assembler
            // carries mime and payload separately.
            let image_url = ImageUrlArgs::default()
                .url(format!("data:{};base64,{}", mime_type, data))
                .build()
                .map_err(|e| GenerationError::Request(e.to_string()))?;
            let built = ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(image_url)
                .build()
                .map_err(|e| GenerationError::Request(e.to_string()))?;
            Ok(ChatCompletionRequestUserMessageContentPart::ImageUrl(built))
        }
    }
}

//=========================================================================================
// `GenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GenerationService for OpenAiOracleAdapter {
    /// Issues one streaming generation request and yields the incremental
    /// text deltas in arrival order. Deltas may be empty; the consumer skips
    /// those.
    async fn stream_generation(
        &self,
        system_instruction: &str,
        parts: Vec<ContentPart>,
    ) -> GenResult<ChunkStream> {
        let content_parts = parts
            .into_iter()
            .map(to_user_part)
            .collect::<GenResult<Vec<_>>>()?;

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_instruction)
                    .build()
                    .map_err(|e| GenerationError::Request(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
                    .build()
                    .map_err(|e| GenerationError::Request(e.to_string()))?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .stream(true)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e: OpenAIError| GenerationError::Request(e.to_string()))?;

        let chunks = stream.map(|item| match item {
            Ok(response) => Ok(response
                .choices
                .first()
                .and_then(|choice| choice.delta.content.clone())
                .unwrap_or_default()),
            Err(e) => Err(GenerationError::Stream(e.to_string())),
        });

        Ok(Box::pin(chunks))
    }
}
