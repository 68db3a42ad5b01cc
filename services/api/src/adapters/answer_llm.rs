//! services/api/src/adapters/answer_llm.rs
//!
//! This module contains the adapter for the answer-composing LLM.
//! It implements the `AnswerService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use docuchat_core::ports::{AnswerService, CoreError, CoreResult};

const SYSTEM_INSTRUCTIONS: &str = "You are an assistant answering questions about documents \
the user has uploaded. Answer using the excerpts provided in the CONTEXT block. If the \
context does not contain the answer, say so briefly; do not invent citations. Keep answers \
concise and direct.";

const USER_INPUT_TEMPLATE: &str = "CONTEXT:\n---\n{context}\n---\n\nQUESTION:\n{question}";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnswerService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnswerAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnswerAdapter {
    /// Creates a new `OpenAiAnswerAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `AnswerService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnswerService for OpenAiAnswerAdapter {
    /// Composes an answer to the question grounded in the retrieved context.
    async fn answer(&self, question: &str, context: &str) -> CoreResult<String> {
        let user_input = USER_INPUT_TEMPLATE
            .replace("{context}", context)
            .replace("{question}", question);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| CoreError::Upstream(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
                .build()
                .map_err(|e| CoreError::Upstream(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| CoreError::Upstream(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| CoreError::Upstream(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(CoreError::Upstream(
                    "Answer LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(CoreError::Upstream(
                "Answer LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}
