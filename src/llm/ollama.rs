
use std::sync::Arc;
use serde_json::error::Error as SerdeJsonError;
use serde::de::Error as SerdeDeError;
use futures::{FutureExt, future::BoxFuture};
use tracing::debug;


use crate::message::Message;
use crate::message::MessageRole as MsgRole;

use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    error::LLMError,
    Completion,
    CompletionRequest,
    LLMResult,
};

pub use ollama_rs::{
    error::OllamaError,
    Ollama as OllamaClient,
    models::ModelOptions,
    generation::{
        chat::{request::ChatMessageRequest, ChatMessage, MessageRole},
        parameters::FormatType,
    }
};


/// Ollama backend. Ollama has no forced function calls, so the call is
/// emulated: JSON format mode plus an instruction carrying the function
/// schema, and the reply body is taken as the function arguments.
#[derive(Debug, Clone)]
pub struct Ollama {
    pub(crate) client: Arc<OllamaClient>,
    pub(crate) options: Option<ModelOptions>,
}
impl Ollama {
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self {
            client,
            options: None,
        }
    }

    /// Use extra generation options. Temperature and token limit from the
    /// request are applied on top of them.
    pub fn with_options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }

    fn generate_request(&self, request: &CompletionRequest<'_>) -> LLMResult<ChatMessageRequest> {
        let function = request
            .forced_function()
            .ok_or_else(|| LLMError::InvalidResponse(format!("function '{}' is not declared", request.function_call)))?;

        let instruction = format!(
            "Always reply by calling the function `{}`: {}. Reply with ONLY the JSON object of its arguments, matching this JSON schema: {}",
            function.name,
            function.description,
            serde_json::to_string(&function.parameters)?,
        );

        let mut mapped_messages: Vec<ChatMessage> = request.messages.iter().map(|message| message.into()).collect();
        // Keep a leading system message first, the instruction goes right after it.
        let at = usize::from(request.messages.first().is_some_and(Message::is_system));
        mapped_messages.insert(at, ChatMessage::new(MessageRole::System, instruction));

        let options = self
            .options
            .clone()
            .unwrap_or_default()
            .temperature(request.temperature)
            .num_predict(i32::try_from(request.max_tokens).unwrap_or(i32::MAX));

        Ok(ChatMessageRequest::new(request.model.to_string(), mapped_messages)
            .options(options)
            .format(FormatType::Json))
    }
}

impl Default for Ollama {
    fn default() -> Self {
        let client = Arc::new(OllamaClient::default());
        Ollama::new(client)
    }
}


impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            MsgRole::System => MessageRole::System,
            MsgRole::User => MessageRole::User,
            MsgRole::Assistant => MessageRole::Assistant,
            MsgRole::Function => MessageRole::Tool,
        };
        ChatMessage::new(role, message.content.clone())
    }
}

/// Pull the JSON arguments object out of a generation: the whole text when it
/// parses, else the outermost `{...}` substring.
pub(crate) fn extract_arguments(generation: &str) -> LLMResult<String> {
    let parsed = serde_json::from_str::<serde_json::Value>(generation)
        .or_else(|_err| {
            match (generation.find('{'), generation.rfind('}')) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str::<serde_json::Value>(&generation[start..=end])
                }
                _ => Err(SerdeJsonError::custom("no json substring")),
            }
        })?;

    if !parsed.is_object() {
        return Err(LLMError::InvalidResponse(format!("expected a JSON object, got: {}", generation)));
    }
    Ok(parsed.to_string())
}


impl LLM for Ollama {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> BoxFuture<'a, LLMResult<Completion>> {
        async move {
            let chat_request = self.generate_request(&request)?;
            debug!(model = request.model, messages = request.messages.len(), "ollama chat");

            let response = self.client.send_chat_messages(chat_request).await?;

            let tokens = if let Some(final_data) = response.final_data {
                TokenUsage::new(final_data.prompt_eval_count as u32, final_data.eval_count as u32)
            } else {
                TokenUsage::default()
            };

            let arguments = extract_arguments(&response.message.content)?;
            Ok(Completion { tokens, arguments })
        }
        .boxed()
    }
}
