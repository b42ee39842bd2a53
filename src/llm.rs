pub mod traits;
pub mod openai;
pub mod ollama;
pub mod tokens;
pub mod error;


use serde::{Serialize, Deserialize};
use serde_json::Value as JsonValue;
use tokens::TokenUsage;
use crate::message::Message;

/// A function the model may call, in the shape the chat APIs expect.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: JsonValue,
}

/// Parameters of one completion call. Borrows the conversation so the agent
/// does not clone its whole log on every turn.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: &'a [Message],
    pub functions: &'a [FunctionDefinition],
    /// Name of the function the model is forced to call.
    pub function_call: &'a str,
}

impl CompletionRequest<'_> {
    /// The definition of the forced function, if it is among `functions`.
    pub fn forced_function(&self) -> Option<&FunctionDefinition> {
        self.functions.iter().find(|f| f.name == self.function_call)
    }
}

/// Result of a forced function-call completion.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Completion {
    pub tokens: TokenUsage,
    /// Raw JSON-encoded arguments of the function call.
    pub arguments: String,
}

/// Result type for LLM operations.
pub type LLMResult<T> = std::result::Result<T, error::LLMError>;
