pub use crate::agent::{
    CLARIFICATION_MESSAGE,
    error::{AgentError, DispatchError},
    traits::AgentRunner,
    types::{Agent, CommandInvocation, IteratePayload},
};
pub use crate::command;
pub use crate::config::{AgentConfig, ConfigError};
pub use crate::error::Error;
pub use crate::llm::{
    error::LLMError,
    ollama::Ollama,
    openai::OpenAI,
    tokens::TokenUsage,
    traits::LLM,
};
pub use crate::message::{Message, MessageRole};
pub use crate::services::{
    error::ServiceError,
    ArgSchema, CommandDescriptor, FnService, ServiceFunction, ServiceRegistry,
};
