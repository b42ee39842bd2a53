use crate::config::AgentConfig;
use crate::llm::{traits::LLM, FunctionDefinition};
use crate::message::Message;
use crate::services::{CommandDescriptor, ServiceRegistry};
use std::sync::Arc;
use super::error::AgentError;
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// An LLM-driven agent: one conversation, one token counter, a fixed
/// configuration and the services it may dispatch commands to.
pub struct Agent {
    pub(crate) id: String,

    /// The LLM implementation every turn is sent to.
    pub(crate) llm: Arc<dyn LLM>,

    /// Services the LLM may call through commands.
    pub(crate) services: ServiceRegistry,

    /// Command catalogue advertised inside the `iterate` schema.
    pub(crate) commands: Vec<CommandDescriptor>,

    /// `[iterate]`, built from `commands`.
    pub(crate) functions: Vec<FunctionDefinition>,

    pub(crate) config: AgentConfig,

    /// Append-only conversation log, replayed on every call.
    pub(crate) messages: Vec<Message>,

    pub(crate) total_tokens: u64,
}

/// Arguments of one `iterate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IteratePayload {
    pub thought: String,
    #[serde(alias = "description")]
    pub analysis: String,
    pub next_steps: Vec<String>,
    #[serde(alias = "respons_buffer")]
    pub response_buffer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// A command requested by the LLM. `arguments` is normally a JSON-encoded
/// string; an inline object is tolerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInvocation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// How a single turn ended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TurnOutcome {
    /// A command was dispatched; call the LLM again.
    Continue,
    /// Final text for the caller.
    Done(String),
}

pub type AgentExecuteResult = Result<String, AgentError>;
