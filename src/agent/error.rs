use crate::services::error::ServiceError;
use crate::llm::error::LLMError;

/// Failures that end a `process_message` call.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Upstream LLM error: {0}")]
    Upstream(#[from] LLMError),

    #[error("Maximum recursion depth exceeded: {0}")]
    RecursionLimitExceeded(usize),
}

/// Failures of a single command dispatch. None of them end the turn: they
/// are reported back to the LLM as an assistant message.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid command name '{0}', expected '<service>-<function>'")]
    InvalidCommandName(String),

    #[error("service '{0}' not found")]
    ServiceNotFound(String),

    #[error("function '{function}' not found in service '{service}'")]
    FunctionNotFound {
        service: String,
        function: String,
    },

    #[error("arguments are not a JSON object: {0}")]
    ArgumentParseError(String),

    #[error("{0}")]
    ServiceFailed(#[from] ServiceError),
}
