

use super::types::AgentExecuteResult;

/// Trait describing runtime operations an agent can perform.
#[async_trait::async_trait]
pub trait AgentRunner: Send {
    /// Append a user message and run turns until a final response, or fail.
    async fn process_message(&mut self, text: &str) -> AgentExecuteResult;
}
