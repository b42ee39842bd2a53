use std::sync::Arc;
use crate::config::{AgentConfig, ConfigError};
use crate::llm::{traits::LLM, openai::OpenAI, CompletionRequest};
use crate::llm::error::LLMError;
use crate::message::Message;
use crate::services::{CommandDescriptor, ServiceRegistry};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};


pub mod types;
pub mod error;
pub mod traits;
pub mod schema;
mod dispatch;

use traits::AgentRunner;
use types::{Agent, AgentExecuteResult, CommandInvocation, IteratePayload, TurnOutcome};
use error::AgentError;
use schema::{iterate_function, ITERATE_FUNCTION};

/// Returned, and appended, when a turn neither requests a command nor answers.
pub const CLARIFICATION_MESSAGE: &str =
    "I'm not sure how to proceed with this. Could you clarify what you would like me to do?";


impl Agent {
    /// Create an agent over `llm`. The command catalogue defaults to the
    /// descriptors of every registered service function.
    pub fn new(config: AgentConfig, llm: Arc<dyn LLM>, services: ServiceRegistry) -> Result<Self, ConfigError> {
        config.validate()?;
        let id = config
            .id
            .clone()
            .unwrap_or_else(|| format!("agent-{}", uuid::Uuid::new_v4()));
        let messages = config
            .system_message
            .as_ref()
            .map(|system| vec![Message::system(system.clone())])
            .unwrap_or_default();
        let commands = services.descriptors();

        Ok(Self {
            id,
            llm,
            functions: vec![iterate_function(&commands)],
            commands,
            services,
            config,
            messages,
            total_tokens: 0,
        })
    }

    /// Create an agent backed by OpenAI, using `config.api_key`.
    pub fn openai(config: AgentConfig, services: ServiceRegistry) -> Result<Self, ConfigError> {
        let llm = OpenAI::from_config(&config)?;
        Self::new(config, Arc::new(llm), services)
    }

    /// Replace the advertised command catalogue. Commands listed here but not
    /// registered are still advertised; dispatching them fails recoverably.
    pub fn with_commands(mut self, commands: Vec<CommandDescriptor>) -> Self {
        self.functions = vec![iterate_function(&commands)];
        self.commands = commands;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn command_descriptors(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    pub fn iterate_schema(&self) -> &Value {
        &self.functions[0].parameters
    }

    /// The conversation without the leading system message.
    pub fn messages(&self) -> &[Message] {
        match self.messages.first() {
            Some(first) if first.is_system() => &self.messages[1..],
            _ => &self.messages,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn price(&self) -> f64 {
        self.total_tokens as f64 / 1000.0 * self.config.price_per_1k_tokens
    }

    async fn run_turns(&mut self) -> AgentExecuteResult {
        let max_depth = self.config.max_recursion_depth;
        let mut depth = 1;
        loop {
            if depth > max_depth {
                warn!(max_depth, "recursion limit reached without a final response");
                return Err(AgentError::RecursionLimitExceeded(max_depth));
            }
            match self.turn(depth).await? {
                TurnOutcome::Continue => depth += 1,
                TurnOutcome::Done(response) => return Ok(response),
            }
        }
    }

    /// One call-parse-branch cycle.
    async fn turn(&mut self, depth: usize) -> Result<TurnOutcome, AgentError> {
        let request = CompletionRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: &self.messages,
            functions: &self.functions,
            function_call: ITERATE_FUNCTION,
        };
        info!(depth, messages = self.messages.len(), "calling llm");
        let completion = self.llm.complete(request).await?;

        // The raw payload is kept even if parsing or dispatch fails below.
        self.messages.push(Message::assistant(completion.arguments.clone()));
        self.total_tokens += u64::from(completion.tokens.total_tokens);

        let raw: Value = serde_json::from_str(&completion.arguments).map_err(LLMError::from)?;
        self.log_trace(&raw);
        let payload: IteratePayload = serde_json::from_value(raw).map_err(LLMError::from)?;

        let has_response = payload.response.as_deref().is_some_and(|r| !r.is_empty());
        // A blank command next to a real answer is schema filler, not a request.
        if let Some(command) = payload.command.filter(|c| !(has_response && c.name.trim().is_empty())) {
            self.run_command(command).await;
            return Ok(TurnOutcome::Continue);
        }

        let response = match payload.response {
            Some(response) if !response.is_empty() => response,
            _ => {
                debug!("turn has neither command nor response");
                CLARIFICATION_MESSAGE.to_string()
            }
        };
        self.messages.push(Message::assistant(response.clone()));
        Ok(TurnOutcome::Done(response))
    }

    /// Dispatch and append exactly one message describing the outcome.
    async fn run_command(&mut self, command: CommandInvocation) {
        if self.config.is_debug {
            info!(command = %command.name, arguments = %command.arguments, "use function");
        } else {
            debug!(command = %command.name, arguments = %command.arguments, "use function");
        }

        match dispatch::dispatch(&self.services, &command).await {
            Ok(result) => {
                self.messages.push(Message::function(command.name, result.to_string()));
            }
            Err(e) => {
                warn!(command = %command.name, error = %e, "command failed");
                self.messages.push(Message::assistant(dispatch::explain_failure(&command, &e)));
            }
        }
    }

    fn log_trace(&self, raw: &Value) {
        let trace = format_trace(raw);
        if self.config.is_debug {
            info!("{}", trace);
        } else {
            debug!("{}", trace);
        }
    }
}

/// One `KEY: value;` line per payload field.
fn format_trace(raw: &Value) -> String {
    match raw.as_object() {
        Some(fields) => fields
            .iter()
            .map(|(key, value)| format!("\n\t{}: {};", key.to_uppercase(), value))
            .collect(),
        None => raw.to_string(),
    }
}


#[async_trait::async_trait]
impl AgentRunner for Agent {
    async fn process_message(&mut self, text: &str) -> AgentExecuteResult {
        self.messages.push(Message::user(text));
        let span = info_span!("process_message", agent_id = %self.id);
        self.run_turns().instrument(span).await
    }
}
