use crate::llm::error::LLMError;
use crate::services::error::ServiceError;
use crate::agent::error::{AgentError, DispatchError};
use crate::config::ConfigError;


#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    LLM(#[from] LLMError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_errors_convert_into_crate_error() {
        let err: Error = AgentError::RecursionLimitExceeded(10).into();
        assert!(matches!(err, Error::Agent(AgentError::RecursionLimitExceeded(10))));
        assert!(err.to_string().starts_with("Agent error:"));

        let err: Error = DispatchError::ServiceNotFound("peopleService".to_string()).into();
        assert_eq!(err.to_string(), "Dispatch error: service 'peopleService' not found");
    }
}
