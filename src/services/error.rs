

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Service function execution error in '{name}': {reason}")]
    ExecutionError {
        name: String,
        reason: String,
    },

    #[error("Service function parameters do not match: {0}")]
    ParamsNotMatched(String),

    #[error("Result is not serializable: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid command name '{0}', expected '<service>-<function>'")]
    InvalidCommandName(String),

    #[error("Service function already registered: {0}")]
    DuplicateFunction(String),
}

impl ServiceError {
    pub fn execution(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ExecutionError {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}
