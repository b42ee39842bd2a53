use serde_json::{Map, Value};
use tracing::debug;

use crate::services::{schema::split_command_name, ServiceRegistry};
use super::error::DispatchError;
use super::types::CommandInvocation;

/// Resolve and run one command. At most one service call, never retried.
pub(crate) async fn dispatch(
    services: &ServiceRegistry,
    invocation: &CommandInvocation,
) -> Result<Value, DispatchError> {
    let (service, function) = split_command_name(&invocation.name)
        .ok_or_else(|| DispatchError::InvalidCommandName(invocation.name.clone()))?;

    if !services.contains_service(service) {
        return Err(DispatchError::ServiceNotFound(service.to_string()));
    }
    let callable = services
        .get(service, function)
        .ok_or_else(|| DispatchError::FunctionNotFound {
            service: service.to_string(),
            function: function.to_string(),
        })?;

    let args = parse_arguments(&invocation.arguments)?;
    debug!(command = %invocation.name, "running service function");
    Ok(callable.run(Value::Object(args)).await?)
}

/// Arguments arrive as a JSON-encoded string. Blank or missing means no
/// arguments; an inline object is taken as is.
pub(crate) fn parse_arguments(arguments: &Value) -> Result<Map<String, Value>, DispatchError> {
    let parsed = match arguments {
        Value::Null => return Ok(Map::new()),
        Value::String(encoded) if encoded.trim().is_empty() => return Ok(Map::new()),
        Value::String(encoded) => serde_json::from_str::<Value>(encoded)
            .map_err(|e| DispatchError::ArgumentParseError(e.to_string()))?,
        other => other.clone(),
    };

    match parsed {
        Value::Object(map) => Ok(map),
        other => Err(DispatchError::ArgumentParseError(format!("expected an object, got {}", other))),
    }
}

/// Natural-language report of a failed dispatch, appended for the LLM to read.
pub(crate) fn explain_failure(invocation: &CommandInvocation, error: &DispatchError) -> String {
    format!(
        "I tried to run the command \"{}\" but it failed: {}. I need to fix the command or choose another one.",
        invocation.name, error
    )
}
