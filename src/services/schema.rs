use serde::{Serialize, Deserialize};
use serde_json::{json, Map, Value};

/// Separator between the service and function parts of a command name.
pub const COMMAND_SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgSchema {
    pub name: String,
    pub arg_type: String,
    pub description: String,
    pub required: bool,
}

/// A command advertised to the LLM: `<service>-<function>`, what it does and
/// the JSON schema of its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl CommandDescriptor {
    pub fn new(
        service: &str,
        function: &str,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            name: command_name(service, function),
            description: description.into(),
            parameters,
        }
    }

    /// The `(service, function)` pair, if the name is well formed.
    pub fn split_name(&self) -> Option<(&str, &str)> {
        split_command_name(&self.name)
    }
}

pub fn command_name(service: &str, function: &str) -> String {
    format!("{service}{COMMAND_SEPARATOR}{function}")
}

/// Split `<service>-<function>`. Exactly one separator and two non-empty parts.
pub fn split_command_name(name: &str) -> Option<(&str, &str)> {
    let (service, function) = name.split_once(COMMAND_SEPARATOR)?;
    if service.is_empty() || function.is_empty() || function.contains(COMMAND_SEPARATOR) {
        return None;
    }
    Some((service, function))
}

/// JSON schema object for a flat list of arguments.
pub fn parameters_from_args(args: &[ArgSchema]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for arg in args {
        properties.insert(
            arg.name.clone(),
            json!({ "type": arg.arg_type, "description": arg.description }),
        );
        if arg.required {
            required.push(Value::String(arg.name.clone()));
        }
    }

    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    schema
}
