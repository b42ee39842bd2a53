//! The `iterate` function every LLM call is forced through.

use serde_json::{json, Map, Value};

use crate::llm::FunctionDefinition;
use crate::services::CommandDescriptor;

pub const ITERATE_FUNCTION: &str = "iterate";

const ITERATE_DESCRIPTION: &str = "Think about the conversation so far, then either request one command \
to gather the data you are missing, or give the final response to the user.";

/// Build the `iterate` definition. Deterministic for a given catalogue; the
/// `command` property is left out when there is nothing to call.
pub fn iterate_function(commands: &[CommandDescriptor]) -> FunctionDefinition {
    let mut properties = Map::new();
    properties.insert(
        "thought".into(),
        json!({ "type": "string", "description": "The thought behind the response." }),
    );
    properties.insert(
        "analysis".into(),
        json!({ "type": "string", "description": "Analysis of the request and of the data gathered so far." }),
    );
    properties.insert(
        "next_steps".into(),
        json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "The ordered steps still needed before answering."
        }),
    );
    properties.insert(
        "response_buffer".into(),
        json!({
            "type": "string",
            "description": "Partial response, kept up to date while steps remain."
        }),
    );
    if !commands.is_empty() {
        properties.insert("command".into(), command_property(commands));
    }
    properties.insert(
        "response".into(),
        json!({ "type": "string", "description": "The final response to the user." }),
    );

    FunctionDefinition {
        name: ITERATE_FUNCTION.into(),
        description: ITERATE_DESCRIPTION.into(),
        parameters: json!({
            "type": "object",
            "properties": properties,
            "required": ["thought", "analysis", "next_steps", "response_buffer"],
        }),
    }
}

fn command_property(commands: &[CommandDescriptor]) -> Value {
    let catalogue = Value::Array(
        commands
            .iter()
            .map(|c| json!({ "name": c.name, "description": c.description, "parameters": c.parameters }))
            .collect(),
    );

    json!({
        "type": "object",
        "description": format!(
            "If you need to execute a command because you miss some data, specify it here. \
             Example: {{ name: 'peopleService-searchUserContact', arguments: '{{ \"phoneNumber\": \"393381481934\" }}' }}. \
             Here is a list of all the available commands: {:#}. \
             If you need to use a command it probably means that you are not ready to reply to the user yet.",
            catalogue
        ),
        "properties": {
            "name": { "type": "string", "description": "The name of the command to execute." },
            "arguments": { "type": "string", "description": "The arguments of the command to execute, as a JSON string." }
        },
        "required": ["name", "arguments"],
    })
}
