// The forced `function_call` protocol lives on the legacy (deprecated) half of
// the chat completions API: `functions`, `function_call` and function-role messages.
#![allow(deprecated)]

pub use async_openai::{
    Client, config::{Config, OpenAIConfig}, error::OpenAIError,
};
use async_openai::types::{
    ChatCompletionFunctionCall, ChatCompletionFunctions, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestFunctionMessage, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use futures::{FutureExt, future::BoxFuture};
use tracing::debug;

use crate::config::{AgentConfig, ConfigError};
use crate::message::{Message, MessageRole};
use crate::llm::{
    traits::LLM,
    tokens::TokenUsage,
    error::LLMError,
    Completion,
    CompletionRequest,
    FunctionDefinition,
    LLMResult,
};


pub struct OpenAI {
    pub client: Client<OpenAIConfig>,
}

impl OpenAI {
    /// Client configured from the `OPENAI_API_KEY` / `OPENAI_BASE_URL` environment.
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new().with_api_key(api_key))
    }

    /// Use an explicit client configuration, e.g. to target an OpenAI-compatible endpoint.
    pub fn with_config(config: OpenAIConfig) -> Self {
        Self { client: Client::with_config(config) }
    }

    /// Build a client from the agent configuration; the API key is required.
    pub fn from_config(config: &AgentConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingConfig("api_key".into()))?;
        Ok(Self::with_api_key(api_key))
    }

    fn build_request(&self, request: &CompletionRequest<'_>) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let messages = request
            .messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()?;
        let functions: Vec<ChatCompletionFunctions> =
            request.functions.iter().map(to_function).collect();

        CreateChatCompletionRequestArgs::default()
            .model(request.model)
            .messages(messages)
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .functions(functions)
            .function_call(ChatCompletionFunctionCall::Function {
                name: request.function_call.to_string(),
            })
            .build()
    }
}

impl Default for OpenAI {
    fn default() -> Self {
        Self::new()
    }
}

fn to_function(def: &FunctionDefinition) -> ChatCompletionFunctions {
    ChatCompletionFunctions {
        name: def.name.clone(),
        description: Some(def.description.clone()),
        parameters: def.parameters.clone(),
    }
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    let content = message.content.clone();
    let mapped = match message.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Function => ChatCompletionRequestMessage::Function(ChatCompletionRequestFunctionMessage {
            content: Some(content),
            name: message.name.clone().unwrap_or_default(),
        }),
    };
    Ok(mapped)
}

fn into_completion(response: CreateChatCompletionResponse, function_name: &str) -> LLMResult<Completion> {
    let tokens = response
        .usage
        .map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        })
        .unwrap_or_default();

    let choice = response.choices.into_iter().next().ok_or(LLMError::NoChoices)?;
    let call = choice
        .message
        .function_call
        .filter(|call| call.name == function_name)
        .ok_or_else(|| LLMError::MissingFunctionCall(function_name.to_string()))?;

    Ok(Completion { tokens, arguments: call.arguments })
}

impl LLM for OpenAI {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> BoxFuture<'a, LLMResult<Completion>> {
        async move {
            let body = self.build_request(&request)?;
            debug!(model = request.model, messages = request.messages.len(), "openai chat completion");
            let response = self.client.chat().create(body).await?;
            into_completion(response, request.function_call)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn iterate_function() -> Vec<FunctionDefinition> {
        vec![FunctionDefinition {
            name: "iterate".into(),
            description: "Reason about the next step".into(),
            parameters: json!({"type": "object", "properties": {}}),
        }]
    }

    fn completion_body(choices: serde_json::Value) -> String {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1_700_000_000u32,
            "model": "gpt-4",
            "choices": choices,
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        })
        .to_string()
    }

    fn client_for(server: &mockito::ServerGuard) -> OpenAI {
        OpenAI::with_config(
            OpenAIConfig::new()
                .with_api_key("sk-test")
                .with_api_base(server.url()),
        )
    }

    #[tokio::test]
    async fn forced_function_call_arguments_are_returned() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "model": "gpt-4",
                    "function_call": {"name": "iterate"}
                })),
                Matcher::Regex(r#""role":"function""#.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(json!([{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "function_call": {"name": "iterate", "arguments": "{\"response\":\"hi\"}"}
                },
                "finish_reason": "function_call"
            }])))
            .create_async()
            .await;

        let llm = client_for(&server);
        let messages = vec![
            Message::system("be brief"),
            Message::user("read a.txt"),
            Message::function("fsService-readFile", "\"hello\""),
        ];
        let functions = iterate_function();
        let completion = llm
            .complete(CompletionRequest {
                model: "gpt-4",
                temperature: 0.7,
                max_tokens: 1500,
                messages: &messages,
                functions: &functions,
                function_call: "iterate",
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(completion.arguments, "{\"response\":\"hi\"}");
        assert_eq!(completion.tokens, TokenUsage::new(12, 8));
    }

    #[tokio::test]
    async fn empty_choices_fail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(json!([])))
            .create_async()
            .await;

        let llm = client_for(&server);
        let messages = vec![Message::user("hi")];
        let functions = iterate_function();
        let err = llm
            .complete(CompletionRequest {
                model: "gpt-4",
                temperature: 0.0,
                max_tokens: 100,
                messages: &messages,
                functions: &functions,
                function_call: "iterate",
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::NoChoices));
    }

    #[tokio::test]
    async fn api_errors_are_surfaced() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"error": {
                    "message": "bad request",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": null
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let llm = client_for(&server);
        let messages = vec![Message::user("hi")];
        let functions = iterate_function();
        let err = llm
            .complete(CompletionRequest {
                model: "gpt-4",
                temperature: 0.0,
                max_tokens: 100,
                messages: &messages,
                functions: &functions,
                function_call: "iterate",
            })
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::OpenAIError(_)));
    }

    #[test]
    fn plain_text_answer_is_a_missing_function_call() {
        let response: CreateChatCompletionResponse = serde_json::from_str(&completion_body(json!([{
            "index": 0,
            "message": {"role": "assistant", "content": "hello"},
            "finish_reason": "stop"
        }])))
        .unwrap();

        let err = into_completion(response, "iterate").unwrap_err();
        assert!(matches!(err, LLMError::MissingFunctionCall(name) if name == "iterate"));
    }
}
