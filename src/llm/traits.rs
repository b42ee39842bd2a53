use crate::llm::{LLMResult, Completion, CompletionRequest};
use futures::future::BoxFuture;

/// Core LLM trait. Returns a BoxFuture with an explicit lifetime so
/// implementations can borrow the request (and the conversation inside it)
/// without cloning.
///
/// Implementations must force a call to `request.function_call` and fail
/// visibly when the backend errors, returns no choices, or answers without
/// calling the function.
pub trait LLM: Send + Sync {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> BoxFuture<'a, LLMResult<Completion>>;
}
