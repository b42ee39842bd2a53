//! An agent loop that drives an LLM through forced `iterate` function calls,
//! dispatching the commands it requests to registered services until it
//! produces a final response.

// lets `#[command]` expand to `::mini_agent::...` inside this crate too
extern crate self as mini_agent;

pub mod llm;
pub mod services;
pub mod agent;
pub mod message;
pub mod config;
pub mod error;
pub mod prelude;

// re-export the proc-macro attribute for convenient use: `use mini_agent::command;` or `#[mini_agent::command(...)]`
pub use mini_agent_macros::command;

// used by the code `#[command]` generates
#[doc(hidden)]
pub use async_trait;
#[doc(hidden)]
pub use serde;
#[doc(hidden)]
pub use serde_json;
