//! LLM clients.
//!
//! - [`base_llm`] - the trait every client implements
//! - [`providers`] - concrete providers (OpenAI-compatible chat completions)

pub mod base_llm;
pub mod providers;

pub use base_llm::{BaseLLM, CallOptions, LLMMessage, LLMResponse, MessageRole};
