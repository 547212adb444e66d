//! # agent-crews
//!
//! A small sequential agent runtime and two ready-made crews on top of it.
//!
//! An [`Agent`] is a role with a goal and a backstory, driven by an LLM
//! through a ReAct loop (thought, action, observation, final answer). A
//! [`Task`] gives an agent a description and an expected output. A [`Crew`]
//! runs its tasks in order, feeding each task the outputs that came before it.
//!
//! Two crews ship with the crate:
//!
//! - [`crews::customer_support`] answers a customer request with a support
//!   agent and has a QA specialist review the answer.
//! - [`crews::research_article`] plans, writes and edits a blog post on a topic.

pub mod agent;
pub mod agents;
pub mod config;
pub mod crew;
pub mod crews;
pub mod llms;
pub mod memory;
pub mod task;
pub mod tasks;
pub mod tools;
pub mod types;
pub mod utilities;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::Agent;
pub use crew::Crew;
pub use crews::crew_output::CrewOutput;
pub use llms::base_llm::BaseLLM;
pub use llms::providers::openai::OpenAICompletion;
pub use memory::ShortTermMemory;
pub use task::Task;
pub use tasks::task_output::TaskOutput;
pub use tools::BaseTool;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
