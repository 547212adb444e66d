//! Agent execution internals: the ReAct parser and the executor loop.

pub mod crew_agent_executor;
pub mod parser;

// Re-exports for convenience
pub use crew_agent_executor::{CrewAgentExecutor, ExecutorOutput};
pub use parser::{AgentAction, AgentFinish, OutputParserError};
