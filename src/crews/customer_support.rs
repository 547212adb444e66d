//! Customer support crew.
//!
//! A support representative answers the customer's request with the help of
//! documentation and search tools, then a QA specialist reviews the answer.

use std::sync::Arc;

use crate::agent::Agent;
use crate::crew::Crew;
use crate::llms::base_llm::BaseLLM;
use crate::memory::ShortTermMemory;
use crate::task::Task;
use crate::tools::{customer_history_tool, BaseTool, ScrapeWebsiteTool, SerperDevTool, WebsiteSearchTool};

/// Documentation page the support agent reads first.
pub const DOCS_URL: &str = "https://docs.crewai.com/how-to/Creating-a-Crew-and-kick-it-off/";

/// Create and return the tools for the agents.
pub fn create_tools() -> Vec<Arc<dyn BaseTool>> {
    vec![
        Arc::new(ScrapeWebsiteTool::for_url(DOCS_URL)),
        Arc::new(SerperDevTool::new()),
        Arc::new(WebsiteSearchTool::new()),
        Arc::new(customer_history_tool()),
    ]
}

pub fn support_agent(
    customer_name: &str,
    tools: Vec<Arc<dyn BaseTool>>,
    llm: Arc<dyn BaseLLM>,
) -> Agent {
    Agent::new(
        "Senior Support Representative",
        "Be the most friendly and helpful support representative in your team",
        format!(
            "You work at crewAI (https://crewai.com) and are now working on providing \
             support to {customer_name}, a super important customer for your company. \
             You need to make sure that you provide the best support! \
             Make sure to provide full complete answers, and make no assumptions."
        ),
    )
    .with_allow_delegation(false)
    .with_verbose(true)
    .with_tools(tools)
    .with_max_iter(3)
    .with_max_rpm(10)
    .with_temperature(0.7)
    .with_llm(llm)
}

pub fn support_quality_assurance_agent(
    customer_name: &str,
    tools: Vec<Arc<dyn BaseTool>>,
    llm: Arc<dyn BaseLLM>,
) -> Agent {
    Agent::new(
        "Support Quality Assurance Specialist",
        "Get recognition for providing the best support quality assurance in your team",
        format!(
            "You work at crewAI (https://crewai.com) and are now working with your team \
             on a request from {customer_name} ensuring that the support representative is \
             providing the best support possible.\n\
             You need to make sure that the support representative is providing full \
             complete answers, and make no assumptions."
        ),
    )
    .with_allow_delegation(true)
    .with_verbose(true)
    .with_tools(tools)
    .with_max_iter(2)
    .with_max_rpm(10)
    .with_temperature(0.5)
    .with_llm(llm)
}

pub fn handle_request_task(customer_query: &str, agent: Arc<Agent>) -> Task {
    Task::new(
        format!(
            "Handle the following customer request: {customer_query}\n\
             1. First, use the docs_scrape_tool to check relevant documentation\n\
             2. If needed, use search_tool for additional context\n\
             3. Provide a clear, accurate, and helpful response\n\
             4. Always verify information before sharing"
        ),
        "A clear, accurate, and helpful response to the customer's query",
        agent,
    )
    .with_name("handle_request")
}

pub fn review_response_task(agent: Arc<Agent>) -> Task {
    Task::new(
        "Review the support agent's response and ensure it is complete, \
         accurate, and helpful. Provide feedback if improvements are needed.\n\
         1. Verify technical accuracy using documentation\n\
         2. Check for completeness and clarity\n\
         3. Ensure the tone is appropriate\n\
         4. Suggest improvements if needed",
        "A quality assessment of the support response with any necessary improvement suggestions",
        agent,
    )
    .with_name("review_response")
}

/// Assemble the support crew for one customer request.
///
/// The request text is placed into the task as-is; the crew is meant to be
/// kicked off without inputs so braces in the query are never treated as
/// placeholders.
pub fn build_crew(
    customer_name: &str,
    customer_query: &str,
    tools: Vec<Arc<dyn BaseTool>>,
    llm: Arc<dyn BaseLLM>,
    memory: ShortTermMemory,
) -> Crew {
    let support = Arc::new(support_agent(customer_name, tools.clone(), Arc::clone(&llm)));
    let qa = Arc::new(support_quality_assurance_agent(customer_name, tools, llm));

    let tasks = vec![
        handle_request_task(customer_query, Arc::clone(&support)),
        review_response_task(Arc::clone(&qa)),
    ];

    Crew::new(vec![support, qa], tasks)
        .with_name("customer_support")
        .with_verbose(true)
        .with_memory(memory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EchoTool, ScriptedLLM};

    #[test]
    fn test_support_agent_descriptor() {
        let llm = ScriptedLLM::new(Vec::<String>::new());
        let agent = support_agent("DeepLearningAI", Vec::new(), llm);
        assert_eq!(agent.role, "Senior Support Representative");
        assert_eq!(
            agent.backstory,
            "You work at crewAI (https://crewai.com) and are now working on providing support to DeepLearningAI, a super important customer for your company. You need to make sure that you provide the best support! Make sure to provide full complete answers, and make no assumptions."
        );
        assert_eq!(agent.max_iter, 3);
        assert_eq!(agent.max_rpm, Some(10));
        assert_eq!(agent.temperature, Some(0.7));
        assert!(!agent.allow_delegation);
    }

    #[test]
    fn test_qa_agent_descriptor() {
        let llm = ScriptedLLM::new(Vec::<String>::new());
        let agent = support_quality_assurance_agent("Ann", Vec::new(), llm);
        assert_eq!(
            agent.backstory,
            "You work at crewAI (https://crewai.com) and are now working with your team on a request from Ann ensuring that the support representative is providing the best support possible.\nYou need to make sure that the support representative is providing full complete answers, and make no assumptions."
        );
        assert_eq!(agent.max_iter, 2);
        assert_eq!(agent.temperature, Some(0.5));
    }

    #[test]
    fn test_handle_request_description() {
        let agent = Arc::new(Agent::new("r", "g", "b"));
        let task = handle_request_task("How do I {start} a crew?", agent);
        assert_eq!(
            task.description,
            "Handle the following customer request: How do I {start} a crew?\n1. First, use the docs_scrape_tool to check relevant documentation\n2. If needed, use search_tool for additional context\n3. Provide a clear, accurate, and helpful response\n4. Always verify information before sharing"
        );
    }

    #[test]
    fn test_tool_belt() {
        let names: Vec<String> = create_tools().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(
            names,
            [
                "Read website content",
                "Search the internet",
                "Search in a specific website",
                "check_customer_history"
            ]
        );
    }

    #[tokio::test]
    async fn test_crew_runs_both_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let memory = ShortTermMemory::load(dir.path().join("support_memory.json")).unwrap();
        let llm = ScriptedLLM::new([
            "Thought: check docs\nAction: docs\nAction Input: {}",
            "Thought: I now know the final answer\nFinal Answer: Use crew.kickoff().",
            "Thought: I now know the final answer\nFinal Answer: The answer is accurate.",
        ]);
        let tools: Vec<Arc<dyn BaseTool>> = vec![EchoTool::new("docs")];
        let mut crew = build_crew("Ann", "How do I {start} a crew?", tools, llm.clone(), memory);

        let output = crew.kickoff(None).await.unwrap();
        assert_eq!(output.raw, "The answer is accurate.");
        assert_eq!(
            output.task_output("handle_request").map(|t| t.raw.as_str()),
            Some("Use crew.kickoff().")
        );
        assert!(llm.last_message_of(2).contains("Use crew.kickoff()."));
        assert_eq!(llm.requests.lock()[0].1.temperature, Some(0.7));
        assert_eq!(llm.requests.lock()[2].1.temperature, Some(0.5));
    }
}
