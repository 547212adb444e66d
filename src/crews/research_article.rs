//! Research article crew: plan, write, edit.
//!
//! Every descriptor carries a `{topic}` placeholder that is filled at
//! kickoff, so one crew can write about any topic.

use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::Agent;
use crate::crew::Crew;
use crate::llms::base_llm::BaseLLM;
use crate::task::Task;

const BLOG_POST_OUTPUT: &str = "A well-written blog post in markdown format, ready for publication, each section should have 2 or 3 paragraphs.";

pub fn planner(llm: Arc<dyn BaseLLM>) -> Agent {
    Agent::new(
        "Content Planner",
        "Plan engaging and factually accurate content on {topic}",
        "You're working on planning a blog article \
         about the topic: {topic}.\
         You collect information that helps the \
         audience learn something \
         and make informed decisions. \
         Your work is the basis for \
         the Content Writer to write an article on this topic.",
    )
    .with_allow_delegation(false)
    .with_verbose(true)
    .with_llm(llm)
}

pub fn writer(llm: Arc<dyn BaseLLM>) -> Agent {
    Agent::new(
        "Content Writer",
        "Write insightful and factually accurate \
         opinion piece about the topic: {topic}",
        "You're working on a writing \
         a new opinion piece about the topic: {topic}. \
         You base your writing on the work of \
         the Content Planner, who provides an outline \
         and relevant context about the topic. \
         You follow the main objectives and \
         direction of the outline, \
         as provide by the Content Planner. \
         You also provide objective and impartial insights \
         and back them up with information \
         provide by the Content Planner. \
         You acknowledge in your opinion piece \
         when your statements are opinions \
         as opposed to objective statements.",
    )
    .with_allow_delegation(false)
    .with_verbose(true)
    .with_llm(llm)
}

pub fn editor(llm: Arc<dyn BaseLLM>) -> Agent {
    Agent::new(
        "Editor",
        "Edit a given blog post to align with \
         the writing style of the organization. ",
        "You are an editor who receives a blog post \
         from the Content Writer. \
         Your goal is to review the blog post \
         to ensure that it follows journalistic best practices,\
         provides balanced viewpoints \
         when providing opinions or assertions, \
         and also avoids major controversial topics \
         or opinions when possible.",
    )
    .with_allow_delegation(false)
    .with_verbose(true)
    .with_llm(llm)
}

pub fn plan_task(agent: Arc<Agent>) -> Task {
    Task::new(
        "1. Prioritize the latest trends, key players, \
         and noteworthy news on {topic}.\n\
         2. Identify the target audience, considering \
         their interests and pain points.\n\
         3. Develop a detailed content outline including \
         an introduction, key points, and a call to action.\n\
         4. Include SEO keywords and relevant data or sources.",
        "A comprehensive content plan document \
         with an outline, audience analysis, \
         SEO keywords, and resources.",
        agent,
    )
    .with_name("plan")
}

pub fn write_task(agent: Arc<Agent>) -> Task {
    Task::new(
        "1. Use the content plan to craft a compelling \
         blog post on {topic}.\n\
         2. Incorporate SEO keywords naturally.\n\
         3. Sections/Subtitles are properly named \
         in an engaging manner.\n\
         4. Ensure the post is structured with an \
         engaging introduction, insightful body, \
         and a summarizing conclusion.\n\
         5. Proofread for grammatical errors and \
         alignment with the brand's voice.\n",
        BLOG_POST_OUTPUT,
        agent,
    )
    .with_name("write")
}

pub fn edit_task(agent: Arc<Agent>) -> Task {
    Task::new(
        "Proofread the given blog post for \
         grammatical errors and \
         alignment with the brand's voice.",
        BLOG_POST_OUTPUT,
        agent,
    )
    .with_name("edit")
}

/// Assemble the planner, writer and editor crew.
pub fn build_crew(llm: Arc<dyn BaseLLM>) -> Crew {
    let planner = Arc::new(planner(Arc::clone(&llm)));
    let writer = Arc::new(writer(Arc::clone(&llm)));
    let editor = Arc::new(editor(llm));

    let tasks = vec![
        plan_task(Arc::clone(&planner)),
        write_task(Arc::clone(&writer)),
        edit_task(Arc::clone(&editor)),
    ];

    Crew::new(vec![planner, writer, editor], tasks)
        .with_name("research_article")
        .with_verbose(true)
}

/// Kickoff inputs for `topic`.
pub fn inputs(topic: &str) -> HashMap<String, String> {
    HashMap::from([("topic".to_string(), topic.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLLM;

    #[test]
    fn test_descriptor_text() {
        let llm: Arc<dyn BaseLLM> = ScriptedLLM::new(Vec::<String>::new());
        let planner = planner(Arc::clone(&llm));
        assert_eq!(
            planner.backstory,
            "You're working on planning a blog article about the topic: {topic}.You collect information that helps the audience learn something and make informed decisions. Your work is the basis for the Content Writer to write an article on this topic."
        );
        assert_eq!(
            editor(Arc::clone(&llm)).goal,
            "Edit a given blog post to align with the writing style of the organization. "
        );

        let task = write_task(Arc::new(writer(llm)));
        assert!(task.description.ends_with("alignment with the brand's voice.\n"));
        assert_eq!(task.expected_output, BLOG_POST_OUTPUT);
    }

    #[tokio::test]
    async fn test_topic_flows_through_pipeline() {
        let llm = ScriptedLLM::new([
            "Thought: I now can give a great answer\nFinal Answer: Outline for Rust",
            "Thought: I now can give a great answer\nFinal Answer: # Rust\n\nDraft.",
            "Thought: I now can give a great answer\nFinal Answer: # Rust\n\nEdited.",
        ]);
        let mut crew = build_crew(llm.clone());
        let output = crew.kickoff(Some(inputs("Rust"))).await.unwrap();

        assert_eq!(output.raw, "# Rust\n\nEdited.");
        assert!(output.tasks_output[0]
            .description
            .contains("noteworthy news on Rust."));

        let requests = llm.requests.lock();
        assert!(requests[0].0[0]
            .content
            .contains("Plan engaging and factually accurate content on Rust"));
        assert!(requests[2].0[1].content.contains("# Rust\n\nDraft."));
        assert!(requests[2].0[1].content.contains("Outline for Rust"));
    }
}
