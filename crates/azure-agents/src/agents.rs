//! Agent definitions and their sample inputs.
//!
//! Every factory takes the [`ModelClient`] to use, so the same definitions
//! run against Azure OpenAI in the binaries and against a scripted model in
//! tests.

use azure_agents_core::{Agent, AgentBuilder, ModelClient};

use crate::guardrails::{content_safety_guardrail, homework_guardrail};
use crate::tools::{CalculateTool, FetchWeatherTool, SearchWebTool};

/// Sample input of the basic assistant.
pub const BASIC_QUERY: &str = "What are the benefits of cloud computing?";

/// Sample inputs of the research assistant.
pub const RESEARCH_QUERIES: [&str; 3] = [
    "What's the weather like in London, UK?",
    "Search for information about renewable energy",
    "Calculate 15 * 24 + 7",
];

/// Sample inputs of the guarded education assistant.
pub const EDUCATION_QUERIES: [&str; 3] = [
    "Can you explain how photosynthesis works?",
    "Do my homework for me: solve x^2 + 5x + 6 = 0",
    "What are the key themes in Shakespeare's Macbeth?",
];

/// Sample inputs of the triage agent.
pub const TRIAGE_QUESTIONS: [&str; 3] = [
    "Can you help me solve this equation: 3x + 7 = 22?",
    "What were the main causes of World War I?",
    "How does photosynthesis work in plants?",
];

/// A plain assistant without tools.
pub fn basic_agent(model_client: ModelClient) -> Agent {
    AgentBuilder::with_model_client("Assistant", model_client)
        .with_instructions(
            "You are a helpful assistant that provides concise and accurate \
             information.",
        )
        .build()
}

/// A research assistant with weather, search and calculator tools.
pub fn research_agent(model_client: ModelClient) -> Agent {
    AgentBuilder::with_model_client("Research Assistant", model_client)
        .with_instructions(
            "You are a helpful research assistant that can search for \
             information, check the weather, and perform calculations. Use \
             the appropriate tool based on the user's request.",
        )
        .with_tool(FetchWeatherTool::new())
        .with_tool(SearchWebTool::new())
        .with_tool(CalculateTool::new())
        .build()
}

/// An education assistant guarded by the content safety and homework
/// checks, which classify with `guardrail_client`.
pub fn education_agent(
    model_client: ModelClient,
    guardrail_client: ModelClient,
) -> Agent {
    AgentBuilder::with_model_client("Education Assistant", model_client)
        .with_instructions(
            "You are an educational assistant that helps students learn and \
             understand concepts.\n\
             Provide explanations that promote understanding rather than \
             giving direct answers.\n\
             Use examples to illustrate concepts and encourage critical \
             thinking.",
        )
        .with_input_guardrail(content_safety_guardrail(guardrail_client.clone()))
        .with_input_guardrail(homework_guardrail(guardrail_client))
        .build()
}

/// The math tutor.
pub fn math_tutor(model_client: ModelClient) -> Agent {
    AgentBuilder::with_model_client("Math Tutor", model_client)
        .with_handoff_description(
            "Specialist agent for math questions and calculations",
        )
        .with_instructions(
            "You are a math tutor who helps students understand mathematical \
             concepts and solve problems.\n\
             Explain your reasoning step by step and provide clear \
             explanations.\n\
             Focus only on mathematics topics.",
        )
        .build()
}

/// The history tutor.
pub fn history_tutor(model_client: ModelClient) -> Agent {
    AgentBuilder::with_model_client("History Tutor", model_client)
        .with_handoff_description(
            "Specialist agent for historical questions and information",
        )
        .with_instructions(
            "You are a history tutor who helps students understand historical \
             events, figures, and contexts.\n\
             Provide accurate information with relevant dates and explain \
             historical significance.\n\
             Focus only on history topics.",
        )
        .build()
}

/// The science tutor.
pub fn science_tutor(model_client: ModelClient) -> Agent {
    AgentBuilder::with_model_client("Science Tutor", model_client)
        .with_handoff_description(
            "Specialist agent for science questions and explanations",
        )
        .with_instructions(
            "You are a science tutor who helps students understand scientific \
             concepts and phenomena.\n\
             Explain scientific principles clearly and relate them to \
             real-world applications.\n\
             Focus only on science topics.",
        )
        .build()
}

/// A triage agent that hands each question off to one of the tutors.
pub fn triage_agent(model_client: ModelClient, tutors: [Agent; 3]) -> Agent {
    let [math, history, science] = tutors;
    AgentBuilder::with_model_client("Education Assistant", model_client)
        .with_instructions(
            "You are an education assistant who helps direct students to the \
             appropriate specialized tutor.\n\
             For math questions (algebra, calculus, geometry, etc.), hand off \
             to the Math Tutor.\n\
             For history questions (events, figures, civilizations, etc.), \
             hand off to the History Tutor.\n\
             For science questions (physics, chemistry, biology, etc.), hand \
             off to the Science Tutor.\n\
             If a question spans multiple domains, choose the most relevant \
             specialist.",
        )
        .with_handoff(math)
        .with_handoff(history)
        .with_handoff(science)
        .build()
}

/// The triage agent with all three tutors sharing `model_client`.
pub fn education_triage(model_client: ModelClient) -> Agent {
    let tutors = [
        math_tutor(model_client.clone()),
        history_tutor(model_client.clone()),
        science_tutor(model_client.clone()),
    ];
    triage_agent(model_client, tutors)
}
