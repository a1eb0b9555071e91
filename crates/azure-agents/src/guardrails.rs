//! Input guardrails of the education assistant.
//!
//! Both guardrails ask a classification agent for a structured verdict and
//! trip on it: one rejects unsafe content, the other rejects requests for
//! ready-made homework answers.

use azure_agents_core::{Agent, AgentBuilder, AgentGuardrail, InputGuardrail, ModelClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name of the content safety guardrail and its classifier.
pub const CONTENT_SAFETY_CHECK: &str = "Content Safety Check";
/// Name of the homework guardrail and its classifier.
pub const HOMEWORK_CHECK: &str = "Homework Check";

/// Verdict of the content safety classifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ContentSafetyOutput {
    /// Whether the input is completely safe and appropriate.
    pub is_safe: bool,
    /// Why the classifier decided so.
    pub reasoning: String,
}

/// Verdict of the homework classifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HomeworkOutput {
    /// Whether the input asks for direct homework answers.
    pub is_homework: bool,
    /// Why the classifier decided so.
    pub reasoning: String,
}

/// Rejects unsafe input.
pub fn content_safety_message(output: &ContentSafetyOutput) -> Option<String> {
    (!output.is_safe)
        .then(|| format!("Content safety check: {}", output.reasoning))
}

/// Rejects homework requests.
pub fn homework_message(output: &HomeworkOutput) -> Option<String> {
    output
        .is_homework
        .then(|| format!("Homework policy: {}", output.reasoning))
}

/// Builds the content safety classifier.
pub fn content_safety_agent(model_client: ModelClient) -> Agent {
    AgentBuilder::with_model_client(CONTENT_SAFETY_CHECK, model_client)
        .with_instructions(
            "You evaluate if user input contains harmful, offensive, or \
             inappropriate content.\n\
             Respond with is_safe=True only if the content is completely \
             safe and appropriate.\n\
             Respond with is_safe=False if the content contains any harmful, \
             offensive, or inappropriate elements.\n\
             Provide clear reasoning for your decision.",
        )
        .with_output_type::<ContentSafetyOutput>()
        .build()
}

/// Builds the homework classifier.
pub fn homework_agent(model_client: ModelClient) -> Agent {
    AgentBuilder::with_model_client(HOMEWORK_CHECK, model_client)
        .with_instructions(
            "You evaluate if the user is asking for direct homework answers \
             or trying to cheat on assignments.\n\
             Respond with is_homework=True if the query appears to be asking \
             for direct homework answers.\n\
             Respond with is_homework=False if the query is asking for \
             general knowledge or understanding.\n\
             Provide clear reasoning for your decision.",
        )
        .with_output_type::<HomeworkOutput>()
        .build()
}

/// The content safety guardrail, classifying with `model_client`.
pub fn content_safety_guardrail(model_client: ModelClient) -> impl InputGuardrail {
    AgentGuardrail::new(
        CONTENT_SAFETY_CHECK,
        content_safety_agent(model_client),
        content_safety_message,
    )
}

/// The homework guardrail, classifying with `model_client`.
pub fn homework_guardrail(model_client: ModelClient) -> impl InputGuardrail {
    AgentGuardrail::new(
        HOMEWORK_CHECK,
        homework_agent(model_client),
        homework_message,
    )
}
