use azure_agents_model::ModelMessage;
use azure_agents_test_model::TestModelProvider;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::AgentBuilder;
use crate::conversation::{Conversation, Item};

#[allow(dead_code)]
#[derive(Deserialize, JsonSchema)]
struct HomeworkOutput {
    is_homework: bool,
    reasoning: String,
}

#[test]
fn test_output_type() {
    let agent = AgentBuilder::with_model_provider("Homework Checker", TestModelProvider::default())
        .with_instructions("Check if the user is asking for homework help.")
        .with_output_type::<HomeworkOutput>()
        .build();

    let schema = agent.output_schema().unwrap();
    assert_eq!(schema.name, "HomeworkOutput");
    assert!(schema.schema.get("$schema").is_none());
    assert_eq!(schema.schema["properties"]["is_homework"]["type"], "boolean");

    let prompt = agent.system_prompt();
    assert!(prompt.starts_with("Check if the user is asking for homework help."));
    assert!(prompt.contains("\"is_homework\""));
}

#[test]
fn test_build_request() {
    let tutor = AgentBuilder::with_model_provider("Science Tutor", TestModelProvider::default())
        .with_handoff_description("Specialist for science questions")
        .build();
    let agent = AgentBuilder::with_model_provider("Education Assistant", TestModelProvider::default())
        .with_instructions("Route questions.")
        .with_handoff(tutor)
        .build();
    assert_eq!(agent.handoffs()[0].tool_name(), "transfer_to_science_tutor");

    let mut conversation = Conversation::default();
    conversation.push(Item::user("Why is the sky blue?", agent.name()));
    let req = agent.build_request(&conversation);
    assert_eq!(
        req.messages,
        vec![
            ModelMessage::System("Route questions.".to_owned()),
            ModelMessage::User("Why is the sky blue?".to_owned()),
        ]
    );
    assert_eq!(req.tools.len(), 1);
    assert_eq!(req.tools[0].name, "transfer_to_science_tutor");
    assert_eq!(req.output_schema, None);

    let debug = format!("{agent:?}");
    assert!(debug.contains("Science Tutor"));
}
