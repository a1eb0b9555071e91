use azure_agents_model::{ModelProvider, OutputSchema};
use schemars::{JsonSchema, schema_for};

use super::Agent;
use crate::guardrail::InputGuardrail;
use crate::handoff::Handoff;
use crate::model_client::ModelClient;
use crate::tool::{AnyTool, Tool, ToolObject};

/// [`Agent`] builder.
pub struct AgentBuilder {
    pub(crate) name: String,
    pub(crate) instructions: String,
    pub(crate) handoff_description: Option<String>,
    pub(crate) output_schema: Option<OutputSchema>,
    pub(crate) model_client: ModelClient,
    pub(crate) tools: Vec<Box<dyn ToolObject>>,
    pub(crate) input_guardrails: Vec<Box<dyn InputGuardrail>>,
    pub(crate) handoffs: Vec<Handoff>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        name: impl Into<String>,
        provider: P,
    ) -> Self {
        Self::with_model_client(name, ModelClient::new(provider))
    }

    /// Creates a new builder sharing an existing model client.
    pub fn with_model_client(
        name: impl Into<String>,
        model_client: ModelClient,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: String::new(),
            handoff_description: None,
            output_schema: None,
            model_client,
            tools: vec![],
            input_guardrails: vec![],
            handoffs: vec![],
        }
    }

    /// Sets the system instructions.
    #[inline]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Sets the description shown to agents that can hand off to this one.
    #[inline]
    pub fn with_handoff_description(
        mut self,
        description: impl Into<String>,
    ) -> Self {
        self.handoff_description = Some(description.into());
        self
    }

    /// Requires the final answer to be a JSON document of type `T`.
    pub fn with_output_type<T: JsonSchema>(mut self) -> Self {
        let mut schema = schema_for!(T).to_value();
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }
        let name: String = T::schema_name()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.output_schema = Some(OutputSchema { name, schema });
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        let tool = Box::new(AnyTool(tool));
        self.tools.push(tool);
        self
    }

    /// Registers an input guardrail. Guardrails run in registration order.
    #[inline]
    pub fn with_input_guardrail<G: InputGuardrail>(mut self, guardrail: G) -> Self {
        self.input_guardrails.push(Box::new(guardrail));
        self
    }

    /// Allows the model to hand the conversation off to `target`.
    #[inline]
    pub fn with_handoff(mut self, target: Agent) -> Self {
        self.handoffs.push(Handoff::to(target));
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        Agent::from_builder(self)
    }
}
