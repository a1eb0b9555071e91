mod builder;
#[cfg(test)]
mod tests;

use std::fmt::{self, Debug};
use std::sync::Arc;

use azure_agents_model::{ModelMessage, ModelRequest, OutputSchema};

use crate::conversation::Conversation;
use crate::guardrail::InputGuardrail;
use crate::handoff::Handoff;
use crate::model_client::ModelClient;
use crate::tool::Executor as ToolExecutor;
pub use builder::AgentBuilder;

/// An agent definition: instructions, a model, and optionally tools, input
/// guardrails, handoff targets and a structured output type.
///
/// `Agent` is a cheap handle; clones share the same immutable definition.
/// Agents hold no conversation state, use [`Runner`](crate::Runner) to run
/// one.
#[derive(Clone)]
pub struct Agent {
    inner: Arc<AgentInner>,
}

struct AgentInner {
    name: String,
    instructions: String,
    handoff_description: Option<String>,
    output_schema: Option<OutputSchema>,
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    input_guardrails: Vec<Box<dyn InputGuardrail>>,
    handoffs: Vec<Handoff>,
}

impl Agent {
    /// Returns the name of the agent.
    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the system instructions.
    #[inline]
    pub fn instructions(&self) -> &str {
        &self.inner.instructions
    }

    /// Returns the text other agents see when deciding to hand off here.
    #[inline]
    pub fn handoff_description(&self) -> Option<&str> {
        self.inner.handoff_description.as_deref()
    }

    /// Returns the schema the final answer must follow, if any.
    #[inline]
    pub fn output_schema(&self) -> Option<&OutputSchema> {
        self.inner.output_schema.as_ref()
    }

    /// Returns the agents this agent may hand off to.
    #[inline]
    pub fn handoffs(&self) -> &[Handoff] {
        &self.inner.handoffs
    }

    /// Returns the model client used by this agent.
    #[inline]
    pub fn model_client(&self) -> &ModelClient {
        &self.inner.model_client
    }

    #[inline]
    pub(crate) fn input_guardrails(&self) -> &[Box<dyn InputGuardrail>] {
        &self.inner.input_guardrails
    }

    #[inline]
    pub(crate) fn tool_executor(&self) -> &ToolExecutor {
        &self.inner.tool_executor
    }

    pub(crate) fn find_handoff(&self, tool_name: &str) -> Option<&Handoff> {
        self.inner
            .handoffs
            .iter()
            .find(|handoff| handoff.tool_name() == tool_name)
    }

    pub(crate) fn system_prompt(&self) -> String {
        let Some(output_schema) = &self.inner.output_schema else {
            return self.inner.instructions.clone();
        };
        let schema = serde_json::to_string_pretty(&output_schema.schema)
            .unwrap_or_else(|_| output_schema.schema.to_string());
        format!(
            "{}\n\nRespond only with a JSON object that matches this JSON \
             schema, without any other text:\n{schema}",
            self.inner.instructions
        )
    }

    /// Builds the request for the next turn: the system prompt followed
    /// by the whole conversation, with tools and handoffs as tool
    /// definitions.
    pub(crate) fn build_request(
        &self,
        conversation: &Conversation,
    ) -> ModelRequest {
        let mut messages = Vec::with_capacity(conversation.items.len() + 1);
        messages.push(ModelMessage::System(self.system_prompt()));
        messages.extend(conversation.messages());

        let tools = self
            .inner
            .tool_executor
            .definitions()
            .chain(self.inner.handoffs.iter().map(Handoff::definition))
            .collect();

        ModelRequest {
            messages,
            tools,
            output_schema: self.inner.output_schema.clone(),
        }
    }

    fn from_builder(builder: AgentBuilder) -> Self {
        let AgentBuilder {
            name,
            instructions,
            handoff_description,
            output_schema,
            model_client,
            tools,
            input_guardrails,
            handoffs,
        } = builder;

        let inner = AgentInner {
            name,
            instructions,
            handoff_description,
            output_schema,
            model_client,
            tool_executor: ToolExecutor::with_tools(tools),
            input_guardrails,
            handoffs,
        };
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handoffs: Vec<_> =
            self.inner.handoffs.iter().map(|h| h.target().name()).collect();
        let guardrails: Vec<_> =
            self.inner.input_guardrails.iter().map(|g| g.name()).collect();
        f.debug_struct("Agent")
            .field("name", &self.inner.name)
            .field("output_schema", &self.inner.output_schema.is_some())
            .field("input_guardrails", &guardrails)
            .field("handoffs", &handoffs)
            .finish_non_exhaustive()
    }
}
