use azure_agents_model::ModelTool;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::Agent;

/// A route from one agent to another, offered to the model as a tool.
#[derive(Clone)]
pub struct Handoff {
    target: Agent,
    tool_name: String,
}

impl Handoff {
    /// Creates a handoff to `target`.
    pub fn to(target: Agent) -> Self {
        let tool_name = format!("transfer_to_{}", snake_case(target.name()));
        Self { target, tool_name }
    }

    /// Returns the agent that takes over the conversation.
    #[inline]
    pub fn target(&self) -> &Agent {
        &self.target
    }

    /// Returns the name of the tool the model calls to hand off.
    #[inline]
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub(crate) fn definition(&self) -> ModelTool {
        let name = self.target.name();
        let description = match self.target.handoff_description() {
            Some(desc) => format!(
                "Handoff to the {name} agent to handle the request. {desc}"
            ),
            None => format!("Handoff to the {name} agent to handle the request."),
        };
        ModelTool {
            name: self.tool_name.clone(),
            description,
            parameters: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false,
            }),
        }
    }

    pub(crate) fn reply(&self) -> String {
        json!({ "assistant": self.target.name() }).to_string()
    }
}

/// One control transfer that happened during a run.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandoffRecord {
    /// Name of the agent that gave up control.
    pub from_agent: String,
    /// Name of the agent that took over.
    pub to_agent: String,
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
