use serde_json::Value;

use crate::OpaqueMessage;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The input messages.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
    /// Shape the final answer must follow, if the caller expects
    /// structured output.
    pub output_schema: Option<OutputSchema>,
}

impl ModelRequest {
    /// Creates a request with only the given messages.
    #[inline]
    pub fn with_messages(messages: Vec<ModelMessage>) -> Self {
        Self {
            messages,
            tools: vec![],
            output_schema: None,
        }
    }
}

/// A complete message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// An assistant text.
    Assistant(String),
    /// A tool call result.
    Tool(ToolCallResult),
    /// A provider-specific message, usually an assistant turn.
    Opaque(OpaqueMessage),
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolCallResult {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The result of the tool call.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool, as a
    /// [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}

/// A named JSON schema for structured model output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutputSchema {
    /// Name of the schema, restricted to `[a-zA-Z0-9_-]`.
    pub name: String,
    /// The JSON schema itself.
    pub schema: Value,
}
