use azure_agents_model::{
    ModelMessage, ModelRequest, ModelTool, OutputSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AzureConfig, PROVIDER_TAG};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(skip_serializing)]
    pub index: Option<u32>,
    pub id: Option<String>,
    pub r#type: Option<String>,
    pub function: Option<FunctionToolCall>,
}

/// One streamed chunk.
///
/// Azure sends chunks with an empty `id` and no choices to carry prompt
/// filter results, usually first in the stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct Delta {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: Value,
    strict: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
    JsonObject,
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatCompletionRequest {
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

// -----------
// Conversions
// -----------

/// Builds the request body. The deployment lives in the URL, so the body
/// carries no `model` field.
#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &AzureConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        messages: req.messages.iter().filter_map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
        response_format: req
            .output_schema
            .as_ref()
            .map(|schema| create_response_format(schema, config)),
        stream: true,
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Option<Message> {
    let msg = match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(content) => Message::Assistant {
            content: Some(content.clone()),
            tool_calls: None,
        },
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
        ModelMessage::Opaque(opaque) => {
            if opaque.provider() != PROVIDER_TAG {
                warn!("skipping a message from provider `{}`", opaque.provider());
                return None;
            }
            opaque.downcast_ref::<Message>()?.clone()
        }
    };
    Some(msg)
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

fn create_response_format(
    schema: &OutputSchema,
    config: &AzureConfig,
) -> ResponseFormat {
    if !config.supports_json_schema() {
        return ResponseFormat::JsonObject;
    }
    ResponseFormat::JsonSchema {
        json_schema: JsonSchemaFormat {
            name: schema.name.clone(),
            schema: schema.schema.clone(),
            strict: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use azure_agents_model::{OpaqueMessage, ToolCallResult};
    use serde_json::json;

    use super::*;
    use crate::AzureConfigBuilder;

    fn verdict_schema() -> OutputSchema {
        OutputSchema {
            name: "Verdict".to_owned(),
            schema: json!({
                "type": "object",
                "properties": { "ok": { "type": "boolean" } }
            }),
        }
    }

    #[test]
    fn test_create_request() {
        let request = ModelRequest {
            messages: vec![
                ModelMessage::System("You are a helpful assistant.".to_owned()),
                ModelMessage::User("Weather in London?".to_owned()),
            ],
            tools: vec![ModelTool {
                name: "fetch_weather".to_owned(),
                description: "Fetches the weather.".to_owned(),
                parameters: json!({ "type": "object" }),
            }],
            output_schema: None,
        };
        let config = AzureConfigBuilder::new("https://x", "k", "gpt-4o").build();
        let body = serde_json::to_value(create_request(&request, &config))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "messages": [
                    { "role": "system", "content": "You are a helpful assistant." },
                    { "role": "user", "content": "Weather in London?" }
                ],
                "tools": [{
                    "type": "function",
                    "function": {
                        "name": "fetch_weather",
                        "description": "Fetches the weather.",
                        "parameters": { "type": "object" }
                    }
                }],
                "stream": true
            })
        );
    }

    #[test]
    fn test_response_format_follows_api_version() {
        let mut request = ModelRequest::with_messages(vec![
            ModelMessage::User("Is this safe?".to_owned()),
        ]);
        request.output_schema = Some(verdict_schema());

        let old = AzureConfigBuilder::new("https://x", "k", "d").build();
        let body = serde_json::to_value(create_request(&request, &old)).unwrap();
        assert_eq!(body["response_format"], json!({ "type": "json_object" }));

        let new = AzureConfigBuilder::new("https://x", "k", "d")
            .with_api_version("2024-10-21")
            .build();
        let body = serde_json::to_value(create_request(&request, &new)).unwrap();
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "Verdict");
        assert_eq!(body["response_format"]["json_schema"]["strict"], false);
    }

    #[test]
    fn test_history_messages() {
        let assistant = Message::Assistant {
            content: None,
            tool_calls: Some(vec![ToolCall {
                index: Some(0),
                id: Some("call_1".to_owned()),
                r#type: Some("function".to_owned()),
                function: Some(FunctionToolCall {
                    name: Some("calculate".to_owned()),
                    arguments: Some("{\"expression\":\"1+1\"}".to_owned()),
                }),
            }]),
        };
        let request = ModelRequest::with_messages(vec![
            ModelMessage::Opaque(OpaqueMessage::new(
                PROVIDER_TAG,
                "chatcmpl-1",
                assistant,
            )),
            ModelMessage::Opaque(OpaqueMessage::new("test", "msg:2", ())),
            ModelMessage::Tool(ToolCallResult {
                id: "call_1".to_owned(),
                content: "The result of 1+1 is 2".to_owned(),
            }),
        ]);
        let config = AzureConfigBuilder::new("https://x", "k", "d").build();
        let body = serde_json::to_value(create_request(&request, &config))
            .unwrap();
        assert_eq!(
            body["messages"],
            json!([
                {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "calculate",
                            "arguments": "{\"expression\":\"1+1\"}"
                        }
                    }]
                },
                {
                    "role": "tool",
                    "tool_call_id": "call_1",
                    "content": "The result of 1+1 is 2"
                }
            ])
        );
    }
}
