//! A local fake model for testing purpose.

mod preset;

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use azure_agents_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
    OpaqueMessage,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

/// Tag of the opaque history messages produced by [`TestModelProvider`].
pub const PROVIDER_TAG: &str = "test";

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "test model: {} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    step_idx: usize,
    events: Vec<PresetEvent>,
    event_idx: usize,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.get_mut();

        let sleep = this
            .sleep
            .get_or_insert_with(|| Box::pin(sleep(this.delay)));
        ready!(sleep.as_mut().poll(cx));
        this.sleep = None;

        let event = if this.event_idx < this.events.len() {
            match &this.events[this.event_idx] {
                PresetEvent::MessageDelta(msg) => {
                    ModelResponseEvent::MessageDelta(msg.clone())
                }
                PresetEvent::ToolCall(req) => {
                    ModelResponseEvent::ToolCall(req.clone())
                }
            }
        } else if this.event_idx == this.events.len() {
            let has_tool_call = this
                .events
                .iter()
                .any(|event| matches!(event, PresetEvent::ToolCall(_)));
            ModelResponseEvent::Completed(if has_tool_call {
                ModelFinishReason::ToolCalls
            } else {
                ModelFinishReason::Stop
            })
        } else {
            // In case this method is called after completion.
            return Poll::Ready(Ok(None));
        };
        this.event_idx += 1;
        Poll::Ready(Ok(Some(event)))
    }

    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        let id = format!("msg:{}", self.step_idx);
        Some(OpaqueMessage::new(PROVIDER_TAG, id, self.events.clone()))
    }
}

#[derive(Clone)]
enum ConversationStep {
    UserInput,
    ToolResult,
    AssistantResponse(PresetResponse),
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the conversation script,
/// which is how the model should respond to a request. A step is chosen by
/// counting the non-system messages in the request, so the script mirrors
/// the conversation: user inputs, assistant responses and tool results in
/// the order they will appear. If there are no enough steps in the script,
/// or the selected step is not an assistant response, an error is
/// returned.
///
/// Clones share the attempt counters and the request log.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    conversation_script: Vec<ConversationStep>,
    delay: Option<Duration>,
    attempts: Arc<Mutex<HashMap<usize, u64>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_assistant_response_step(&mut self, preset: PresetResponse) {
        self.conversation_script
            .push(ConversationStep::AssistantResponse(preset));
    }

    #[inline]
    pub fn add_user_input_step(&mut self) {
        self.conversation_script.push(ConversationStep::UserInput);
    }

    #[inline]
    pub fn add_tool_result_step(&mut self) {
        self.conversation_script.push(ConversationStep::ToolResult);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every request received so far, including failed attempts.
    pub fn recorded_requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn select_response(
        &self,
        req: &ModelRequest,
    ) -> Result<(usize, PresetResponse), Error> {
        let step_idx = req
            .messages
            .iter()
            .filter(|msg| !matches!(msg, ModelMessage::System(_)))
            .count();
        let Some(step) = self.conversation_script.get(step_idx) else {
            return Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Other,
            });
        };
        let ConversationStep::AssistantResponse(preset) = step else {
            return Err(Error {
                message: "not an assistant response step",
                kind: ErrorKind::Other,
            });
        };

        if let Some(failures) = preset.failures {
            let mut attempts = self
                .attempts
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let attempt = attempts.entry(step_idx).or_default();
            *attempt += 1;
            if failures == 0 || *attempt <= failures {
                return Err(Error {
                    message: "preset failure",
                    kind: ErrorKind::RateLimitExceeded,
                });
            }
        }
        Ok((step_idx, preset.clone()))
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(req.clone());

        let resp = self.select_response(req).map(|(step_idx, preset)| {
            TestModelResponse {
                step_idx,
                events: preset.events,
                event_idx: 0,
                delay: self.delay.unwrap_or(Duration::from_millis(1)),
                sleep: None,
            }
        });
        ready(resp)
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use azure_agents_model::{
        ModelMessage, ModelRequest, ModelTool, OpaqueMessage, ToolCallRequest,
        ToolCallResult,
    };
    use serde_json::json;

    use super::*;

    async fn collect_response(
        resp: TestModelResponse,
    ) -> (String, Option<ToolCallRequest>, OpaqueMessage) {
        let mut resp = pin!(resp);
        let mut msg = String::new();
        let mut tool_call = None;
        loop {
            let event = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
                .await
                .unwrap()
                .unwrap();
            match event {
                ModelResponseEvent::Completed(_) => break,
                ModelResponseEvent::MessageDelta(delta) => {
                    msg.push_str(&delta);
                }
                ModelResponseEvent::ToolCall(req) => tool_call = Some(req),
            }
        }
        (msg, tool_call, resp.make_opaque_message().unwrap())
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut provider = TestModelProvider::default();
        provider.add_user_input_step();
        provider.add_assistant_response_step(PresetResponse::with_events([
            PresetEvent::MessageDelta("Let me ".to_owned()),
            PresetEvent::MessageDelta("calculate.".to_owned()),
            PresetEvent::ToolCall(ToolCallRequest {
                id: "call_1".to_owned(),
                name: "calculate".to_owned(),
                arguments: json!({ "expression": "15 * 24 + 7" }),
            }),
        ]));
        provider.add_tool_result_step();
        provider.add_assistant_response_step(PresetResponse::with_text(
            "15 * 24 + 7 is 367.",
        ));

        let mut req = ModelRequest {
            messages: vec![
                ModelMessage::System("You can calculate.".to_owned()),
                ModelMessage::User("Calculate 15 * 24 + 7".to_owned()),
            ],
            tools: vec![ModelTool {
                name: "calculate".to_owned(),
                description: "Evaluates arithmetic".to_owned(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "expression": { "type": "string" }
                    }
                }),
            }],
            output_schema: None,
        };
        let resp = provider.send_request(&req).await.unwrap();
        let (msg, tool_call, opaque_msg) = collect_response(resp).await;
        assert_eq!(msg, "Let me calculate.");
        assert_eq!(opaque_msg.provider(), PROVIDER_TAG);
        let tool_call = tool_call.unwrap();
        assert_eq!(tool_call.name, "calculate");

        req.messages.push(ModelMessage::Opaque(opaque_msg));
        req.messages.push(ModelMessage::Tool(ToolCallResult {
            id: tool_call.id,
            content: "The result of 15 * 24 + 7 is 367".to_owned(),
        }));
        let resp = provider.send_request(&req).await.unwrap();
        let (msg, tool_call, _) = collect_response(resp).await;
        assert_eq!(msg, "15 * 24 + 7 is 367.");
        assert!(tool_call.is_none());

        assert_eq!(provider.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_script_errors() {
        let mut provider = TestModelProvider::default();
        provider.add_user_input_step();

        let req =
            ModelRequest::with_messages(vec![ModelMessage::User("Hi".into())]);
        let err = provider.send_request(&req).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Other);

        let req = ModelRequest::with_messages(vec![]);
        assert!(provider.send_request(&req).await.is_err());
    }

    #[tokio::test]
    async fn test_preset_failures() {
        let mut provider = TestModelProvider::default();
        provider.add_user_input_step();
        provider.add_assistant_response_step(
            PresetResponse::with_text("finally").with_failures(2),
        );

        let req =
            ModelRequest::with_messages(vec![ModelMessage::User("Hi".into())]);
        for _ in 0..2 {
            let err = provider.send_request(&req).await.err().unwrap();
            assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
        }
        // Clones share the attempt counter.
        let resp = provider.clone().send_request(&req).await.unwrap();
        let (msg, _, _) = collect_response(resp).await;
        assert_eq!(msg, "finally");
    }
}
