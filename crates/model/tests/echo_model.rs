use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::{poll_fn, ready};
use std::pin::Pin;
use std::task::{self, Poll};

use azure_agents_model::{
    ErrorKind, ModelFinishReason, ModelMessage, ModelProvider,
    ModelProviderError, ModelRequest, ModelResponse, ModelResponseEvent,
    ModelTool, ToolCallRequest,
};
use serde_json::json;

#[derive(Debug)]
struct EchoError(ErrorKind);

impl Display for EchoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "echo model failed: {}", self.0)
    }
}

impl Error for EchoError {}

impl ModelProviderError for EchoError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the last user message word by word, or calls the first tool
/// with the message as its `text` argument when tools are offered.
struct EchoResponse {
    events: VecDeque<ModelResponseEvent>,
}

impl ModelResponse for EchoResponse {
    type Error = EchoError;

    fn poll_next_event(
        mut self: Pin<&mut Self>,
        _cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        Poll::Ready(Ok(self.events.pop_front()))
    }
}

struct EchoProvider;

impl ModelProvider for EchoProvider {
    type Error = EchoError;
    type Response = EchoResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let last_user = req.messages.iter().rev().find_map(|msg| match msg {
            ModelMessage::User(text) => Some(text.clone()),
            _ => None,
        });
        let Some(text) = last_user else {
            return ready(Err(EchoError(ErrorKind::Other)));
        };

        let mut events = VecDeque::new();
        if let Some(tool) = req.tools.first() {
            events.push_back(ModelResponseEvent::ToolCall(ToolCallRequest {
                id: "call_0".to_owned(),
                name: tool.name.clone(),
                arguments: json!({ "text": text }),
            }));
            events.push_back(ModelResponseEvent::Completed(
                ModelFinishReason::ToolCalls,
            ));
        } else {
            let words: Vec<_> = text.split(' ').collect();
            for (idx, word) in words.iter().enumerate() {
                let mut delta = word.to_string();
                if idx + 1 < words.len() {
                    delta.push(' ');
                }
                events.push_back(ModelResponseEvent::MessageDelta(delta));
            }
            events
                .push_back(ModelResponseEvent::Completed(ModelFinishReason::Stop));
        }
        ready(Ok(EchoResponse { events }))
    }
}

async fn drain(mut resp: EchoResponse) -> Vec<ModelResponseEvent> {
    let mut events = vec![];
    while let Some(event) =
        poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx))
            .await
            .unwrap()
    {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_text_completion() {
    let req = ModelRequest::with_messages(vec![
        ModelMessage::System("Repeat after the user.".to_owned()),
        ModelMessage::User("Good morning Azure".to_owned()),
    ]);
    let resp = EchoProvider.send_request(&req).await.unwrap();

    let mut text = String::new();
    let mut finish_reason = None;
    for event in drain(resp).await {
        match event {
            ModelResponseEvent::MessageDelta(delta) => text.push_str(&delta),
            ModelResponseEvent::Completed(reason) => finish_reason = Some(reason),
            ModelResponseEvent::ToolCall(call) => {
                unreachable!("unexpected tool call: {call:?}")
            }
        }
    }
    assert_eq!(text, "Good morning Azure");
    assert_eq!(finish_reason, Some(ModelFinishReason::Stop));
}

#[tokio::test]
async fn test_tool_call() {
    let mut req =
        ModelRequest::with_messages(vec![ModelMessage::User("ping".to_owned())]);
    req.tools.push(ModelTool {
        name: "echo".to_owned(),
        description: "Echoes text.".to_owned(),
        parameters: json!({
            "type": "object",
            "properties": { "text": { "type": "string" } }
        }),
    });
    let resp = EchoProvider.send_request(&req).await.unwrap();
    let events = drain(resp).await;
    assert_eq!(
        events,
        vec![
            ModelResponseEvent::ToolCall(ToolCallRequest {
                id: "call_0".to_owned(),
                name: "echo".to_owned(),
                arguments: json!({ "text": "ping" }),
            }),
            ModelResponseEvent::Completed(ModelFinishReason::ToolCalls),
        ]
    );
}

#[tokio::test]
async fn test_error() {
    let req = ModelRequest::with_messages(vec![]);
    let err = EchoProvider.send_request(&req).await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::Other);
    assert!(!err.kind().is_transient());
}
