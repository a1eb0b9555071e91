use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use azure_agents_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    OpaqueMessage, ToolCallRequest,
};
use futures_util::future::BoxFuture;
use pin_project_lite::pin_project;
use serde_json::Value;

use crate::io::Sse;
use crate::proto::{ChatCompletionChunk, Message, ToolCall};
use crate::{Error, PROVIDER_TAG};

struct PartialState {
    sse: Sse,
    id: Option<String>,
    content: String,
    tool_calls: Vec<ToolCall>,
    // Tool calls are announced only once the stream says they are
    // complete, since their arguments arrive in fragments.
    pending_tool_call_idx: VecDeque<usize>,
    // Cleared after the response returns the completed event.
    pending_finish_reason: Option<ModelFinishReason>,
    finished: bool,
}

impl PartialState {
    #[inline]
    fn finish(self) -> Option<(String, Message)> {
        let content = if self.content.is_empty() && !self.tool_calls.is_empty()
        {
            None
        } else {
            Some(self.content)
        };
        Some((
            self.id?,
            Message::Assistant {
                content,
                tool_calls: if self.tool_calls.is_empty() {
                    None
                } else {
                    Some(self.tool_calls)
                },
            },
        ))
    }

    fn apply_tool_call_delta(&mut self, tool_call: ToolCall) {
        let Some(partial) = self
            .tool_calls
            .iter_mut()
            .find(|t| t.index == tool_call.index)
        else {
            self.pending_tool_call_idx.push_back(self.tool_calls.len());
            self.tool_calls.push(tool_call);
            return;
        };

        if let Some(id) = tool_call.id {
            partial.id.get_or_insert_default().push_str(&id);
        }
        if partial.r#type.is_none() {
            partial.r#type = tool_call.r#type;
        }
        let Some(function) = tool_call.function else {
            return;
        };
        match &mut partial.function {
            Some(partial_func) => {
                if let Some(name) = function.name {
                    partial_func.name.get_or_insert_default().push_str(&name);
                }
                if let Some(arguments) = function.arguments {
                    partial_func
                        .arguments
                        .get_or_insert_default()
                        .push_str(&arguments);
                }
            }
            None => partial.function = Some(function),
        }
    }
}

type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    pub struct AzureResponse {
        next_event_fut: Option<BoxFuture<'static, NextEvent>>,
        full_msg: Option<(String, Message)>,
    }
}

impl AzureResponse {
    #[inline]
    pub fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            id: None,
            content: Default::default(),
            tool_calls: Default::default(),
            pending_tool_call_idx: Default::default(),
            pending_finish_reason: Default::default(),
            finished: false,
        };
        Self {
            next_event_fut: Some(Box::pin(next_event(partial_state))),
            full_msg: None,
        }
    }
}

impl ModelResponse for AzureResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, partial_state)) => {
                    *this.next_event_fut = None;
                    *this.full_msg = partial_state.finish();
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        // The stream may still have more data to pull.
        *this.next_event_fut = Some(Box::pin(next_event(partial_state)));

        Poll::Ready(Ok(Some(event)))
    }

    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        self.full_msg
            .as_ref()
            .map(|(id, msg)| OpaqueMessage::new(PROVIDER_TAG, id, msg.clone()))
    }
}

async fn next_event(mut partial_state: PartialState) -> NextEvent {
    let mut message_delta: Option<String> = None;

    while !partial_state.finished {
        let sse_event = match partial_state.sse.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(err) => return Err(Error::new(err.to_string(), ErrorKind::Other)),
        };
        trace!("got sse event: {sse_event}");
        if sse_event == "[DONE]" {
            partial_state.finished = true;
            break;
        }

        let mut chunk = serde_json::from_str::<ChatCompletionChunk>(&sse_event)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        let Some(choice) = chunk.choices.pop() else {
            // Filter results or usage only.
            continue;
        };
        if !chunk.id.is_empty()
            && partial_state.id.get_or_insert_with(|| chunk.id.clone())
                != &chunk.id
        {
            return Err(Error::new("chunk id mismatch", ErrorKind::Other));
        }

        if let Some(content) = choice.delta.content {
            if !content.is_empty() {
                partial_state.content.push_str(&content);
                message_delta.get_or_insert_default().push_str(&content);
            }
        }
        for tool_call in choice.delta.tool_calls.into_iter().flatten() {
            partial_state.apply_tool_call_delta(tool_call);
        }

        if let Some(finish_reason) = choice.finish_reason {
            let finish_reason = match finish_reason.as_str() {
                "tool_calls" | "function_call" => ModelFinishReason::ToolCalls,
                "length" => ModelFinishReason::Length,
                "content_filter" => {
                    return Err(Error::new(
                        "the completion was blocked by the content filter",
                        ErrorKind::Moderated,
                    ));
                }
                _ => ModelFinishReason::Stop,
            };
            partial_state.pending_finish_reason = Some(finish_reason);
            break;
        }

        if message_delta.is_some() {
            break;
        }
    }

    // Emit message delta first, then pending tool calls, and finally the
    // pending finish reason if any.

    if let Some(message_delta) = message_delta {
        return Ok((
            Some(ModelResponseEvent::MessageDelta(message_delta)),
            partial_state,
        ));
    }

    if let Some(idx) = partial_state.pending_tool_call_idx.pop_front() {
        let tool_call = &partial_state.tool_calls[idx];
        let id = tool_call.id.clone().unwrap_or_default();
        let function = tool_call.function.as_ref();
        let name = function.and_then(|f| f.name.clone()).unwrap_or_default();
        let arguments = function
            .and_then(|f| f.arguments.as_deref())
            .and_then(|args| serde_json::from_str::<Value>(args).ok())
            .unwrap_or_default();
        return Ok((
            Some(ModelResponseEvent::ToolCall(ToolCallRequest {
                id,
                name,
                arguments,
            })),
            partial_state,
        ));
    }

    if let Some(finish_reason) = partial_state.pending_finish_reason.take() {
        return Ok((
            Some(ModelResponseEvent::Completed(finish_reason)),
            partial_state,
        ));
    }

    Ok((None, partial_state))
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use azure_agents_model::ModelProviderError;
    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::io::Chunks;

    async fn collect(
        chunks: Vec<Bytes>,
    ) -> (Result<Vec<ModelResponseEvent>, Error>, Option<OpaqueMessage>) {
        let sse = Sse::new(Chunks::from_vec_deque(chunks.into()));
        let mut resp = pin!(AzureResponse::from_sse(sse));
        let mut events = vec![];
        loop {
            match poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await {
                Ok(Some(event)) => events.push(event),
                Ok(None) => break,
                Err(err) => return (Err(err), None),
            }
        }
        (Ok(events), resp.make_opaque_message())
    }

    #[tokio::test]
    async fn test_tool_call_stream() {
        let (events, opaque) = collect(vec![Bytes::from_static(
            include_bytes!("../fixtures/tool_call_stream.txt"),
        )])
        .await;
        let events = events.unwrap();
        assert_eq!(
            events,
            vec![
                ModelResponseEvent::ToolCall(ToolCallRequest {
                    id: "call_weather".to_owned(),
                    name: "fetch_weather".to_owned(),
                    arguments: json!({
                        "location": { "city": "London", "country": "UK" }
                    }),
                }),
                ModelResponseEvent::ToolCall(ToolCallRequest {
                    id: "call_calc".to_owned(),
                    name: "calculate".to_owned(),
                    arguments: json!({ "expression": "15 * 24 + 7" }),
                }),
                ModelResponseEvent::Completed(ModelFinishReason::ToolCalls),
            ]
        );

        let opaque = opaque.unwrap();
        assert_eq!(opaque.provider(), PROVIDER_TAG);
        assert_eq!(opaque.id(), "chatcmpl-tools");
        let Some(Message::Assistant {
            content,
            tool_calls: Some(tool_calls),
        }) = opaque.downcast_ref::<Message>()
        else {
            panic!("expected an assistant message with tool calls");
        };
        assert_eq!(content, &None);
        assert_eq!(tool_calls.len(), 2);
    }

    #[tokio::test]
    async fn test_text_stream() {
        let (events, opaque) = collect(vec![
            Bytes::from_static(include_bytes!("../fixtures/text_stream.txt")),
        ])
        .await;
        let text: String = events
            .unwrap()
            .into_iter()
            .filter_map(|event| match event {
                ModelResponseEvent::MessageDelta(delta) => Some(delta),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Cloud computing offers elasticity.");
        assert!(opaque.is_some());
    }

    #[tokio::test]
    async fn test_content_filter() {
        let (events, _) = collect(vec![Bytes::from_static(
            b"data: {\"id\":\"chatcmpl-x\",\"choices\":[{\"index\":0,\
              \"delta\":{},\"finish_reason\":\"content_filter\"}]}\n\n",
        )])
        .await;
        assert_eq!(events.unwrap_err().kind(), ErrorKind::Moderated);
    }
}
