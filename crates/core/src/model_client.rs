use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::time::Duration;

use azure_agents_model::{
    ModelFinishReason, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ModelResponseEvent, OpaqueMessage, ToolCallRequest,
};
use backoff::ExponentialBackoffBuilder;
use tracing::Instrument;

type SendRequestResult =
    Result<ModelClientResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedSendRequestFuture + Send + Sync>;

/// How [`ModelClient`] retries transient failures such as rate limiting.
///
/// Delays grow exponentially from `initial_interval`; retrying stops once
/// `max_elapsed_time` has passed since the first attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Total time budget for all attempts.
    pub max_elapsed_time: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_elapsed_time: Duration::from_secs(30),
        }
    }
}

/// A wrapper around a model provider that maintains an execution
/// environment for the provider and provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
    retry_policy: Option<RetryPolicy>,
}

impl ModelClient {
    /// Wraps a provider, retrying transient failures with the default
    /// [`RetryPolicy`].
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.send_request(&req);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let resp_or_err = fut.await;
                    handle_response::<P>(resp_or_err).await
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self {
            handler_fn,
            retry_policy: Some(RetryPolicy::default()),
        }
    }

    /// Replaces the retry policy. `None` disables retrying.
    #[inline]
    pub fn with_retry_policy(mut self, retry_policy: Option<RetryPolicy>) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Sends a request and returns the fully received response.
    ///
    /// Failures whose kind is transient are retried according to the
    /// retry policy; the last error is returned once it gives up.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The response stops streaming further
    /// events when this operation is cancelled.
    pub async fn send_request(&self, req: ModelRequest) -> SendRequestResult {
        let Some(policy) = self.retry_policy else {
            return (self.handler_fn)(req).await;
        };

        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(policy.initial_interval)
            .with_max_elapsed_time(Some(policy.max_elapsed_time))
            .build();
        backoff::future::retry(backoff, || {
            let fut = (self.handler_fn)(req.clone());
            async move {
                fut.await.map_err(|err| {
                    if err.kind().is_transient() {
                        warn!("model request failed, will retry: {err}");
                        backoff::Error::transient(err)
                    } else {
                        backoff::Error::permanent(err)
                    }
                })
            }
        })
        .await
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug)]
pub struct ModelClientResponse {
    /// The concatenated message text.
    pub transcript: String,
    /// The provider's own record of the assistant message, to be sent
    /// back in later requests.
    pub opaque_msg: Option<OpaqueMessage>,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCallRequest>,
    /// The reason the model finished generating.
    pub finish_reason: Option<ModelFinishReason>,
}

async fn handle_response<P: ModelProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
) -> SendRequestResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("got an error: {err:?}");
            return Err(Box::new(err));
        }
    };

    let mut transcript = String::new();
    let opaque_msg;
    let mut tool_calls = Vec::new();
    let mut finish_reason = None;

    trace!("start receiving events");

    let mut pinned_resp = pin!(resp);
    loop {
        let event_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_event(cx)).await;
        let event = match event_or_err {
            Ok(event) => event,
            Err(err) => {
                error!("got an error: {err:?}");
                return Err(Box::new(err));
            }
        };

        let Some(event) = event else {
            // The request has been handled gracefully without errors,
            // now try getting the opaque message for this response.
            opaque_msg = pinned_resp.make_opaque_message();
            break;
        };
        trace!("got an event: {event:?}");

        match event {
            ModelResponseEvent::MessageDelta(msg) => {
                transcript.push_str(&msg);
            }
            ModelResponseEvent::ToolCall(req) => {
                tool_calls.push(req);
            }
            ModelResponseEvent::Completed(reason) => {
                finish_reason = Some(reason);
            }
        }
    }

    trace!("finished a request");

    Ok(ModelClientResponse {
        transcript,
        opaque_msg,
        tool_calls,
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use azure_agents_model::{ErrorKind, ModelMessage};
    use azure_agents_test_model::{
        PresetEvent, PresetResponse, TestModelProvider,
    };

    use super::*;

    fn fast_retry() -> Option<RetryPolicy> {
        Some(RetryPolicy {
            initial_interval: Duration::from_millis(1),
            max_elapsed_time: Duration::from_millis(200),
        })
    }

    fn hi() -> ModelRequest {
        ModelRequest::with_messages(vec![ModelMessage::User("Hi".to_owned())])
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_events([
                PresetEvent::MessageDelta("How ".to_owned()),
                PresetEvent::MessageDelta("are ".to_owned()),
                PresetEvent::MessageDelta("you?".to_owned()),
            ]),
        );

        let model_client = ModelClient::new(model_provider);

        for _ in 0..3 {
            let resp = model_client.send_request(hi()).await.unwrap();
            assert_eq!(resp.transcript, "How are you?");
            assert!(resp.opaque_msg.is_some());
            assert!(resp.tool_calls.is_empty());
            assert_eq!(resp.finish_reason, Some(ModelFinishReason::Stop));
        }
    }

    #[tokio::test]
    async fn test_error_handling() {
        let model_provider = TestModelProvider::default();
        let model_client = ModelClient::new(model_provider.clone());
        let err = model_client.send_request(hi()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        // Permanent failures are not retried.
        assert_eq!(model_provider.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_rate_limit() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_text("finally").with_failures(2),
        );

        let model_client = ModelClient::new(model_provider.clone())
            .with_retry_policy(fast_retry());
        let resp = model_client.send_request(hi()).await.unwrap();
        assert_eq!(resp.transcript, "finally");
        assert_eq!(model_provider.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_text("never").with_failures(0),
        );

        let model_client = ModelClient::new(model_provider.clone())
            .with_retry_policy(fast_retry());
        let err = model_client.send_request(hi()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
        assert!(model_provider.recorded_requests().len() > 1);
    }

    #[tokio::test]
    async fn test_retry_disabled() {
        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_text("finally").with_failures(1),
        );

        let model_client =
            ModelClient::new(model_provider.clone()).with_retry_policy(None);
        let err = model_client.send_request(hi()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
        assert_eq!(model_provider.recorded_requests().len(), 1);
    }
}
