//! A model provider for Azure OpenAI chat completions deployments.

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use azure_agents_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use mime::Mime;
use reqwest::{Client, Response, StatusCode, header};

pub use config::{AzureConfig, AzureConfigBuilder, DEFAULT_API_VERSION};
use io::{Chunks, Sse};
pub use response::AzureResponse;

/// Tag of the opaque history messages produced by [`AzureProvider`].
pub const PROVIDER_TAG: &str = "azure-openai";

/// Error type for [`AzureProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Azure OpenAI model provider.
#[derive(Clone, Debug)]
pub struct AzureProvider {
    client: Client,
    config: Arc<AzureConfig>,
}

impl AzureProvider {
    /// Creates a new `AzureProvider` with the given configuration.
    #[inline]
    pub fn new(config: AzureConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &AzureConfig {
        &self.config
    }
}

impl ModelProvider for AzureProvider {
    type Error = Error;
    type Response = AzureResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let azure_req = proto::create_request(req, &self.config);
        let url = self.config.chat_completions_url();
        debug!(
            "sending {} messages to deployment `{}`",
            req.messages.len(),
            self.config.deployment
        );
        let resp_fut = self
            .client
            .post(url)
            .header("api-key", &self.config.api_key)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(&azure_req)
            .send();

        async move {
            let resp = resp_fut
                .await
                .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(error_from_status(status, &body));
            }

            check_content_type(&resp)?;

            let chunks = Chunks::from_response(resp);
            let sse = Sse::new(chunks);
            Ok(AzureResponse::from_sse(sse))
        }
    }
}

fn check_content_type(resp: &Response) -> Result<(), Error> {
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let is_event_stream = content_type
        .and_then(|v| v.parse().ok())
        .map(|m: Mime| {
            m.type_() == mime::TEXT && m.subtype().as_str() == "event-stream"
        })
        .unwrap_or(false);
    if !is_event_stream {
        return Err(Error::new(
            format!("Unexpected content type: {content_type:?}"),
            ErrorKind::Other,
        ));
    }
    Ok(())
}

fn error_from_status(status: StatusCode, body: &str) -> Error {
    let kind = if status == StatusCode::TOO_MANY_REQUESTS {
        ErrorKind::RateLimitExceeded
    } else if status == StatusCode::BAD_REQUEST && body.contains("content_filter")
    {
        ErrorKind::Moderated
    } else {
        ErrorKind::Other
    };
    warn!("request failed with {status}: {body}");
    Error::new(format!("HTTP {status}: {body}"), kind)
}
