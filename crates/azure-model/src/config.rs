use std::fmt::{self, Debug, Formatter};

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-05-01-preview";

/// The first API version that accepts `json_schema` response formats.
const JSON_SCHEMA_API_VERSION: &str = "2024-08-01";

/// Builder for [`AzureConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AzureConfigBuilder {
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: Option<String>,
}

impl AzureConfigBuilder {
    /// Creates a builder for the given resource endpoint (for example
    /// `https://my-resource.openai.azure.com`), API key, and model
    /// deployment name.
    #[inline]
    pub fn new<E, K, D>(endpoint: E, api_key: K, deployment: D) -> Self
    where
        E: Into<String>,
        K: Into<String>,
        D: Into<String>,
    {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: None,
        }
    }

    /// Sets the `api-version` query parameter.
    #[inline]
    pub fn with_api_version<S: Into<String>>(mut self, api_version: S) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> AzureConfig {
        let mut endpoint = self.endpoint;
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        AzureConfig {
            api_key: self.api_key,
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            endpoint,
            deployment: self.deployment,
        }
    }
}

impl Debug for AzureConfigBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfigBuilder")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Connection settings for one Azure OpenAI model deployment.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AzureConfig {
    pub(crate) api_key: String,
    pub(crate) api_version: String,
    pub(crate) endpoint: String,
    pub(crate) deployment: String,
}

impl AzureConfig {
    /// Returns the API key.
    #[inline]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the API version.
    #[inline]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Returns the resource endpoint, without a trailing slash.
    #[inline]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the deployment name.
    #[inline]
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Returns the chat completions URL of the deployment.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    /// Returns `true` if this API version understands `json_schema`
    /// response formats. Older versions only offer `json_object`.
    ///
    /// Versions are `YYYY-MM-DD[-preview]`, so comparing the date prefix
    /// as a string is enough.
    pub(crate) fn supports_json_schema(&self) -> bool {
        let date = self.api_version.get(..10).unwrap_or(&self.api_version);
        date >= JSON_SCHEMA_API_VERSION
    }
}

impl Debug for AzureConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .finish()
    }
}
