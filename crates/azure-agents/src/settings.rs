use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};

use azure_agents_openai::{AzureConfig, AzureConfigBuilder, DEFAULT_API_VERSION};

const API_KEY_VAR: &str = "AZURE_OPENAI_API_KEY";
const API_VERSION_VAR: &str = "AZURE_OPENAI_API_VERSION";
const ENDPOINT_VAR: &str = "AZURE_OPENAI_ENDPOINT";
const DEPLOYMENT_VAR: &str = "AZURE_OPENAI_DEPLOYMENT";

/// A required environment variable is unset or empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingVariable(pub &'static str);

impl Display for MissingVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} environment variable is not set", self.0)
    }
}

impl StdError for MissingVariable {}

/// Connection settings read from the `AZURE_OPENAI_*` variables.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// `AZURE_OPENAI_API_KEY`.
    pub api_key: String,
    /// `AZURE_OPENAI_API_VERSION`, defaults to
    /// [`DEFAULT_API_VERSION`].
    pub api_version: String,
    /// `AZURE_OPENAI_ENDPOINT`.
    pub endpoint: String,
    /// `AZURE_OPENAI_DEPLOYMENT`.
    pub deployment: String,
}

impl Settings {
    /// Reads the settings from the process environment.
    ///
    /// Loading a `.env` file is up to the caller.
    #[inline]
    pub fn from_env() -> Result<Self, MissingVariable> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the settings through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MissingVariable>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let require = |name: &'static str| get(name).ok_or(MissingVariable(name));

        let settings = Self {
            api_key: require(API_KEY_VAR)?,
            api_version: get(API_VERSION_VAR)
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
            endpoint: require(ENDPOINT_VAR)?,
            deployment: require(DEPLOYMENT_VAR)?,
        };
        debug!("loaded settings: {settings:?}");
        Ok(settings)
    }

    /// Converts the settings into a provider configuration.
    pub fn azure_config(&self) -> AzureConfig {
        AzureConfigBuilder::new(&self.endpoint, &self.api_key, &self.deployment)
            .with_api_version(&self.api_version)
            .build()
    }
}

impl Debug for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("endpoint", &self.endpoint)
            .field("deployment", &self.deployment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let settings = Settings::from_lookup(lookup(&[
            ("AZURE_OPENAI_API_KEY", "secret"),
            ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com/"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
        ]))
        .unwrap();
        assert_eq!(settings.api_version, "2024-05-01-preview");
        assert_eq!(settings.deployment, "gpt-4o");
        assert!(!format!("{settings:?}").contains("secret"));

        let config = settings.azure_config();
        assert_eq!(config.endpoint(), "https://res.openai.azure.com");
        assert_eq!(config.api_version(), "2024-05-01-preview");
    }

    #[test]
    fn test_api_version_override() {
        let settings = Settings::from_lookup(lookup(&[
            ("AZURE_OPENAI_API_KEY", "secret"),
            ("AZURE_OPENAI_API_VERSION", "2024-10-21"),
            ("AZURE_OPENAI_ENDPOINT", "https://res.openai.azure.com"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
        ]))
        .unwrap();
        assert_eq!(settings.api_version, "2024-10-21");
    }

    #[test]
    fn test_missing_variable() {
        let err = Settings::from_lookup(lookup(&[
            ("AZURE_OPENAI_API_KEY", "secret"),
            ("AZURE_OPENAI_ENDPOINT", ""),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o"),
        ]))
        .unwrap_err();
        assert_eq!(err, MissingVariable("AZURE_OPENAI_ENDPOINT"));
        assert_eq!(
            err.to_string(),
            "AZURE_OPENAI_ENDPOINT environment variable is not set"
        );
    }
}
