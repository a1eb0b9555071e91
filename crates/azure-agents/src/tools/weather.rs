use std::future::ready;

use azure_agents_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

/// A place on earth.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct Location {
    /// Name of the city.
    pub city: String,
    /// Name of the country.
    pub country: String,
}

/// Input of [`FetchWeatherTool`].
#[derive(Deserialize, JsonSchema)]
pub struct FetchWeatherParameters {
    /// The location to fetch the weather for, including city and country.
    pub location: Location,
}

/// Reports the current weather for a location.
///
/// The report is canned; no weather service is contacted.
pub struct FetchWeatherTool {
    parameter_schema: Value,
}

impl FetchWeatherTool {
    /// Creates a new weather tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(FetchWeatherParameters).to_value(),
        }
    }
}

impl Default for FetchWeatherTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for FetchWeatherTool {
    type Input = FetchWeatherParameters;

    fn name(&self) -> &str {
        "fetch_weather"
    }

    fn description(&self) -> &str {
        "Fetch the current weather for a given location."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: FetchWeatherParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let Location { city, country } = input.location;
        debug!("fetching weather for {city}, {country}");
        ready(Ok(format!(
            "The weather in {city}, {country} is currently sunny with a \
             temperature of 22°C."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_weather() {
        let tool = FetchWeatherTool::new();
        let input = FetchWeatherParameters {
            location: Location {
                city: "London".to_owned(),
                country: "UK".to_owned(),
            },
        };
        assert_eq!(
            tool.execute(input).await.unwrap(),
            "The weather in London, UK is currently sunny with a temperature \
             of 22°C."
        );

        let schema = tool.parameter_schema();
        assert!(schema["required"].as_array().unwrap().contains(&"location".into()));
    }
}
