use std::future::ready;

use azure_agents_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

/// A web search request.
#[derive(Clone, Debug, Deserialize, JsonSchema)]
pub struct SearchQuery {
    /// The search query string.
    pub query: String,
}

/// Input of [`SearchWebTool`].
#[derive(Deserialize, JsonSchema)]
pub struct SearchWebParameters {
    /// The search query.
    pub query: SearchQuery,
}

/// Searches the web. Results are placeholders.
pub struct SearchWebTool {
    parameter_schema: Value,
}

impl SearchWebTool {
    /// Creates a new search tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(SearchWebParameters).to_value(),
        }
    }
}

impl Default for SearchWebTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SearchWebTool {
    type Input = SearchWebParameters;

    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the web for information."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: SearchWebParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let query = input.query.query;
        ready(Ok(format!(
            "Here are the top results for '{query}':\n\
             1. Example result 1\n\
             2. Example result 2\n\
             3. Example result 3"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_web() {
        let input = SearchWebParameters {
            query: SearchQuery {
                query: "renewable energy".to_owned(),
            },
        };
        let result = SearchWebTool::new().execute(input).await.unwrap();
        assert_eq!(
            result,
            "Here are the top results for 'renewable energy':\n\
             1. Example result 1\n2. Example result 2\n3. Example result 3"
        );
    }
}
