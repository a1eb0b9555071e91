use std::future::ready;

use azure_agents_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use crate::expr;

/// Input of [`CalculateTool`].
#[derive(Deserialize, JsonSchema)]
pub struct CalculateParameters {
    /// The mathematical expression to evaluate.
    pub expression: String,
}

/// Evaluates arithmetic expressions with [`expr::evaluate`].
///
/// Evaluation failures are reported to the model as text, never as tool
/// errors.
pub struct CalculateTool {
    parameter_schema: Value,
}

impl CalculateTool {
    /// Creates a new calculator tool.
    #[inline]
    pub fn new() -> Self {
        Self {
            parameter_schema: schema_for!(CalculateParameters).to_value(),
        }
    }
}

impl Default for CalculateTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CalculateTool {
    type Input = CalculateParameters;

    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Calculate the result of a mathematical expression. Supports + - * / \
         and parentheses."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: CalculateParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let expression = input.expression;
        let text = match expr::evaluate(&expression) {
            Ok(value) => format!(
                "The result of {expression} is {}",
                expr::format_number(value)
            ),
            Err(err) => {
                debug!("failed to evaluate `{expression}`: {err}");
                format!("Error calculating {expression}: {err}")
            }
        };
        ready(Ok(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn calculate(expression: &str) -> String {
        let input = CalculateParameters {
            expression: expression.to_owned(),
        };
        CalculateTool::new().execute(input).await.unwrap()
    }

    #[tokio::test]
    async fn test_calculate() {
        assert_eq!(
            calculate("15 * 24 + 7").await,
            "The result of 15 * 24 + 7 is 367"
        );
        assert_eq!(calculate("7 / 2").await, "The result of 7 / 2 is 3.5");
        assert_eq!(
            calculate("2+").await,
            "Error calculating 2+: unexpected end of expression"
        );
        assert!(
            calculate("__import__('os').system('ls')")
                .await
                .starts_with("Error calculating")
        );
    }
}
