use std::fmt::{self, Display};
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Agent, RunError, RunOutcome, Runner};

/// The verdict of an input guardrail.
///
/// `message` is present exactly when the tripwire is triggered, and is
/// never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct GuardrailOutput {
    /// Whatever the check produced, kept for inspection.
    pub output_info: Value,
    /// Whether the input must be rejected.
    pub tripwire_triggered: bool,
    /// Why the input was rejected.
    pub message: Option<String>,
}

impl GuardrailOutput {
    /// A verdict letting the input through.
    #[inline]
    pub fn pass(output_info: Value) -> Self {
        Self {
            output_info,
            tripwire_triggered: false,
            message: None,
        }
    }

    /// A verdict rejecting the input. An empty message is replaced by a
    /// generic one.
    pub fn trip(output_info: Value, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "input rejected".to_owned();
        }
        Self {
            output_info,
            tripwire_triggered: true,
            message: Some(message),
        }
    }

    /// Trips when a message is given, passes otherwise.
    #[inline]
    pub fn from_message(output_info: Value, message: Option<String>) -> Self {
        match message {
            Some(message) => Self::trip(output_info, message),
            None => Self::pass(output_info),
        }
    }
}

/// A check that runs on the user input before the agent sees it.
#[async_trait]
pub trait InputGuardrail: Send + Sync + 'static {
    /// Returns the name used in logs and in [`GuardrailTripped`].
    fn name(&self) -> &str;

    /// Checks the input.
    async fn check(&self, input: &str) -> Result<GuardrailOutput, RunError>;
}

/// Raised when an input guardrail rejects the input.
#[derive(Clone, Debug, PartialEq)]
pub struct GuardrailTripped {
    /// Name of the guardrail.
    pub guardrail: String,
    /// Its verdict, with `tripwire_triggered` set.
    pub output: GuardrailOutput,
}

impl Display for GuardrailTripped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.output.message.as_deref().unwrap_or("input rejected");
        write!(f, "{}: {message}", self.guardrail)
    }
}

/// A guardrail backed by a classification agent.
///
/// The agent runs on the user input and must answer with a `T`; `map`
/// turns that answer into an optional rejection message.
pub struct AgentGuardrail<T, F> {
    name: String,
    agent: Agent,
    runner: Runner,
    map: F,
    _output: PhantomData<fn() -> T>,
}

impl<T, F> AgentGuardrail<T, F>
where
    T: DeserializeOwned + Serialize + Send + 'static,
    F: Fn(&T) -> Option<String> + Send + Sync + 'static,
{
    /// Creates a guardrail named `name` that classifies with `agent`.
    pub fn new(name: impl Into<String>, agent: Agent, map: F) -> Self {
        Self {
            name: name.into(),
            agent,
            runner: Runner::default(),
            map,
            _output: PhantomData,
        }
    }
}

#[async_trait]
impl<T, F> InputGuardrail for AgentGuardrail<T, F>
where
    T: DeserializeOwned + Serialize + Send + 'static,
    F: Fn(&T) -> Option<String> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, input: &str) -> Result<GuardrailOutput, RunError> {
        let result = match self.runner.run(&self.agent, input).await? {
            RunOutcome::Completed(result) => result,
            RunOutcome::Blocked(tripped) => {
                return Err(RunError::Guardrail {
                    guardrail: self.name.clone(),
                    reason: format!("classifier input was blocked: {tripped}"),
                });
            }
        };
        let verdict: T = result.final_output_as().map_err(|err| {
            RunError::Guardrail {
                guardrail: self.name.clone(),
                reason: err.to_string(),
            }
        })?;

        let message = (self.map)(&verdict);
        let output_info = serde_json::to_value(&verdict).unwrap_or_default();
        debug!(
            "guardrail `{}` verdict: {output_info}, tripped: {}",
            self.name,
            message.is_some()
        );
        Ok(GuardrailOutput::from_message(output_info, message))
    }
}
