use std::error::Error as StdError;
use std::fmt::{self, Display};

use azure_agents_model::{ErrorKind, ModelProviderError};

/// Errors that abort a run.
///
/// A guardrail blocking the input is not an error, see
/// [`RunOutcome::Blocked`](crate::RunOutcome::Blocked).
#[derive(Debug)]
pub enum RunError {
    /// The model provider failed, after retries if any.
    Model(Box<dyn ModelProviderError>),
    /// The agents kept calling tools past the turn limit.
    MaxTurnsExceeded(usize),
    /// The final output didn't decode into the expected type.
    InvalidOutput {
        /// The agent that produced the output.
        agent: String,
        /// Why decoding failed.
        reason: String,
    },
    /// A guardrail could not reach a verdict.
    Guardrail {
        /// Name of the guardrail.
        guardrail: String,
        /// Why the check failed.
        reason: String,
    },
}

impl RunError {
    /// Returns the provider error kind when the model failed.
    pub fn model_error_kind(&self) -> Option<ErrorKind> {
        match self {
            RunError::Model(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Model(err) => write!(f, "model request failed: {err}"),
            RunError::MaxTurnsExceeded(max_turns) => {
                write!(f, "max turns ({max_turns}) exceeded")
            }
            RunError::InvalidOutput { agent, reason } => {
                write!(f, "invalid output from `{agent}`: {reason}")
            }
            RunError::Guardrail { guardrail, reason } => {
                write!(f, "guardrail `{guardrail}` failed: {reason}")
            }
        }
    }
}

impl StdError for RunError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            RunError::Model(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
