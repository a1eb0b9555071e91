//! Core logic including the agent loop, tool execution, guardrails and
//! handoffs.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod error;
mod guardrail;
mod handoff;
mod model_client;
mod runner;
pub mod tool;

pub use agent::{Agent, AgentBuilder};
pub use error::RunError;
pub use guardrail::{
    AgentGuardrail, GuardrailOutput, GuardrailTripped, InputGuardrail,
};
pub use handoff::{Handoff, HandoffRecord};
pub use model_client::{ModelClient, ModelClientResponse, RetryPolicy};
pub use runner::{RunConfig, RunOutcome, RunResult, Runner};
