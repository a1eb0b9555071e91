//! Ready-made agents that talk to an Azure OpenAI deployment: a plain
//! assistant, a research assistant with tools, an education assistant
//! behind input guardrails, and a triage agent that hands questions off
//! to subject tutors.
//!
//! Each agent has a matching binary. You can also use the crate as a
//! library and plug the agents into your own runner, or into a fake model
//! for testing.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod agents;
#[cfg(feature = "cli")]
pub mod cli;
pub mod expr;
pub mod guardrails;
mod settings;
pub mod tools;

pub use settings::{MissingVariable, Settings};

/// Re-exports of [`azure_agents_core`] crate.
pub mod core {
    pub use azure_agents_core::*;
}
