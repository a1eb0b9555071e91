//! Provider-neutral protocol between agents and chat models.
//!
//! An agent talks to a model only through the types defined here: it
//! builds a [`ModelRequest`], hands it to a [`ModelProvider`], and pulls
//! [`ModelResponseEvent`]s out of the returned [`ModelResponse`]. The
//! Azure OpenAI client and the scripted test model both implement this
//! protocol, which is what lets the agent runner stay unaware of the
//! transport.
//!
//! Nothing here performs I/O.

#![deny(missing_docs)]

mod error;
mod opaque;
mod provider;
mod request;
mod response;

pub use error::*;
pub use opaque::*;
pub use provider::*;
pub use request::*;
pub use response::*;
