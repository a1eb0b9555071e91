//! Tools for the research assistant.

mod calculate;
mod search;
mod weather;

pub use calculate::{CalculateParameters, CalculateTool};
pub use search::{SearchQuery, SearchWebParameters, SearchWebTool};
pub use weather::{FetchWeatherParameters, FetchWeatherTool, Location};
