use std::collections::HashMap;
use std::future::ready;
use std::pin::Pin;

use azure_agents_model::{ModelTool, ToolCallRequest};
use tracing::Instrument;

use crate::tool::{Error, ToolObject, ToolResult};

/// An executor that handles tool call requests from the model.
pub struct Executor {
    // Declaration order, so definitions are sent in a stable order.
    tools: Vec<Box<dyn ToolObject>>,
    index: HashMap<String, usize>,
}

impl Executor {
    pub fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut index = HashMap::with_capacity(tools.len());
        for (idx, tool) in tools.iter().enumerate() {
            if index.insert(tool.name().to_owned(), idx).is_some() {
                warn!("tool `{}` registered twice, the last one wins", tool.name());
            }
        }
        Self { tools, index }
    }

    #[inline]
    pub fn definitions(&self) -> impl Iterator<Item = ModelTool> + '_ {
        self.tools.iter().map(|tool| tool.definition())
    }

    /// Starts the tool named in the request.
    ///
    /// A request for an unknown tool yields a `NotFound` error instead of
    /// being dropped, since every tool call needs a result.
    pub fn execute(
        &self,
        req: ToolCallRequest,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let Some(tool) = self.index.get(&req.name).map(|idx| &self.tools[*idx])
        else {
            warn!("tool not found: {}", req.name);
            let err = Error::not_found().with_reason(format!(
                "no tool named `{}` is available",
                req.name
            ));
            return Box::pin(ready(Err(err)));
        };
        let ToolCallRequest { id, name, arguments } = req;
        trace!("running a tool ({id}) with args: {arguments:?}");
        Box::pin(
            tool.execute(arguments)
                .instrument(debug_span!("tool", %name, %id)),
        )
    }
}
