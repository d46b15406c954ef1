//! Collections of tools offered to a model together.

use std::sync::Arc;

use super::base_tool::BaseTool;

/// A set of tools a model may pick from.
#[async_trait::async_trait]
pub trait BaseToolset: Send + Sync {
    async fn get_tools(&self) -> Vec<Arc<dyn BaseTool>>;

    /// Releases any resources the toolset holds. In-memory sets do nothing.
    async fn close(&self) {}
}

/// In-memory list of tools.
#[derive(Default, Clone)]
pub struct SimpleToolset {
    tools: Vec<Arc<dyn BaseTool>>,
}

impl SimpleToolset {
    pub fn new(tools: Vec<Arc<dyn BaseTool>>) -> Self {
        Self { tools }
    }

    #[must_use]
    pub fn with_tool(mut self, tool: Arc<dyn BaseTool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Looks a tool up by the name the model used.
    pub fn find(&self, name: &str) -> Option<Arc<dyn BaseTool>> {
        self.tools.iter().find(|tool| tool.name() == name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[async_trait::async_trait]
impl BaseToolset for SimpleToolset {
    async fn get_tools(&self) -> Vec<Arc<dyn BaseTool>> {
        self.tools.clone()
    }
}
