//! Ordered tool set owned by an agent

use std::sync::Arc;

use super::tool::Tool;
use crate::llm::ToolSchema;

/// Ordered collection of tools available to one agent
///
/// Order is preserved for schema generation; lookups are by name.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    /// Create an empty tool set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    ///
    /// A tool with the same name replaces the earlier one in place.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register an already shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        match self.tools.iter().position(|t| t.name() == name) {
            Some(pos) => {
                tracing::warn!("[ToolSet] Replacing tool: {}", name);
                self.tools[pos] = tool;
            }
            None => {
                tracing::debug!("[ToolSet] Registering tool: {}", name);
                self.tools.push(tool);
            }
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Get all tool schemas in registration order
    pub fn definitions(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Get the list of tool names in registration order
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Iterate over the tools
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.tool_names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FnTool;

    fn named(name: &str, doc: &str) -> FnTool {
        FnTool::new(name, doc, |_, _| Ok("ok".into()))
    }

    #[test]
    fn test_empty_set() {
        let set = ToolSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(set.get("nonexistent").is_none());
    }

    #[test]
    fn test_order_preserved_and_replace_in_place() {
        let mut set = ToolSet::new();
        set.register(named("process_refund", "Refund an item"));
        set.register(named("apply_discount", "Apply a discount"));
        set.register(named("process_refund", "Refund an item (v2)"));

        assert_eq!(set.tool_names(), vec!["process_refund", "apply_discount"]);
        assert_eq!(set.get("process_refund").unwrap().description(), "Refund an item (v2)");
        assert_eq!(set.definitions()[1].name, "apply_discount");
    }
}
