//! Agent definition
//!
//! An agent is a named persona: instructions, tools, and the team agents it may
//! transfer to. Handoff targets are stored by name and resolved through an
//! [`AgentRegistry`](super::AgentRegistry), so cyclic teams need no shared ownership.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::core::ContextVariables;
use crate::llm::ToolSchema;
use crate::tools::{Tool, ToolSet};

type InstructionFn = dyn Fn(&ContextVariables) -> String + Send + Sync;

/// Agent instructions: static text or generated from context variables
#[derive(Clone)]
pub enum Instructions {
    /// Fixed text
    Static(String),
    /// Rendered per completion from the current context variables
    Dynamic(Arc<InstructionFn>),
}

impl Instructions {
    /// Create dynamic instructions from a closure
    pub fn dynamic<F>(func: F) -> Self
    where
        F: Fn(&ContextVariables) -> String + Send + Sync + 'static,
    {
        Instructions::Dynamic(Arc::new(func))
    }

    /// Render against the current context
    ///
    /// Generators read unknown keys as "" through [`ContextVariables::get_str`].
    pub fn render(&self, context: &ContextVariables) -> String {
        match self {
            Instructions::Static(text) => text.clone(),
            Instructions::Dynamic(func) => func(context),
        }
    }
}

impl From<&str> for Instructions {
    fn from(value: &str) -> Self {
        Instructions::Static(value.to_string())
    }
}

impl From<String> for Instructions {
    fn from(value: String) -> Self {
        Instructions::Static(value)
    }
}

impl fmt::Debug for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instructions::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Instructions::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A named persona with instructions, tools, and handoff targets
///
/// ```ignore
/// let triage = Agent::new("Triage Agent", "groq/llama-3.1-70b-versatile")
///     .with_instructions("Determine which agent is best suited to handle the request.")
///     .with_handoff("Sales Agent")
///     .with_handoff("Refunds Agent")
///     .with_param("temperature", 0.2);
/// ```
#[derive(Clone)]
pub struct Agent {
    /// Identity, used in transcripts and for self-reference in instructions
    pub name: String,

    /// Model identifier
    pub model: String,

    /// Instructions
    pub instructions: Instructions,

    /// Callable tools, in order
    pub tools: ToolSet,

    /// Names of agents this agent may transfer to, in order (positions are 1-based
    /// in transfer directives)
    pub handoffs: Vec<String>,

    /// Tool choice hint forwarded to the adapter
    pub tool_choice: Option<String>,

    /// Free-form completion parameters
    pub completion_args: Map<String, Value>,
}

impl Agent {
    /// Create an agent with default instructions
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            instructions: Instructions::Static("You are a helpful agent.".to_string()),
            tools: ToolSet::new(),
            handoffs: Vec::new(),
            tool_choice: None,
            completion_args: Map::new(),
        }
    }

    /// Set the instructions
    pub fn with_instructions(mut self, instructions: impl Into<Instructions>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Generate instructions from context variables
    pub fn with_instructions_fn<F>(mut self, func: F) -> Self
    where
        F: Fn(&ContextVariables) -> String + Send + Sync + 'static,
    {
        self.instructions = Instructions::dynamic(func);
        self
    }

    /// Add a tool
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    /// Add a handoff target by name
    pub fn with_handoff(mut self, agent: impl Into<String>) -> Self {
        self.handoffs.push(agent.into());
        self
    }

    /// Set the tool choice hint
    pub fn with_tool_choice(mut self, choice: impl Into<String>) -> Self {
        self.tool_choice = Some(choice.into());
        self
    }

    /// Add a completion parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.completion_args.insert(key.into(), value.into());
        self
    }

    /// Resolve a 1-based handoff position
    pub fn handoff_target(&self, position: i64) -> Option<&str> {
        if position < 1 {
            return None;
        }
        self.handoffs
            .get((position - 1) as usize)
            .map(|name| name.as_str())
    }

    /// Team listing as (1-based position, name) pairs
    pub fn team(&self) -> Vec<(usize, &str)> {
        self.handoffs
            .iter()
            .enumerate()
            .map(|(i, name)| (i + 1, name.as_str()))
            .collect()
    }

    /// Tool schemas advertised to the model, including the transfer directive when
    /// the agent has handoff targets
    pub fn tool_schemas(&self) -> Vec<ToolSchema> {
        let mut schemas = self.tools.definitions();
        if !self.handoffs.is_empty() {
            let team = self
                .team()
                .iter()
                .map(|(id, name)| format!("{}: {}", id, name))
                .collect::<Vec<_>>()
                .join(", ");
            schemas.push(
                ToolSchema::new(
                    crate::core::TRANSFER_TOOL_NAME,
                    format!("Transfer to team agent ({})", team),
                )
                .with_parameters(serde_json::json!({
                    "type": "object",
                    "properties": {
                        "agent_id": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": self.handoffs.len(),
                            "description": "agent_id of the team agent"
                        }
                    },
                    "required": ["agent_id"]
                })),
            );
        }
        schemas
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("instructions", &self.instructions)
            .field("tools", &self.tools)
            .field("handoffs", &self.handoffs)
            .field("tool_choice", &self.tool_choice)
            .field("completion_args", &self.completion_args)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FnTool;

    #[test]
    fn test_agent_defaults() {
        let agent = Agent::new("Agent", "groq/llama-3.3-70b-versatile");
        assert!(agent.tools.is_empty());
        assert!(agent.handoffs.is_empty());
        assert_eq!(
            agent.instructions.render(&ContextVariables::new()),
            "You are a helpful agent."
        );
    }

    #[test]
    fn test_dynamic_instructions_default_to_empty() {
        let agent = Agent::new("Agent", "m").with_instructions_fn(|ctx| {
            format!("Greet the user by name ({}).", ctx.get_str("name"))
        });
        assert_eq!(
            agent.instructions.render(&ContextVariables::new().with("name", "James")),
            "Greet the user by name (James)."
        );
        assert_eq!(
            agent.instructions.render(&ContextVariables::new()),
            "Greet the user by name ()."
        );
    }

    #[test]
    fn test_handoff_positions_are_one_based() {
        let agent = Agent::new("Triage", "m")
            .with_handoff("Sales Agent")
            .with_handoff("Refunds Agent");
        assert_eq!(agent.handoff_target(1), Some("Sales Agent"));
        assert_eq!(agent.handoff_target(2), Some("Refunds Agent"));
        assert_eq!(agent.handoff_target(0), None);
        assert_eq!(agent.handoff_target(3), None);
        assert_eq!(agent.handoff_target(-1), None);
    }

    #[test]
    fn test_tool_schemas_include_transfer() {
        let agent = Agent::new("Triage", "m")
            .with_tool(FnTool::new("lookup", "Look things up", |_, _| Ok("ok".into())));
        assert_eq!(agent.tool_schemas().len(), 1);

        let agent = agent.with_handoff("Sales Agent");
        let schemas = agent.tool_schemas();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[1].name, "TransferToAgent");
        assert!(schemas[1].description.contains("1: Sales Agent"));
    }
}
