//! Normalized conversation messages

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the reserved invocation that transfers control to a team agent
pub const TRANSFER_TOOL_NAME: &str = "TransferToAgent";

/// Role of a message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Human input
    User,
    /// Model output
    Assistant,
    /// Tool output
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

fn default_call_type() -> String {
    "function".to_string()
}

/// A single tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Call id (provider supplied or generated)
    pub id: String,

    /// Call type, normally "function"
    #[serde(rename = "type", default = "default_call_type")]
    pub call_type: String,

    /// Tool name
    pub name: String,

    /// Structured arguments, opaque to the runtime
    pub arguments: Value,
}

impl ToolInvocation {
    /// Create a function invocation with a generated id
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            call_type: default_call_type(),
            name: name.into(),
            arguments,
        }
    }

    /// Create the reserved transfer invocation for a 1-based handoff position
    pub fn transfer(agent_id: usize) -> Self {
        Self::new(TRANSFER_TOOL_NAME, serde_json::json!({ "agent_id": agent_id }))
    }

    /// Override the call id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Whether this invocation is a handoff directive rather than a named tool
    pub fn is_transfer(&self) -> bool {
        self.name == TRANSFER_TOOL_NAME
    }
}

/// One utterance in the run history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Producing agent's name, absent for user input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Author role
    pub role: Role,

    /// Text content
    #[serde(default)]
    pub content: Option<String>,

    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolInvocation>,

    /// Tool that produced a tool-role message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Invocation a tool-role message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: None,
            role: Role::User,
            content: Some(text.into()),
            tool_calls: Vec::new(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    /// Create an assistant text message
    pub fn assistant(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            role: Role::Assistant,
            content: Some(text.into()),
            tool_calls: Vec::new(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    /// Create an assistant message with no content and no tool calls
    pub fn empty_assistant(sender: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            role: Role::Assistant,
            content: None,
            tool_calls: Vec::new(),
            tool_name: None,
            tool_call_id: None,
        }
    }

    /// Create an assistant message carrying tool calls
    pub fn assistant_with_tool_calls(
        sender: impl Into<String>,
        tool_calls: Vec<ToolInvocation>,
    ) -> Self {
        Self {
            sender: Some(sender.into()),
            role: Role::Assistant,
            content: None,
            tool_calls,
            tool_name: None,
            tool_call_id: None,
        }
    }

    /// Create a tool-role result message
    pub fn tool(
        tool_name: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: None,
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_name: Some(tool_name.into()),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    /// Get the text content, if any
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Check if the message requested tool calls
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}
