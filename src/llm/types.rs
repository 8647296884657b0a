//! Completion adapter wire types
//!
//! Provider-neutral shapes exchanged with a [`CompletionAdapter`](super::CompletionAdapter).
//! Adapters translate their provider's format into these; the runtime never looks past
//! them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{Message, Role};

// ============================================================================
// Request Types
// ============================================================================

/// Tool schema advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name
    pub name: String,

    /// Documentation string
    pub description: String,

    /// JSON schema for the arguments
    pub parameters: Value,
}

impl ToolSchema {
    /// Create a schema with an empty object parameter list
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Set the parameter schema
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// One completion request
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,

    /// Conversation history
    pub messages: Vec<Message>,

    /// Rendered system instructions
    pub system: String,

    /// Tools the model may call
    pub tools: Vec<ToolSchema>,

    /// Tool choice hint forwarded verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,

    /// Extra provider parameters (temperature, etc.)
    pub params: Map<String, Value>,
}

// ============================================================================
// Response Types
// ============================================================================

/// One structured action returned by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawAction {
    /// Transfer to a team agent, by 1-based position in the handoff list
    Transfer {
        /// 1-based handoff position
        agent_id: usize,
    },

    /// Call a named tool
    Call {
        /// Provider call id, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        /// Tool name
        name: String,
        /// Structured arguments
        #[serde(default)]
        arguments: Value,
    },
}

impl RawAction {
    /// Create a named tool call
    pub fn call(name: impl Into<String>, arguments: Value) -> Self {
        RawAction::Call {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    /// Create a transfer action
    pub fn transfer(agent_id: usize) -> Self {
        RawAction::Transfer { agent_id }
    }
}

/// Complete (non-streamed) adapter response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawCompletion {
    /// Nothing to say
    Empty,
    /// Plain text answer
    Reply(String),
    /// A single action object
    Action(RawAction),
    /// A list of action objects
    Actions(Vec<RawAction>),
}

// ============================================================================
// Streaming Types
// ============================================================================

/// Fragment of one tool call inside a streamed delta
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    /// Position of the tool call within the message
    pub index: usize,

    /// Call id; replaces the accumulated id when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Call type; replaces the accumulated type when non-empty
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,

    /// Name fragment, concatenated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Argument payload fragment, concatenated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl ToolCallDelta {
    /// Create an empty fragment for an index
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Set the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the call type
    pub fn with_type(mut self, call_type: impl Into<String>) -> Self {
        self.call_type = Some(call_type.into());
        self
    }

    /// Set the name fragment
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the arguments fragment
    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }
}

/// One incremental fragment of a streamed completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionDelta {
    /// Role, usually only on the first delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Text fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Tool call fragments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallDelta>,
}

impl CompletionDelta {
    /// Create a text delta
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            role: None,
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Create a delta carrying one tool call fragment
    pub fn tool_call(fragment: ToolCallDelta) -> Self {
        Self {
            role: None,
            content: None,
            tool_calls: vec![fragment],
        }
    }

    /// Set the role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_action_deserialization() {
        let action: RawAction =
            serde_json::from_str(r#"{"type": "transfer", "agent_id": 2}"#).unwrap();
        assert_eq!(action, RawAction::transfer(2));

        let action: RawAction =
            serde_json::from_str(r#"{"type": "call", "name": "get_weather", "arguments": {"location": "NYC"}}"#)
                .unwrap();
        assert_eq!(action, RawAction::call("get_weather", json!({"location": "NYC"})));
    }

    #[test]
    fn test_delta_deserialization() {
        let json = r#"{"content": "Hel", "tool_calls": [{"index": 0, "arguments": "{\"a\""}]}"#;
        let delta: CompletionDelta = serde_json::from_str(json).unwrap();
        assert_eq!(delta.content.as_deref(), Some("Hel"));
        assert_eq!(delta.tool_calls[0].index, 0);
        assert!(delta.tool_calls[0].name.is_none());
    }

    #[test]
    fn test_schema_serialization() {
        let schema = ToolSchema::new("apply_discount", "Apply a discount to the user's cart.");
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["parameters"]["type"], "object");
    }
}
