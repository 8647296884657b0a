//! Reasoning steps exchanged with the model in step-wise mode

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::core::Message;

/// What the model wants to do after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    /// Another step follows
    Continue,
    /// This step carries the final answer
    FinalStep,
}

/// One reasoning step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Short description of the step
    pub title: String,

    /// Reasoning text
    pub content: String,

    /// Whether the loop continues
    pub next_action: NextAction,

    /// Tool to call, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Tool input (object or plain string)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_input: Option<Value>,
}

impl Step {
    /// Create a `continue` step
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            next_action: NextAction::Continue,
            tool_name: None,
            tool_input: None,
        }
    }

    /// Create a `final_step` step
    pub fn final_step(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            next_action: NextAction::FinalStep,
            ..Self::new(title, content)
        }
    }

    /// Attach a tool call
    pub fn with_tool(mut self, name: impl Into<String>, input: Value) -> Self {
        self.tool_name = Some(name.into());
        self.tool_input = Some(input);
        self
    }

    /// Terminal step reporting that no valid completion could be obtained
    pub fn error(attempts: u32, cause: &str) -> Self {
        Self::final_step(
            "Error",
            format!(
                "Failed to generate a step after {} attempts. Error: {}",
                attempts, cause
            ),
        )
    }

    /// Corrective step for a tool the active agent does not have
    pub fn wrong_tool(name: &str, available: &[&str]) -> Self {
        let available = if available.is_empty() {
            "none".to_string()
        } else {
            available.join(", ")
        };
        Self::new(
            "Wrong tool",
            format!(
                "Tool '{}' does not exist. Available tools: {}. Choose one of them or answer directly.",
                name, available
            ),
        )
    }

    /// Check if this step ends the run
    pub fn is_final(&self) -> bool {
        self.next_action == NextAction::FinalStep
    }

    /// Name of the requested tool, ignoring blank names
    pub fn tool(&self) -> Option<&str> {
        self.tool_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Tool input as a JSON object
    ///
    /// A string input becomes `{"input": ...}`; a missing input becomes `{}`.
    pub fn tool_arguments(&self) -> Value {
        match &self.tool_input {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(Value::Object(map)) => Value::Object(map.clone()),
            Some(other) => json!({ "input": other }),
        }
    }

    /// Parse a step from model output
    ///
    /// Tolerates surrounding whitespace and a markdown code fence.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(strip_fence(text))
    }

    /// Serialize as the JSON the model is asked to produce
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.content.clone())
    }

    /// Render as an assistant message from `sender`
    pub fn to_message(&self, sender: &str) -> Message {
        Message::assistant(sender, self.to_json())
    }
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
