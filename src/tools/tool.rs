//! Tool trait definition
//!
//! All tools implement this trait to provide a consistent interface.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{ContextVariables, RunError, RunResult};
use crate::llm::ToolSchema;

/// Uniform outcome of running one tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Human-readable status, appended to history
    pub value: String,

    /// Agent to hand control to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    /// Context variable updates to merge after the batch
    #[serde(default)]
    pub context_variables: ContextVariables,
}

impl ToolResult {
    /// Create a result with a status value
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            agent: None,
            context_variables: ContextVariables::new(),
        }
    }

    /// Create a handoff result for an agent name
    pub fn handoff(agent: impl Into<String>) -> Self {
        let agent = agent.into();
        Self {
            value: format!(
                "Transferred to {agent}. If you are {agent}, please handle the user request."
            ),
            agent: Some(agent),
            context_variables: ContextVariables::new(),
        }
    }

    /// Set the handoff target
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Add a context variable update
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context_variables.set(key, value);
        self
    }
}

/// Raw value returned by a tool before coercion into a [`ToolResult`]
pub enum ToolOutput {
    /// Plain string
    Text(String),
    /// Handoff to the named agent
    Agent(String),
    /// Already a structured result
    Result(ToolResult),
    /// Structured JSON, rendered compactly (strings unquoted)
    Json(Value),
    /// Any displayable value; a formatting failure is fatal for the run
    Display(Box<dyn fmt::Display + Send + Sync>),
}

impl ToolOutput {
    /// Wrap a displayable value
    pub fn display<T: fmt::Display + Send + Sync + 'static>(value: T) -> Self {
        ToolOutput::Display(Box::new(value))
    }

    /// Coerce into a [`ToolResult`]
    ///
    /// `tool` names the producing tool in the error raised when stringification fails.
    pub fn into_result(self, tool: &str) -> RunResult<ToolResult> {
        match self {
            ToolOutput::Result(result) => Ok(result),
            ToolOutput::Agent(agent) => Ok(ToolResult::handoff(agent)),
            ToolOutput::Text(text) => Ok(ToolResult::new(text)),
            ToolOutput::Json(Value::String(text)) => Ok(ToolResult::new(text)),
            ToolOutput::Json(value) => serde_json::to_string(&value)
                .map(ToolResult::new)
                .map_err(|e| RunError::Stringify {
                    tool: tool.to_string(),
                    cause: e.to_string(),
                }),
            ToolOutput::Display(value) => {
                let mut rendered = String::new();
                write!(rendered, "{}", value).map_err(|e| RunError::Stringify {
                    tool: tool.to_string(),
                    cause: e.to_string(),
                })?;
                Ok(ToolResult::new(rendered))
            }
        }
    }
}

impl fmt::Debug for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolOutput::Text(s) => f.debug_tuple("Text").field(s).finish(),
            ToolOutput::Agent(a) => f.debug_tuple("Agent").field(a).finish(),
            ToolOutput::Result(r) => f.debug_tuple("Result").field(r).finish(),
            ToolOutput::Json(v) => f.debug_tuple("Json").field(v).finish(),
            ToolOutput::Display(_) => f.write_str("Display(..)"),
        }
    }
}

impl From<String> for ToolOutput {
    fn from(value: String) -> Self {
        ToolOutput::Text(value)
    }
}

impl From<&str> for ToolOutput {
    fn from(value: &str) -> Self {
        ToolOutput::Text(value.to_string())
    }
}

impl From<ToolResult> for ToolOutput {
    fn from(value: ToolResult) -> Self {
        ToolOutput::Result(value)
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        ToolOutput::Json(value)
    }
}

/// Trait for tools that agents can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of this tool
    fn name(&self) -> &str;

    /// Get the documentation string shown to the model
    fn description(&self) -> &str;

    /// JSON schema of the tool's arguments
    fn parameters(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    /// Get the schema advertised to the completion adapter
    fn definition(&self) -> ToolSchema {
        ToolSchema::new(self.name(), self.description()).with_parameters(self.parameters())
    }

    /// Execute the tool
    ///
    /// `context` is the run's context variables, including updates written by earlier
    /// tools in the same batch.
    async fn execute(&self, input: &Value, context: &ContextVariables) -> Result<ToolOutput>;
}

type ToolFn = dyn Fn(&Value, &ContextVariables) -> Result<ToolOutput> + Send + Sync;

/// Tool backed by a closure
///
/// ```ignore
/// let weather = FnTool::new("get_weather", "Get the weather for a location", |args, _ctx| {
///     let location = args["location"].as_str().unwrap_or("unknown");
///     Ok(format!("{{'location': '{location}', 'temp': 67}}").into())
/// });
/// ```
#[derive(Clone)]
pub struct FnTool {
    name: String,
    description: String,
    parameters: Value,
    func: Arc<ToolFn>,
}

impl FnTool {
    /// Create a tool from a closure
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value, &ContextVariables) -> Result<ToolOutput> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
            func: Arc::new(func),
        }
    }

    /// Set the argument schema
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        self.parameters.clone()
    }

    async fn execute(&self, input: &Value, context: &ContextVariables) -> Result<ToolOutput> {
        (self.func)(input, context)
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish()
    }
}
