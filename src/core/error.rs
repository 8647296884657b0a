//! Runtime error types

use thiserror::Error;

/// Errors that abort a run
///
/// Recoverable conditions (unknown tool names, retried step completions) never surface
/// here; they are narrated into the history instead.
#[derive(Error, Debug)]
pub enum RunError {
    /// The completion adapter failed
    #[error("Completion failed: {0}")]
    Adapter(#[source] anyhow::Error),

    /// An agent name could not be resolved in the registry
    #[error("Agent not found: {0}")]
    UnknownAgent(String),

    /// A positional handoff did not match the active agent's handoff list
    #[error("Handoff index {index} out of range for agent '{agent}' ({available} handoff targets)")]
    HandoffOutOfRange {
        /// Agent that requested the transfer
        agent: String,
        /// 1-based index requested by the model
        index: i64,
        /// Number of handoff targets the agent has
        available: usize,
    },

    /// A tool returned a value that could not be rendered as a string
    #[error("Failed to cast result of tool '{tool}' to string: {cause}")]
    Stringify {
        /// Tool name
        tool: String,
        /// Underlying cause
        cause: String,
    },

    /// A tool failed while executing
    #[error("Tool '{tool}' failed: {source}")]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Underlying error
        #[source]
        source: anyhow::Error,
    },

    /// Streamed tool arguments did not reassemble into valid JSON
    #[error("Tool call at index {index} ('{tool}') has invalid arguments: {source}")]
    MalformedArguments {
        /// Position of the tool call in the streamed message
        index: usize,
        /// Tool name
        tool: String,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },
}

impl RunError {
    /// Wrap an adapter error
    pub fn adapter(err: impl Into<anyhow::Error>) -> Self {
        RunError::Adapter(err.into())
    }

    /// Create a tool failure
    pub fn tool_failed(tool: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        RunError::ToolFailed {
            tool: tool.into(),
            source: source.into(),
        }
    }
}

/// Result type alias for runtime operations
pub type RunResult<T> = Result<T, RunError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RunError::UnknownAgent("Sales Agent".into());
        assert_eq!(err.to_string(), "Agent not found: Sales Agent");

        let err = RunError::HandoffOutOfRange {
            agent: "Triage".into(),
            index: 4,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Handoff index 4 out of range for agent 'Triage' (2 handoff targets)"
        );
    }

    #[test]
    fn test_stringify_names_tool() {
        let err = RunError::Stringify {
            tool: "lookup".into(),
            cause: "an error occurred when formatting an argument".into(),
        };
        assert!(err.to_string().contains("'lookup'"));
    }

    #[test]
    fn test_error_from_anyhow() {
        let err = RunError::adapter(anyhow::anyhow!("connection reset"));
        assert!(matches!(err, RunError::Adapter(_)));
        assert_eq!(err.to_string(), "Completion failed: connection reset");
    }
}
