//! Run outputs: the terminal response and the events streamed while a run progresses

use serde::{Deserialize, Serialize};

use super::context::ContextVariables;
use super::message::Message;
use crate::llm::CompletionDelta;

/// Terminal result of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Messages appended during this run only (caller-supplied history excluded)
    pub messages: Vec<Message>,

    /// Name of the agent active when the run ended
    pub agent: String,

    /// Context store as committed at the end of the run
    pub context_variables: ContextVariables,
}

impl Response {
    /// Last message of the run, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Text of the last assistant message that carries content
    pub fn final_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.role == super::message::Role::Assistant)
            .find_map(|m| m.text())
    }
}

/// Events yielded by a streaming run
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    // --- Completion framing ---
    /// A streamed completion is starting for `sender`
    Start { sender: String },

    /// One raw delta, yielded before it is folded
    Delta { sender: String, delta: CompletionDelta },

    /// The streamed completion finished
    End,

    // --- History ---
    /// A message was appended to history (assistant or tool)
    Message(Message),

    // --- Completion ---
    /// The run finished
    Response(Response),
}

impl RunEvent {
    /// Check if this is the terminal event
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Response(_))
    }

    /// Text carried by a delta event
    pub fn delta_text(&self) -> Option<&str> {
        match self {
            RunEvent::Delta { delta, .. } => delta.content.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_checks() {
        assert!(RunEvent::Response(Response::default()).is_terminal());
        assert!(!RunEvent::End.is_terminal());

        let delta = RunEvent::Delta {
            sender: "A".into(),
            delta: CompletionDelta::text("he"),
        };
        assert_eq!(delta.delta_text(), Some("he"));
        assert_eq!(RunEvent::Start { sender: "A".into() }.delta_text(), None);
    }

    #[test]
    fn test_final_text_skips_tool_messages() {
        let response = Response {
            messages: vec![
                Message::assistant("A", "done"),
                Message::tool("t", "call_1", "t: => ok"),
            ],
            agent: "A".into(),
            context_variables: ContextVariables::new(),
        };
        assert_eq!(response.final_text(), Some("done"));
        assert_eq!(response.last_message().unwrap().tool_name.as_deref(), Some("t"));
    }
}
