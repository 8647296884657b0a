//! Response normalizer
//!
//! Turns whatever an adapter returned into exactly one [`Message`]:
//! - complete responses via [`normalize`]
//! - streamed deltas via [`StreamAccumulator`]

use std::collections::BTreeMap;

use serde_json::Value;

use super::types::{CompletionDelta, RawAction, RawCompletion};
use crate::core::{Message, RunError, RunResult, ToolInvocation};

/// Convert a complete adapter response into a message from `sender`
pub fn normalize(raw: RawCompletion, sender: &str) -> Message {
    match raw {
        RawCompletion::Empty => Message::empty_assistant(sender),
        RawCompletion::Reply(text) => Message::assistant(sender, text),
        RawCompletion::Action(action) => {
            Message::assistant_with_tool_calls(sender, vec![action_to_invocation(0, action)])
        }
        RawCompletion::Actions(actions) => Message::assistant_with_tool_calls(
            sender,
            actions
                .into_iter()
                .enumerate()
                .map(|(index, action)| action_to_invocation(index, action))
                .collect(),
        ),
    }
}

/// Id given to a call the provider left unnamed; depends only on its position
fn positional_id(index: usize) -> String {
    format!("call_{}", index)
}

fn action_to_invocation(index: usize, action: RawAction) -> ToolInvocation {
    match action {
        RawAction::Transfer { agent_id } => {
            ToolInvocation::transfer(agent_id).with_id(positional_id(index))
        }
        RawAction::Call {
            id,
            name,
            arguments,
        } => {
            let arguments = match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            };
            let id = id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| positional_id(index));
            ToolInvocation::new(name, arguments).with_id(id)
        }
    }
}

#[derive(Debug, Default, Clone)]
struct PartialToolCall {
    id: String,
    call_type: String,
    name: String,
    arguments: String,
}

/// Folds streamed deltas into one logical message
///
/// Text fragments are concatenated in arrival order. Tool call fragments are keyed by
/// their index: `name` and `arguments` fragments concatenate, while `id` and `type` are
/// replaced only by non-empty values. Arguments stay raw text until [`finish`](Self::finish).
#[derive(Debug, Default, Clone)]
pub struct StreamAccumulator {
    content: String,
    tool_calls: BTreeMap<usize, PartialToolCall>,
    deltas: usize,
}

impl StreamAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one delta into the accumulated state
    pub fn push(&mut self, delta: &CompletionDelta) {
        self.deltas += 1;

        if let Some(text) = &delta.content {
            self.content.push_str(text);
        }

        for fragment in &delta.tool_calls {
            let entry = self.tool_calls.entry(fragment.index).or_default();
            if let Some(id) = fragment.id.as_deref().filter(|s| !s.is_empty()) {
                entry.id = id.to_string();
            }
            if let Some(call_type) = fragment.call_type.as_deref().filter(|s| !s.is_empty()) {
                entry.call_type = call_type.to_string();
            }
            if let Some(name) = &fragment.name {
                entry.name.push_str(name);
            }
            if let Some(arguments) = &fragment.arguments {
                entry.arguments.push_str(arguments);
            }
        }
    }

    /// Text accumulated so far
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of deltas folded so far
    pub fn delta_count(&self) -> usize {
        self.deltas
    }

    /// Number of distinct tool calls seen so far
    pub fn tool_call_count(&self) -> usize {
        self.tool_calls.len()
    }

    /// Finish the fold and build the message
    ///
    /// Argument payloads are parsed here; an empty payload becomes `{}`. Calls that never
    /// received an id are named after their index.
    pub fn finish(self, sender: &str) -> RunResult<Message> {
        let mut tool_calls = Vec::with_capacity(self.tool_calls.len());

        for (index, partial) in self.tool_calls {
            let raw = partial.arguments.trim();
            let arguments: Value = if raw.is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(raw).map_err(|source| RunError::MalformedArguments {
                    index,
                    tool: partial.name.clone(),
                    source,
                })?
            };

            let id = if partial.id.is_empty() {
                positional_id(index)
            } else {
                partial.id
            };
            let mut invocation = ToolInvocation::new(partial.name, arguments).with_id(id);
            if !partial.call_type.is_empty() {
                invocation.call_type = partial.call_type;
            }
            tool_calls.push(invocation);
        }

        let mut message = Message::assistant_with_tool_calls(sender, tool_calls);
        if !self.content.is_empty() {
            message.content = Some(self.content);
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Role;
    use crate::llm::ToolCallDelta;
    use serde_json::json;

    #[test]
    fn test_reply_normalizes_to_text() {
        let msg = normalize(RawCompletion::Reply("Hi there".into()), "Agent");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.text(), Some("Hi there"));
        assert!(msg.tool_calls.is_empty());
        assert_eq!(msg.sender.as_deref(), Some("Agent"));
    }

    #[test]
    fn test_empty_normalizes_to_nothing() {
        let msg = normalize(RawCompletion::Empty, "Agent");
        assert!(msg.content.is_none());
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn test_actions_keep_order() {
        let raw = RawCompletion::Actions(vec![
            RawAction::call("process_refund", json!({"item_id": "item_1"})),
            RawAction::transfer(1),
            RawAction::Call {
                id: Some("call_x".into()),
                name: "apply_discount".into(),
                arguments: Value::Null,
            },
        ]);
        let msg = normalize(raw, "Refunds Agent");

        assert!(msg.content.is_none());
        let names: Vec<_> = msg.tool_calls.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["process_refund", "TransferToAgent", "apply_discount"]);
        assert_eq!(msg.tool_calls[1].arguments, json!({"agent_id": 1}));
        assert_eq!(msg.tool_calls[2].id, "call_x");
        assert_eq!(msg.tool_calls[2].arguments, json!({}));
    }

    #[test]
    fn test_single_action() {
        let msg = normalize(RawCompletion::Action(RawAction::transfer(2)), "Triage");
        assert_eq!(msg.tool_calls.len(), 1);
        assert!(msg.tool_calls[0].is_transfer());
    }

    #[test]
    fn test_stream_text_concatenates() {
        let mut acc = StreamAccumulator::new();
        acc.push(&CompletionDelta::text("Hel").with_role(Role::Assistant));
        acc.push(&CompletionDelta::text("lo"));
        acc.push(&CompletionDelta::default());
        assert_eq!(acc.content(), "Hello");
        assert_eq!(acc.delta_count(), 3);

        let msg = acc.finish("Agent").unwrap();
        assert_eq!(msg.text(), Some("Hello"));
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn test_stream_tool_fragments_merge_by_index() {
        let mut acc = StreamAccumulator::new();
        acc.push(&CompletionDelta::tool_call(
            ToolCallDelta::new(0).with_id("call_a").with_type("function").with_name("get_"),
        ));
        acc.push(&CompletionDelta::tool_call(
            ToolCallDelta::new(1).with_id("call_b").with_name("apply_discount"),
        ));
        acc.push(&CompletionDelta::tool_call(
            ToolCallDelta::new(0).with_name("weather").with_arguments("{\"locat"),
        ));
        // Empty scalar values never clobber earlier ones
        acc.push(&CompletionDelta::tool_call(
            ToolCallDelta::new(0).with_id("").with_type("").with_arguments("ion\": \"NYC\"}"),
        ));
        assert_eq!(acc.tool_call_count(), 2);

        let msg = acc.finish("Agent").unwrap();
        assert!(msg.content.is_none());
        assert_eq!(msg.tool_calls[0].id, "call_a");
        assert_eq!(msg.tool_calls[0].name, "get_weather");
        assert_eq!(msg.tool_calls[0].call_type, "function");
        assert_eq!(msg.tool_calls[0].arguments, json!({"location": "NYC"}));
        assert_eq!(msg.tool_calls[1].name, "apply_discount");
        assert_eq!(msg.tool_calls[1].arguments, json!({}));
    }

    #[test]
    fn test_stream_fold_is_segmentation_invariant() {
        let payload = r#"{"item_id": "item_42", "reason": "too expensive", "n": [1, 2]}"#;
        let expected = {
            let mut acc = StreamAccumulator::new();
            acc.push(&CompletionDelta::tool_call(
                ToolCallDelta::new(0)
                    .with_id("call_1")
                    .with_name("process_refund")
                    .with_arguments(payload),
            ));
            acc.finish("Refunds Agent").unwrap()
        };

        let chars: Vec<char> = payload.chars().collect();
        for a in 0..=chars.len() {
            for b in a..=chars.len() {
                let parts = [
                    chars[..a].iter().collect::<String>(),
                    chars[a..b].iter().collect::<String>(),
                    chars[b..].iter().collect::<String>(),
                ];
                let mut acc = StreamAccumulator::new();
                acc.push(&CompletionDelta::tool_call(
                    ToolCallDelta::new(0).with_id("call_1").with_name("process_"),
                ));
                acc.push(&CompletionDelta::tool_call(ToolCallDelta::new(0).with_name("refund")));
                for part in &parts {
                    acc.push(&CompletionDelta::tool_call(
                        ToolCallDelta::new(0).with_arguments(part.clone()),
                    ));
                }
                assert_eq!(acc.finish("Refunds Agent").unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_stream_fold_without_ids_is_deterministic() {
        let whole = {
            let mut acc = StreamAccumulator::new();
            acc.push(&CompletionDelta::tool_call(
                ToolCallDelta::new(5).with_name("lookup").with_arguments("{\"q\": 1}"),
            ));
            acc.finish("Agent").unwrap()
        };
        let split = {
            let mut acc = StreamAccumulator::new();
            acc.push(&CompletionDelta::tool_call(
                ToolCallDelta::new(5).with_name("look").with_arguments("{\"q\""),
            ));
            acc.push(&CompletionDelta::tool_call(
                ToolCallDelta::new(5).with_name("up").with_arguments(": 1}"),
            ));
            acc.finish("Agent").unwrap()
        };

        assert_eq!(whole, split);
        assert_eq!(whole.tool_calls[0].id, "call_5");
    }

    #[test]
    fn test_unnamed_actions_get_positional_ids() {
        let raw = RawCompletion::Actions(vec![
            RawAction::call("lookup", json!({"q": 1})),
            RawAction::transfer(1),
        ]);
        let first = normalize(raw.clone(), "Agent");
        let second = normalize(raw, "Agent");

        assert_eq!(first, second);
        assert_eq!(first.tool_calls[0].id, "call_0");
        assert_eq!(first.tool_calls[1].id, "call_1");
    }

    #[test]
    fn test_stream_malformed_arguments() {
        let mut acc = StreamAccumulator::new();
        acc.push(&CompletionDelta::tool_call(
            ToolCallDelta::new(3).with_name("lookup").with_arguments("{\"q\": "),
        ));
        match acc.finish("Agent") {
            Err(RunError::MalformedArguments { index, tool, .. }) => {
                assert_eq!(index, 3);
                assert_eq!(tool, "lookup");
            }
            other => panic!("Expected MalformedArguments, got {:?}", other),
        }
    }

    #[test]
    fn test_stream_mixed_content_and_tools() {
        let mut acc = StreamAccumulator::new();
        acc.push(&CompletionDelta::text("Checking"));
        acc.push(&CompletionDelta::tool_call(
            ToolCallDelta::new(0).with_name("lookup").with_arguments("{}"),
        ));
        let msg = acc.finish("Agent").unwrap();
        assert_eq!(msg.text(), Some("Checking"));
        assert_eq!(msg.tool_calls.len(), 1);
    }
}
