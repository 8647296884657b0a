//! Tool dispatcher
//!
//! Executes one batch of tool invocations against the active agent:
//! 1. Resolve transfer directives by handoff position
//! 2. Look up named tools in the agent's tool set
//! 3. Coerce return values into [`ToolResult`]s
//! 4. Accumulate context updates and the handoff target for the caller to commit

use serde_json::Value;

use super::tool::{Tool, ToolResult};
use crate::agent::{Agent, AgentRegistry};
use crate::core::{ContextVariables, Message, RunError, RunResult, ToolInvocation};

/// Outcome of one dispatched batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// One tool-role message per invocation, in invocation order
    pub messages: Vec<Message>,

    /// Handoff target; the last handoff in the batch wins
    pub agent: Option<String>,

    /// Context updates accumulated across the batch, later writes winning
    pub context_variables: ContextVariables,
}

/// Sequential, order-preserving tool executor
pub struct ToolDispatcher;

impl ToolDispatcher {
    /// Dispatch a batch of invocations
    ///
    /// Invocations run in order, never in parallel. Each tool sees `context` overlaid
    /// with the updates written by earlier tools of the same batch. Unknown tool names
    /// produce a failure message and the batch continues; every other error aborts the
    /// batch and nothing from it should be committed.
    pub async fn dispatch(
        calls: &[ToolInvocation],
        agent: &Agent,
        registry: &AgentRegistry,
        context: &ContextVariables,
    ) -> RunResult<DispatchOutcome> {
        let mut outcome = DispatchOutcome::default();
        let mut working = context.clone();

        for call in calls {
            tracing::info!("[Dispatcher] {} -> {} ({})", agent.name, call.name, call.id);
            tracing::debug!("[Dispatcher] Arguments: {}", call.arguments);

            let result = if call.is_transfer() {
                Some(Self::resolve_transfer(call, agent, registry)?)
            } else {
                match agent.tools.get(&call.name) {
                    Some(tool) => {
                        Some(Self::run_tool(tool.as_ref(), &call.arguments, &working, registry).await?)
                    }
                    None => None,
                }
            };

            let result = match result {
                Some(result) => result,
                None => {
                    tracing::warn!(
                        "[Dispatcher] Tool '{}' not found for agent '{}'",
                        call.name,
                        agent.name
                    );
                    outcome.messages.push(Message::tool(
                        &call.name,
                        &call.id,
                        format!("{}: => Error: Tool {} not found.", call.name, call.name),
                    ));
                    continue;
                }
            };

            outcome.messages.push(Message::tool(
                &call.name,
                &call.id,
                format!("{}: => {}", call.name, result.value),
            ));

            working.merge(&result.context_variables);
            outcome.context_variables.merge(&result.context_variables);

            if let Some(next) = result.agent {
                if let Some(previous) = &outcome.agent {
                    tracing::warn!(
                        "[Dispatcher] Multiple handoffs in one batch: '{}' replaced by '{}'",
                        previous,
                        next
                    );
                }
                outcome.agent = Some(next);
            }
        }

        tracing::debug!(
            "[Dispatcher] Batch complete: {} messages, {} context updates, handoff={:?}",
            outcome.messages.len(),
            outcome.context_variables.len(),
            outcome.agent
        );

        Ok(outcome)
    }

    /// Execute one tool and coerce its output
    ///
    /// A handoff to an agent missing from `registry` is an error.
    pub async fn run_tool(
        tool: &dyn Tool,
        input: &Value,
        context: &ContextVariables,
        registry: &AgentRegistry,
    ) -> RunResult<ToolResult> {
        let name = tool.name().to_string();
        let output = tool
            .execute(input, context)
            .await
            .map_err(|e| RunError::tool_failed(&name, e))?;

        let result = output.into_result(&name)?;
        if let Some(target) = &result.agent {
            registry.resolve(target)?;
        }

        tracing::debug!("[Dispatcher] Tool {} completed: {}", name, result.value);
        Ok(result)
    }

    fn resolve_transfer(
        call: &ToolInvocation,
        agent: &Agent,
        registry: &AgentRegistry,
    ) -> RunResult<ToolResult> {
        let position = call
            .arguments
            .get("agent_id")
            .and_then(|v| match v {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .unwrap_or(0);

        let target = agent
            .handoff_target(position)
            .ok_or_else(|| RunError::HandoffOutOfRange {
                agent: agent.name.clone(),
                index: position,
                available: agent.handoffs.len(),
            })?;

        let target = registry.resolve(target)?;
        tracing::info!("[Dispatcher] Transfer {} -> {}", agent.name, target.name);
        Ok(ToolResult::handoff(target.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{FnTool, ToolOutput};
    use serde_json::json;

    fn registry_with(agent: Agent) -> AgentRegistry {
        AgentRegistry::new()
            .with_agent(agent)
            .with_agent(Agent::new("B", "m"))
            .with_agent(Agent::new("C", "m"))
    }

    fn writer(name: &str, key: &'static str, value: i64) -> FnTool {
        FnTool::new(name, "writes a key", move |_, _| {
            Ok(ToolResult::new("written").with_context(key, value).into())
        })
    }

    #[tokio::test]
    async fn test_unknown_tool_does_not_abort_batch() {
        let agent = Agent::new("A", "m").with_tool(writer("w", "k", 1));
        let registry = registry_with(agent.clone());
        let calls = vec![
            ToolInvocation::new("missing", json!({})),
            ToolInvocation::new("w", json!({})),
        ];

        let outcome = ToolDispatcher::dispatch(&calls, &agent, &registry, &ContextVariables::new())
            .await
            .unwrap();

        assert_eq!(outcome.messages.len(), 2);
        assert!(outcome.messages[0].text().unwrap().contains("not found"));
        assert_eq!(outcome.messages[0].tool_name.as_deref(), Some("missing"));
        assert_eq!(outcome.messages[1].text(), Some("w: => written"));
        assert_eq!(outcome.context_variables.get("k"), Some(&json!(1)));
        assert!(outcome.agent.is_none());
    }

    #[tokio::test]
    async fn test_later_writes_win_and_are_visible() {
        let reader = FnTool::new("reader", "reads k", |_, ctx| {
            Ok(format!("k={}", ctx.get_str("k")).into())
        });
        let agent = Agent::new("A", "m")
            .with_tool(writer("first", "k", 1))
            .with_tool(reader)
            .with_tool(writer("second", "k", 2));
        let registry = registry_with(agent.clone());
        let calls = vec![
            ToolInvocation::new("first", json!({})),
            ToolInvocation::new("reader", json!({})),
            ToolInvocation::new("second", json!({})),
        ];

        let outcome = ToolDispatcher::dispatch(&calls, &agent, &registry, &ContextVariables::new())
            .await
            .unwrap();

        assert_eq!(outcome.messages[1].text(), Some("reader: => k=1"));
        assert_eq!(outcome.context_variables.get("k"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_transfer_resolves_by_position() {
        let agent = Agent::new("A", "m").with_handoff("B").with_handoff("C");
        let registry = registry_with(agent.clone());

        let outcome = ToolDispatcher::dispatch(
            &[ToolInvocation::transfer(2)],
            &agent,
            &registry,
            &ContextVariables::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.agent.as_deref(), Some("C"));
        assert!(outcome.messages[0].text().unwrap().starts_with("TransferToAgent: => "));
    }

    #[tokio::test]
    async fn test_last_handoff_wins() {
        let to_c = FnTool::new("to_c", "Transfer to C", |_, _| Ok(ToolOutput::Agent("C".into())));
        let agent = Agent::new("A", "m").with_handoff("B").with_tool(to_c);
        let registry = registry_with(agent.clone());
        let calls = vec![ToolInvocation::transfer(1), ToolInvocation::new("to_c", json!({}))];

        let outcome = ToolDispatcher::dispatch(&calls, &agent, &registry, &ContextVariables::new())
            .await
            .unwrap();

        assert_eq!(outcome.agent.as_deref(), Some("C"));
        assert_eq!(outcome.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_transfer_is_fatal() {
        let agent = Agent::new("A", "m").with_handoff("B");
        let registry = registry_with(agent.clone());

        for call in [
            ToolInvocation::transfer(2),
            ToolInvocation::transfer(0),
            ToolInvocation::new("TransferToAgent", json!({})),
        ] {
            let err = ToolDispatcher::dispatch(&[call], &agent, &registry, &ContextVariables::new())
                .await
                .unwrap_err();
            assert!(matches!(err, RunError::HandoffOutOfRange { available: 1, .. }));
        }
    }

    #[tokio::test]
    async fn test_tool_error_propagates() {
        let failing = FnTool::new("explode", "fails", |_, _| Err(anyhow::anyhow!("kaboom")));
        let agent = Agent::new("A", "m").with_tool(failing);
        let registry = registry_with(agent.clone());

        let err = ToolDispatcher::dispatch(
            &[ToolInvocation::new("explode", json!({}))],
            &agent,
            &registry,
            &ContextVariables::new(),
        )
        .await
        .unwrap_err();

        match err {
            RunError::ToolFailed { tool, .. } => assert_eq!(tool, "explode"),
            other => panic!("Expected ToolFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_handoff_to_unregistered_agent_fails() {
        let rogue = FnTool::new("rogue", "to nowhere", |_, _| Ok(ToolOutput::Agent("Nobody".into())));
        let agent = Agent::new("A", "m").with_tool(rogue);
        let registry = registry_with(agent.clone());

        let err = ToolDispatcher::dispatch(
            &[ToolInvocation::new("rogue", json!({}))],
            &agent,
            &registry,
            &ContextVariables::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RunError::UnknownAgent(name) if name == "Nobody"));
    }
}
