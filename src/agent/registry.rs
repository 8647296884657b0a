//! Agent registry
//!
//! Holds every agent of a team by name. Handoff lists reference names, so agents can
//! point at each other (including cycles) without shared ownership.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{json, Value};

use super::agent::Agent;
use crate::core::{RunError, RunResult};
use crate::tools::Tool;

/// Registry of agents keyed by name
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: HashMap<String, Arc<Agent>>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent, replacing any agent with the same name
    pub fn register(&mut self, agent: Agent) -> &mut Self {
        let name = agent.name.clone();
        tracing::info!("[AgentRegistry] Registering agent: {}", name);
        if self.agents.insert(name.clone(), Arc::new(agent)).is_some() {
            tracing::warn!("[AgentRegistry] Replaced existing agent: {}", name);
        }
        self
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.register(agent);
        self
    }

    /// Get an agent by name
    pub fn get(&self, name: &str) -> Option<Arc<Agent>> {
        self.agents.get(name).cloned()
    }

    /// Get an agent by name or fail with [`RunError::UnknownAgent`]
    pub fn resolve(&self, name: &str) -> RunResult<Arc<Agent>> {
        self.get(name)
            .ok_or_else(|| RunError::UnknownAgent(name.to_string()))
    }

    /// Append a handoff target to an already registered agent
    ///
    /// The target does not need to be registered yet.
    pub fn add_handoff(&mut self, from: &str, to: impl Into<String>) -> RunResult<()> {
        let agent = self
            .agents
            .get_mut(from)
            .ok_or_else(|| RunError::UnknownAgent(from.to_string()))?;
        Arc::make_mut(agent).handoffs.push(to.into());
        Ok(())
    }

    /// Append a tool to an already registered agent
    pub fn add_tool<T: Tool + 'static>(&mut self, agent: &str, tool: T) -> RunResult<()> {
        let entry = self
            .agents
            .get_mut(agent)
            .ok_or_else(|| RunError::UnknownAgent(agent.to_string()))?;
        Arc::make_mut(entry).tools.register(tool);
        Ok(())
    }

    /// Names of all registered agents, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.agents.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Describe the handoff graph reachable from `root` as JSON
    ///
    /// Agents already described are referenced by name only, so cycles terminate.
    /// Unregistered handoff targets appear as `{"name": ..., "missing": true}`.
    pub fn describe(&self, root: &str) -> RunResult<Value> {
        let agent = self.resolve(root)?;
        let mut seen = HashSet::new();
        Ok(self.describe_agent(&agent, &mut seen))
    }

    fn describe_agent(&self, agent: &Agent, seen: &mut HashSet<String>) -> Value {
        seen.insert(agent.name.clone());

        let handoffs: Vec<Value> = agent
            .handoffs
            .iter()
            .map(|name| {
                if seen.contains(name) {
                    return Value::String(name.clone());
                }
                match self.agents.get(name) {
                    Some(target) => self.describe_agent(target, seen),
                    None => json!({ "name": name, "missing": true }),
                }
            })
            .collect();

        json!({
            "name": agent.name,
            "model": agent.model,
            "tools": agent.tools.tool_names(),
            "handoffs": handoffs,
            "completion_args": agent.completion_args,
        })
    }
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
