//! Hook Types
//!
//! Core types for the hooks system:
//! - `HookEvent` - The checkpoint being run
//! - `HookContext` - Read-only view of the run passed to hooks
//! - `StepHooks` - Capability interface with three optional checkpoints
//! - `NoopHooks` - The empty implementation

use std::sync::Arc;

use serde_json::Value;

use crate::agent::Agent;
use crate::core::{ContextVariables, Message};
use crate::stepwise::Step;

/// Step-wise checkpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// Before the very first reasoning step of a run
    BeforeFirstStep,
    /// Before a resolved tool call executes
    BeforeToolCall,
    /// Before a step the model declared final is accepted
    BeforeFinalStep,
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookEvent::BeforeFirstStep => write!(f, "BeforeFirstStep"),
            HookEvent::BeforeToolCall => write!(f, "BeforeToolCall"),
            HookEvent::BeforeFinalStep => write!(f, "BeforeFinalStep"),
        }
    }
}

/// State visible to a hook
pub struct HookContext<'a> {
    /// The checkpoint being run
    pub event: HookEvent,

    /// Active agent
    pub agent: &'a Agent,

    /// History so far, caller-supplied messages included (see `run_start`)
    pub messages: &'a [Message],

    /// Committed context store
    pub context_variables: &'a ContextVariables,

    // === Step-specific ===
    /// Step under consideration (tool call or final step)
    pub step: Option<&'a Step>,

    /// Tool name (BeforeToolCall)
    pub tool_name: Option<&'a str>,

    /// Tool input (BeforeToolCall)
    pub tool_input: Option<&'a Value>,

    /// Index in `messages` where the current run began
    pub run_start: usize,
}

impl<'a> HookContext<'a> {
    /// Create context for a BeforeFirstStep hook
    pub fn before_first_step(
        agent: &'a Agent,
        messages: &'a [Message],
        context_variables: &'a ContextVariables,
    ) -> Self {
        Self {
            event: HookEvent::BeforeFirstStep,
            agent,
            messages,
            context_variables,
            step: None,
            tool_name: None,
            tool_input: None,
            run_start: 0,
        }
    }

    /// Create context for a BeforeToolCall hook
    pub fn before_tool_call(
        agent: &'a Agent,
        messages: &'a [Message],
        context_variables: &'a ContextVariables,
        step: &'a Step,
        tool_name: &'a str,
        tool_input: &'a Value,
    ) -> Self {
        Self {
            event: HookEvent::BeforeToolCall,
            agent,
            messages,
            context_variables,
            step: Some(step),
            tool_name: Some(tool_name),
            tool_input: Some(tool_input),
            run_start: 0,
        }
    }

    /// Create context for a BeforeFinalStep hook
    pub fn before_final_step(
        agent: &'a Agent,
        messages: &'a [Message],
        context_variables: &'a ContextVariables,
        step: &'a Step,
    ) -> Self {
        Self {
            event: HookEvent::BeforeFinalStep,
            agent,
            messages,
            context_variables,
            step: Some(step),
            tool_name: None,
            tool_input: None,
            run_start: 0,
        }
    }

    /// Mark where the current run's messages begin
    pub fn with_run_start(mut self, run_start: usize) -> Self {
        self.run_start = run_start.min(self.messages.len());
        self
    }

    /// Number of messages the active agent produced since the run began
    pub fn step_count(&self) -> usize {
        self.messages
            .get(self.run_start..)
            .unwrap_or(&[])
            .iter()
            .filter(|m| m.sender.as_deref() == Some(self.agent.name.as_str()))
            .count()
    }
}

/// Optional step-wise checkpoints
///
/// Every method defaults to "no opinion". A returned step is folded into history
/// before the runner proceeds:
/// - `before_first_step`: the step is appended ahead of the first completion
/// - `before_tool_call`: the step replaces the tool execution entirely
/// - `before_final_step`: a `final_step` replaces the model's final step; a `continue`
///   step is appended and the loop goes on
pub trait StepHooks: Send + Sync {
    /// Runs once per run, before the first completion
    fn before_first_step(&self, _ctx: &HookContext<'_>) -> Option<Step> {
        None
    }

    /// Runs before a resolved tool executes
    fn before_tool_call(&self, _ctx: &HookContext<'_>) -> Option<Step> {
        None
    }

    /// Runs before a final step is accepted
    fn before_final_step(&self, _ctx: &HookContext<'_>) -> Option<Step> {
        None
    }
}

/// Hooks that never intervene
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl StepHooks for NoopHooks {}

impl<T: StepHooks + ?Sized> StepHooks for Arc<T> {
    fn before_first_step(&self, ctx: &HookContext<'_>) -> Option<Step> {
        (**self).before_first_step(ctx)
    }

    fn before_tool_call(&self, ctx: &HookContext<'_>) -> Option<Step> {
        (**self).before_tool_call(ctx)
    }

    fn before_final_step(&self, ctx: &HookContext<'_>) -> Option<Step> {
        (**self).before_final_step(ctx)
    }
}
