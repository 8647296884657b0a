//! Hook Registry
//!
//! Contains:
//! - `Hook` trait - for implementing hooks
//! - `HookMatcher` - a hook with an optional tool-name regex
//! - `HookRegistry` - ordered hooks per checkpoint, usable as [`StepHooks`]

use std::sync::Arc;

use regex::Regex;

use super::types::{HookContext, HookEvent, StepHooks};
use crate::stepwise::Step;

/// Trait for hook implementations
///
/// Hooks are synchronous. Returning `None` means "no opinion".
pub trait Hook: Send + Sync {
    /// Execute the hook with the given context
    fn call(&self, ctx: &HookContext<'_>) -> Option<Step>;
}

/// Implement Hook for closures
impl<F> Hook for F
where
    F: for<'a> Fn(&HookContext<'a>) -> Option<Step> + Send + Sync,
{
    fn call(&self, ctx: &HookContext<'_>) -> Option<Step> {
        (self)(ctx)
    }
}

/// Type alias for stored hooks
pub type ArcHook = Arc<dyn Hook>;

/// A hook guarded by an optional tool-name filter
pub struct HookMatcher {
    tools: Option<Regex>,
    hook: ArcHook,
}

impl HookMatcher {
    /// Guard nothing: the hook sees every tool
    pub fn new<H: Hook + 'static>(hook: H) -> Self {
        Self {
            tools: None,
            hook: Arc::new(hook),
        }
    }

    /// Only consult the hook for tools whose name matches `pattern`
    ///
    /// `"refund|discount"` covers two tools, `"^TransferToAgent$"` covers transfers.
    pub fn with_pattern<H: Hook + 'static>(pattern: &str, hook: H) -> Result<Self, regex::Error> {
        let tools = Regex::new(pattern)?;
        Ok(Self {
            tools: Some(tools),
            hook: Arc::new(hook),
        })
    }

    /// Whether a call to `tool_name` reaches the hook
    pub fn applies_to(&self, tool_name: &str) -> bool {
        self.tools
            .as_ref()
            .map_or(true, |tools| tools.is_match(tool_name))
    }

    fn consult(&self, ctx: &HookContext<'_>) -> Option<Step> {
        if let Some(name) = ctx.tool_name {
            if !self.applies_to(name) {
                return None;
            }
        }
        self.hook.call(ctx)
    }
}

impl std::fmt::Debug for HookMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookMatcher")
            .field("tools", &self.tools.as_ref().map(Regex::as_str))
            .finish()
    }
}

/// Ordered hook lists, one per checkpoint
///
/// The first hook returning a step wins; later hooks on the same checkpoint are not
/// consulted. Tool name patterns only matter for `BeforeToolCall`.
///
/// # Example
///
/// ```ignore
/// let mut hooks = HookRegistry::new();
///
/// // Never let the model refund without a human
/// hooks.add_with_pattern(HookEvent::BeforeToolCall, "refund", |_| {
///     Some(Step::new("Refund blocked", "Refunds need human approval."))
/// })?;
///
/// let runner = StepRunner::new(adapter, agents).with_hooks(hooks);
/// ```
#[derive(Default)]
pub struct HookRegistry {
    first_step: Vec<HookMatcher>,
    tool_call: Vec<HookMatcher>,
    final_step: Vec<HookMatcher>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, event: HookEvent) -> &[HookMatcher] {
        match event {
            HookEvent::BeforeFirstStep => &self.first_step,
            HookEvent::BeforeToolCall => &self.tool_call,
            HookEvent::BeforeFinalStep => &self.final_step,
        }
    }

    fn slot_mut(&mut self, event: HookEvent) -> &mut Vec<HookMatcher> {
        match event {
            HookEvent::BeforeFirstStep => &mut self.first_step,
            HookEvent::BeforeToolCall => &mut self.tool_call,
            HookEvent::BeforeFinalStep => &mut self.final_step,
        }
    }

    /// Register an unfiltered hook
    pub fn add<H: Hook + 'static>(&mut self, event: HookEvent, hook: H) -> &mut Self {
        self.add_matcher(event, HookMatcher::new(hook))
    }

    /// Register a hook consulted only for matching tool names
    pub fn add_with_pattern<H: Hook + 'static>(
        &mut self,
        event: HookEvent,
        pattern: &str,
        hook: H,
    ) -> Result<&mut Self, regex::Error> {
        let matcher = HookMatcher::with_pattern(pattern, hook)?;
        Ok(self.add_matcher(event, matcher))
    }

    pub fn add_matcher(&mut self, event: HookEvent, matcher: HookMatcher) -> &mut Self {
        self.slot_mut(event).push(matcher);
        self
    }

    pub fn has_hooks(&self, event: HookEvent) -> bool {
        !self.slot(event).is_empty()
    }

    pub fn hook_count(&self, event: HookEvent) -> usize {
        self.slot(event).len()
    }

    /// Consult the hooks of `ctx.event` in registration order
    pub fn run(&self, ctx: &HookContext<'_>) -> Option<Step> {
        let step = self
            .slot(ctx.event)
            .iter()
            .find_map(|matcher| matcher.consult(ctx))?;
        tracing::debug!("[HookRegistry] {} produced step '{}'", ctx.event, step.title);
        Some(step)
    }
}

impl StepHooks for HookRegistry {
    fn before_first_step(&self, ctx: &HookContext<'_>) -> Option<Step> {
        self.run(ctx)
    }

    fn before_tool_call(&self, ctx: &HookContext<'_>) -> Option<Step> {
        self.run(ctx)
    }

    fn before_final_step(&self, ctx: &HookContext<'_>) -> Option<Step> {
        self.run(ctx)
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("first_step", &self.first_step.len())
            .field("tool_call", &self.tool_call.len())
            .field("final_step", &self.final_step.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::core::ContextVariables;
    use serde_json::json;

    fn blocked(_ctx: &HookContext<'_>) -> Option<Step> {
        Some(Step::new("Blocked", "not allowed"))
    }

    #[test]
    fn test_hook_matcher_pattern() {
        let matcher = HookMatcher::with_pattern("refund|discount", blocked).unwrap();

        assert!(matcher.applies_to("refund"));
        assert!(matcher.applies_to("apply_discount"));
        assert!(!matcher.applies_to("lookup_item"));
    }

    #[test]
    fn test_hook_matcher_no_pattern() {
        let matcher = HookMatcher::new(blocked);
        assert!(matcher.applies_to("anything"));
    }

    #[test]
    fn test_invalid_pattern() {
        let mut registry = HookRegistry::new();
        assert!(registry
            .add_with_pattern(HookEvent::BeforeToolCall, "(", blocked)
            .is_err());
        assert!(!registry.has_hooks(HookEvent::BeforeToolCall));
    }

    #[test]
    fn test_registry_filters_tool_hooks_by_name() {
        let mut registry = HookRegistry::new();
        registry
            .add_with_pattern(HookEvent::BeforeToolCall, "^refund$", blocked)
            .unwrap();
        assert_eq!(registry.hook_count(HookEvent::BeforeToolCall), 1);

        let agent = Agent::new("A", "m");
        let context = ContextVariables::new();
        let step = Step::new("Use tool", "calling");
        let input = json!({});

        let ctx = HookContext::before_tool_call(&agent, &[], &context, &step, "refund", &input);
        assert_eq!(registry.before_tool_call(&ctx).unwrap().title, "Blocked");

        let ctx = HookContext::before_tool_call(&agent, &[], &context, &step, "lookup", &input);
        assert!(registry.before_tool_call(&ctx).is_none());
    }

    #[test]
    fn test_first_step_wins() {
        let mut registry = HookRegistry::new();
        registry.add(HookEvent::BeforeFirstStep, |_: &HookContext<'_>| -> Option<Step> {
            None
        });
        registry.add(HookEvent::BeforeFirstStep, |_: &HookContext<'_>| {
            Some(Step::new("Plan", "first"))
        });
        registry.add(HookEvent::BeforeFirstStep, |_: &HookContext<'_>| {
            Some(Step::new("Plan", "second"))
        });

        let agent = Agent::new("A", "m");
        let context = ContextVariables::new();
        let ctx = HookContext::before_first_step(&agent, &[], &context);

        assert_eq!(registry.before_first_step(&ctx).unwrap().content, "first");
        // Events without hooks have no opinion
        let final_step = Step::final_step("Answer", "42");
        let ctx = HookContext::before_final_step(&agent, &[], &context, &final_step);
        assert!(registry.before_final_step(&ctx).is_none());
    }
}
