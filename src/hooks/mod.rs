//! Hooks Module
//!
//! Intercept the step-wise runner at three checkpoints.
//!
//! # Overview
//!
//! Hooks let you:
//! - Seed a run with a planning step before the model speaks
//! - Replace a tool execution with a synthetic step
//! - Veto or rewrite what the model claims is its final answer
//!
//! # Example
//!
//! ```ignore
//! use anthill::hooks::{HookContext, HookEvent, HookRegistry};
//! use anthill::stepwise::Step;
//!
//! let mut hooks = HookRegistry::new();
//!
//! // Force at least three steps before a final answer
//! hooks.add(HookEvent::BeforeFinalStep, |ctx: &HookContext<'_>| {
//!     (ctx.step_count() < 3).then(|| Step::new("Re-examine", "Check the reasoning again."))
//! });
//! ```
//!
//! # Checkpoints
//!
//! | Event | When | A returned step |
//! |-------|------|-----------------|
//! | `BeforeFirstStep` | Before the first completion | is appended to history |
//! | `BeforeToolCall` | Before a resolved tool runs | replaces the execution |
//! | `BeforeFinalStep` | Before a final step is accepted | replaces it, or forces continuation |
//!
//! Implement [`StepHooks`] directly for full control; [`NoopHooks`] never intervenes.

mod registry;
mod types;

pub use registry::{ArcHook, Hook, HookMatcher, HookRegistry};
pub use types::{HookContext, HookEvent, NoopHooks, StepHooks};
