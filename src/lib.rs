//! Anthill: a multi-agent orchestration runtime
//!
//! Agents carry instructions, a model name and tools. A runner drives the
//! completion/tool-dispatch loop against a pluggable completion adapter, with
//! agent handoff and shared context variables.

pub mod core;
pub mod runtime;
pub mod tools;

// Agent definitions and instruction building
pub mod agent;

// Completion adapter contract and normalization
pub mod llm;

// Step-wise reasoning mode and its hooks
pub mod hooks;
pub mod stepwise;

// Optional components
pub mod cli;
pub mod config;
pub mod logging;

pub use agent::{Agent, AgentRegistry, Instructions};
pub use config::{AnthillConfig, RetryPolicy, RunOptions};
pub use core::{ContextVariables, Message, Response, Role, RunError, RunEvent, RunResult};
pub use hooks::{HookRegistry, StepHooks};
pub use llm::CompletionAdapter;
pub use runtime::Anthill;
pub use stepwise::{Step, StepRunner};
pub use tools::{FnTool, Tool, ToolOutput, ToolResult};
