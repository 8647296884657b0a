//! Tool system for the runtime
//!
//! This module provides:
//! - `Tool` trait - Interface for implementing tools
//! - `ToolOutput` / `ToolResult` - Raw tool return values and their uniform form
//! - `FnTool` - Closure-backed tools
//! - `ToolSet` - Ordered per-agent tool collection
//! - `ToolDispatcher` - Sequential batch execution with handoff and context extraction

mod dispatcher;
mod registry;
mod tool;

pub use dispatcher::{DispatchOutcome, ToolDispatcher};
pub use registry::ToolSet;
pub use tool::{FnTool, Tool, ToolOutput, ToolResult};
