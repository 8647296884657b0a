//! Core types for the runtime
//!
//! This module provides the fundamental types used throughout the crate:
//! - `Message` / `ToolInvocation` - Normalized conversation entries
//! - `ContextVariables` - Run-scoped key/value state
//! - `TurnState` - Turn controller state machine
//! - `Response` / `RunEvent` - Run outputs
//! - `RunError` - Error types

pub mod context;
pub mod error;
pub mod message;
pub mod output;
pub mod state;

pub use context::ContextVariables;
pub use error::{RunError, RunResult};
pub use message::{Message, Role, ToolInvocation, TRANSFER_TOOL_NAME};
pub use output::{Response, RunEvent};
pub use state::{StopReason, TurnState};
