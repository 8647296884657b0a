pub mod normalizer;
pub mod provider;
pub mod scripted;
pub mod types;

pub use normalizer::{normalize, StreamAccumulator};
pub use provider::{CompletionAdapter, DeltaStream};
pub use scripted::{ScriptStep, ScriptedAdapter};
pub use types::{
    CompletionDelta, CompletionRequest, RawAction, RawCompletion, ToolCallDelta, ToolSchema,
};
