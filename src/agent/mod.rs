pub mod agent;
pub mod registry;
pub mod system_prompt;

pub use agent::{Agent, Instructions};
pub use registry::AgentRegistry;
pub use system_prompt::{DefaultInstructionBuilder, InstructionBuilder};
