//! Step-wise reasoning mode
//!
//! - `Step` / `NextAction` - JSON reasoning steps
//! - `StepInstructionBuilder` - Instructions asking for one step per completion
//! - `StepRunner` - Retrying step loop with hook checkpoints

mod prompt;
mod runner;
mod step;

pub use prompt::StepInstructionBuilder;
pub use runner::StepRunner;
pub use step::{NextAction, Step};
