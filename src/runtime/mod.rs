//! Turn execution
//!
//! - `Anthill` - The turn controller (`run` / `run_and_stream`)
//! - `RunStream` - Lazy event stream of a run

pub mod anthill;

pub use anthill::{Anthill, RunStream};
