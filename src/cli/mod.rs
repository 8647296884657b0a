//! Terminal front end: colored transcript rendering and the interactive demo loop

pub mod console;

pub use console::{run_demo_loop, Console};
