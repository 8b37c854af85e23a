//! Calculator core.
//!
//! This module provides functionality to:
//! - Rewrite degree arguments of trig calls into radians
//! - Evaluate expressions through a pluggable backend
//! - Adapt keypad tokens (`!`, `fact(`, `root(`, `random()`) to each backend
//! - Track the input buffer, memory register and history
//! - Copy results to the clipboard

mod angle;
mod clipboard;
mod engine;
mod evaluation;
mod history;
mod rewrite;

pub use angle::AngleMode;
pub use clipboard::copy_to_clipboard;
pub use engine::{ExpressionEngine, LastResult};
pub use evaluation::Backend;
