//! Review status interpretation and duplicate suppression

pub mod interpreter;
pub mod tracker;

pub use interpreter::{interpret, interpret_latest, verdict_message, InterpretError, Interpretation};
pub use tracker::StatusTracker;
