//! Incremental layout controller orchestrator.
//!
//! The controller keeps the last row of the previous pass open so appended
//! items can be packed without revisiting rows that are already closed.

mod core;

pub use core::{ControllerState, IncrementalLayout};
