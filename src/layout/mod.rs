//! Layout module orchestrator.
//!
//! Downstream code imports the row packer and its value types from here while
//! the implementation details live in the private `core` module.

mod core;

pub use core::{HEIGHT_SCALE, LayoutResult, LayoutSettings, Row, RowPacker, compute};
