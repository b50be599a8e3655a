//! Error orchestrator. The taxonomy lives in the private `types` module.

mod types;

pub use types::{LayoutError, Result};
