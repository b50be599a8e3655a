use thiserror::Error;

use crate::logging::LoggingError;

/// Unified result type for the barrel layout crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the layout engine, the incremental controller and the
/// render adapters.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("item {index} has invalid intrinsic dimensions {width}x{height}")]
    InvalidDimension { index: usize, width: f64, height: f64 },
    #[error("invalid container geometry: width {width}, base height {base_height}")]
    InvalidContainer { width: f64, base_height: f64 },
    #[error("snapshot holds {supplied} items but {consumed} were already consumed")]
    StateDesync { consumed: usize, supplied: usize },
    #[error("render adapter failure: {0}")]
    Render(String),
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
