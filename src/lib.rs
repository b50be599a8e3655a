//! Justified ("barrel") row layout for items of known aspect ratio.
//!
//! [`RowPacker`] partitions an ordered item list into rows that each fill a
//! fixed container width once scaled to a common height. [`IncrementalLayout`]
//! re-packs only the open last row when items are appended, and
//! [`BarrelSession`] feeds the results into a [`RenderAdapter`].

pub mod controller;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod session;

pub use controller::{ControllerState, IncrementalLayout};
pub use error::{LayoutError, Result};
pub use geometry::{Dimensions, ImageItem, Measured};
pub use layout::{HEIGHT_SCALE, LayoutResult, LayoutSettings, Row, RowPacker, compute};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{LayoutMetrics, MetricSnapshot};
pub use render::{
    MarkupRenderer, RenderAdapter, RenderMode, RenderedItem, RenderedRow, RendererSettings,
};
pub use session::{BarrelSession, SessionConfig};
