//! Render adapter orchestrator.
//!
//! Adapters receive layout results and perform presentation only. The bundled
//! [`MarkupRenderer`] keeps an owned row container and emits list markup.

mod core;

pub use core::{
    MarkupRenderer, RenderAdapter, RenderMode, RenderedItem, RenderedRow, RendererSettings,
};
