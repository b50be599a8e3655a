use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability every layout subject exposes: its natural, unscaled size.
///
/// The engine only ever reads these two values. Items are never mutated, so any
/// presentation state a caller attaches to its own item type is invisible here.
pub trait Measured {
    fn intrinsic_width(&self) -> f64;
    fn intrinsic_height(&self) -> f64;

    /// Width divided by height.
    fn aspect_ratio(&self) -> f64 {
        self.intrinsic_width() / self.intrinsic_height()
    }

    /// Width the item occupies when scaled to `height`.
    fn width_at(&self, height: f64) -> f64 {
        height * self.aspect_ratio()
    }
}

impl<T: Measured + ?Sized> Measured for &T {
    fn intrinsic_width(&self) -> f64 {
        (**self).intrinsic_width()
    }

    fn intrinsic_height(&self) -> f64 {
        (**self).intrinsic_height()
    }
}

/// Plain intrinsic size, in whatever unit the caller lays out in (usually px).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        is_positive(self.width) && is_positive(self.height)
    }
}

impl Measured for Dimensions {
    fn intrinsic_width(&self) -> f64 {
        self.width
    }

    fn intrinsic_height(&self) -> f64 {
        self.height
    }
}

/// A labelled item, typically an image known by its source path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    pub src: String,
    #[serde(flatten)]
    pub size: Dimensions,
}

impl ImageItem {
    pub fn new(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            src: src.into(),
            size: Dimensions::new(width, height),
        }
    }
}

impl Measured for ImageItem {
    fn intrinsic_width(&self) -> f64 {
        self.size.width
    }

    fn intrinsic_height(&self) -> f64 {
        self.size.height
    }
}

impl fmt::Display for ImageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.src)
    }
}

pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
