//! Core value types and the drawing-surface trait for Quill.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! geometry, paint resources, fonts and text flags, and the
//! [`DrawSurface`] trait that recordings are replayed against.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod geometry;
pub mod paint;
pub mod surface;
pub mod text;

pub use geometry::{LineF, Point, PointF, Rect, RectF, Transform};
pub use paint::{
    BackgroundMode, Bitmap, Brush, BrushStyle, CapStyle, ClipOperation, Color, CompositionMode,
    FillRule, Image, ImageConversionFlags, JoinStyle, Path, PathElement, PathElementKind, Pen,
    PenStyle, Pixmap, Region, RenderHints,
};
pub use surface::{Dpi, DrawSurface};
pub use text::{Font, FontStyle, MetricDevice, TextFlags};
