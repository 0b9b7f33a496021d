//! Quill: record drawing commands into a compact binary stream and replay
//! them later against any drawing surface.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Quill sub-crates. For most users, adding `quill` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use quill::prelude::*;
//!
//! let mut rec = Recorder::new(FormatVersion::CURRENT);
//! rec.set_pen(&Pen::solid(Color::BLACK, 2.0)).unwrap();
//! rec.record(&Command::DrawEllipse(RectF::new(0.0, 0.0, 40.0, 20.0))).unwrap();
//! let recording = rec.finish().unwrap();
//!
//! // Bytes can be stored anywhere and reloaded later.
//! let reloaded = Recording::from_bytes(recording.data().to_vec());
//! assert_eq!(reloaded.format_version(), Some(FormatVersion::CURRENT));
//! assert_eq!(reloaded.bounding_rect(), Rect::new(0, 0, 40, 20));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `quill-core` | Geometry, paint resources, fonts, the `DrawSurface` trait |
//! | [`replay`] | `quill-replay` | Format versions, codec, recorder, recording, player |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Geometry, paint resources, and the drawing-surface trait (`quill-core`).
///
/// Implement [`types::DrawSurface`] to replay recordings onto your own
/// rendering backend.
pub use quill_core as types;

/// Recording, validation, and replay (`quill-replay`).
///
/// Write streams with [`replay::Recorder`], hold and replay them with
/// [`replay::Recording`].
pub use quill_replay as replay;

/// Common imports for typical Quill usage.
///
/// ```rust
/// use quill::prelude::*;
/// ```
pub mod prelude {
    // Geometry and paint
    pub use quill_core::{
        Brush, Color, Font, Image, LineF, Path, Pen, Pixmap, Point, PointF, Rect, RectF,
        Region, Transform,
    };

    // Surface
    pub use quill_core::{Dpi, DrawSurface};

    // Recording and replay
    pub use quill_replay::{
        Command, FormatVersion, Placement, PlayConfig, Recorder, Recording, Resource, TextItem,
    };

    // Errors
    pub use quill_replay::{ConfigError, ReplayError};
}
