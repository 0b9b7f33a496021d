//! The command model: one [`Command`] per record kind, with operands
//! already decoded into their widest in-memory form.
//!
//! Coordinates that some versions store as integers are held as `f64`
//! here; operands that are integer in every version keep integer types.

use quill_core::{
    BackgroundMode, Brush, ClipOperation, Color, CompositionMode, FillRule, Font, Image,
    ImageConversionFlags, LineF, Path, Pen, Pixmap, Point, PointF, Rect, RectF, Region,
    RenderHints, Transform,
};

/// Wire code of each record kind.
///
/// Codes 2, 3, 22 and 23 belong to retired commands and are treated as
/// unknown on replay.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::FromRepr, strum::IntoStaticStr, strum::EnumIter,
)]
#[repr(u8)]
pub enum CommandCode {
    /// Code of [`Command::Nop`].
    Nop = 0,
    /// Code of [`Command::DrawPoint`].
    DrawPoint = 1,
    /// Code of [`Command::DrawLine`].
    DrawLine = 4,
    /// Code of [`Command::DrawRect`].
    DrawRect = 5,
    /// Code of [`Command::DrawRoundRect`].
    DrawRoundRect = 6,
    /// Code of [`Command::DrawEllipse`].
    DrawEllipse = 7,
    /// Code of [`Command::DrawArc`].
    DrawArc = 8,
    /// Code of [`Command::DrawPie`].
    DrawPie = 9,
    /// Code of [`Command::DrawChord`].
    DrawChord = 10,
    /// Code of [`Command::DrawLineSegments`].
    DrawLineSegments = 11,
    /// Code of [`Command::DrawPolyline`].
    DrawPolyline = 12,
    /// Code of [`Command::DrawPolygon`].
    DrawPolygon = 13,
    /// Code of [`Command::DrawCubicBezier`].
    DrawCubicBezier = 14,
    /// Code of [`Command::DrawText`].
    DrawText = 15,
    /// Code of [`Command::DrawTextFormatted`].
    DrawTextFormatted = 16,
    /// Code of [`Command::DrawPixmap`].
    DrawPixmap = 17,
    /// Code of [`Command::DrawImage`].
    DrawImage = 18,
    /// Code of [`Command::DrawText2`].
    DrawText2 = 19,
    /// Code of [`Command::DrawText2Formatted`].
    DrawText2Formatted = 20,
    /// Code of [`Command::DrawTextItem`].
    DrawTextItem = 21,
    /// Code of [`Command::DrawTiledPixmap`].
    DrawTiledPixmap = 24,
    /// Code of [`Command::DrawPath`].
    DrawPath = 25,
    /// Code of [`Command::Begin`].
    Begin = 30,
    /// Code of [`Command::End`].
    End = 31,
    /// Code of [`Command::Save`].
    Save = 32,
    /// Code of [`Command::Restore`].
    Restore = 33,
    /// Code of [`Command::SetBkColor`].
    SetBkColor = 40,
    /// Code of [`Command::SetBkMode`].
    SetBkMode = 41,
    /// Code of [`Command::SetRop`].
    SetRop = 42,
    /// Code of [`Command::SetBrushOrigin`].
    SetBrushOrigin = 43,
    /// Code of [`Command::SetFont`].
    SetFont = 45,
    /// Code of [`Command::SetPen`].
    SetPen = 46,
    /// Code of [`Command::SetBrush`].
    SetBrush = 47,
    /// Code of [`Command::SetVXform`].
    SetVXform = 51,
    /// Code of [`Command::SetWindow`].
    SetWindow = 52,
    /// Code of [`Command::SetViewport`].
    SetViewport = 53,
    /// Code of [`Command::SetWXform`].
    SetWXform = 54,
    /// Code of [`Command::SetWMatrix`].
    SetWMatrix = 55,
    /// Code of [`Command::SetClip`].
    SetClip = 60,
    /// Code of [`Command::SetClipRegion`].
    SetClipRegion = 61,
    /// Code of [`Command::SetClipPath`].
    SetClipPath = 62,
    /// Code of [`Command::SetRenderHint`].
    SetRenderHint = 63,
    /// Code of [`Command::SetCompositionMode`].
    SetCompositionMode = 64,
    /// Code of [`Command::SetClipEnabled`].
    SetClipEnabled = 65,
    /// Code of [`Command::SetOpacity`].
    SetOpacity = 66,
}

impl CommandCode {
    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// A heavy operand stored either inline or as an index into the
/// recording's resource tables.
#[derive(Clone, Debug, PartialEq)]
pub enum Resource<T> {
    /// The value itself is serialized in the record.
    Inline(T),
    /// The record holds a 0-based index into the matching table.
    Indexed(i32),
}

impl<T> Resource<T> {
    /// `true` for [`Resource::Indexed`].
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed(_))
    }

    /// The inline value, if any.
    pub fn inline(&self) -> Option<&T> {
        match self {
            Self::Inline(v) => Some(v),
            Self::Indexed(_) => None,
        }
    }
}

/// Where a pixmap or image draw puts its bitmap.
///
/// Which variant a record holds depends on its format version; see
/// [`BitmapLayout`](crate::version::BitmapLayout).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    /// Natural size with the top-left corner at the point.
    At(PointF),
    /// Into an integer target rectangle.
    Into(RectF),
    /// The `source` part of the bitmap into `target`.
    Mapped {
        /// Destination rectangle.
        target: RectF,
        /// Part of the bitmap to draw.
        source: RectF,
    },
}

impl Placement {
    /// Top-left corner of the target.
    pub fn origin(&self) -> PointF {
        match self {
            Self::At(p) => *p,
            Self::Into(r) | Self::Mapped { target: r, .. } => r.top_left(),
        }
    }

    /// Target rectangle for a bitmap whose full extent is `natural`.
    pub fn target(&self, natural: RectF) -> RectF {
        match self {
            Self::At(p) => RectF::from_origin(*p, natural.width, natural.height),
            Self::Into(r) | Self::Mapped { target: r, .. } => *r,
        }
    }

    /// Source rectangle for a bitmap whose full extent is `natural`.
    pub fn source(&self, natural: RectF) -> RectF {
        match self {
            Self::At(_) | Self::Into(_) => natural,
            Self::Mapped { source, .. } => *source,
        }
    }

    /// Convert to the explicit target/source form.
    pub fn mapped(&self, natural: RectF) -> Placement {
        Self::Mapped {
            target: self.target(natural),
            source: self.source(natural),
        }
    }
}

/// A pre-shaped run of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextItem {
    /// Baseline origin.
    pub at: PointF,
    /// Characters of the run.
    pub text: String,
    /// Font the run was shaped with.
    pub font: Font,
    /// Layout direction flags as recorded; replay does not use them.
    pub layout_flags: u32,
    /// Device scale the run was recorded at. Always `1.0` before major 9.
    pub scale: f64,
    /// Width to justify the run across, or `0.0`. Always `0.0` before major 9.
    pub justification_width: f64,
}

impl TextItem {
    /// Unscaled, unjustified text item.
    pub fn new(at: PointF, text: impl Into<String>, font: Font) -> Self {
        Self {
            at,
            text: text.into(),
            font,
            layout_flags: 0,
            scale: 1.0,
            justification_width: 0.0,
        }
    }
}

/// One decoded record.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Does nothing.
    Nop,
    /// Plot one point.
    DrawPoint(PointF),
    /// Stroke one line.
    DrawLine(LineF),
    /// Fill and stroke a rectangle.
    DrawRect(RectF),
    /// Rounded rectangle. Radii are percentages of half the rectangle's size.
    DrawRoundRect {
        /// Outer bounds.
        rect: RectF,
        /// Horizontal corner radius.
        x_radius: i16,
        /// Vertical corner radius.
        y_radius: i16,
    },
    /// Ellipse inscribed in the rectangle.
    DrawEllipse(RectF),
    /// Elliptical arc. Angles are in sixteenths of a degree.
    DrawArc {
        /// Bounds of the full ellipse.
        rect: RectF,
        /// Start angle, counter-clockwise from three o'clock.
        start: i16,
        /// Sweep angle.
        span: i16,
    },
    /// Pie slice, with angles as for [`Command::DrawArc`].
    DrawPie {
        /// Bounds of the full ellipse.
        rect: RectF,
        /// Start angle.
        start: i16,
        /// Sweep angle.
        span: i16,
    },
    /// Chord, with angles as for [`Command::DrawArc`].
    DrawChord {
        /// Bounds of the full ellipse.
        rect: RectF,
        /// Start angle.
        start: i16,
        /// Sweep angle.
        span: i16,
    },
    /// Consecutive point pairs are separate lines.
    DrawLineSegments(Vec<Point>),
    /// Connected line strip.
    DrawPolyline(Vec<PointF>),
    /// Closed filled polygon.
    DrawPolygon {
        /// Vertices in order.
        points: Vec<PointF>,
        /// Interior rule.
        fill: FillRule,
    },
    /// Start, two control points, end.
    DrawCubicBezier([Point; 4]),
    /// Legacy Latin-1 text.
    DrawText {
        /// Baseline origin.
        at: Point,
        /// The text.
        text: String,
    },
    /// Legacy Latin-1 text in a rectangle.
    DrawTextFormatted {
        /// Layout rectangle.
        rect: Rect,
        /// [`quill_core::TextFlags`] bits.
        flags: i16,
        /// The text.
        text: String,
    },
    /// Draw a pixmap.
    DrawPixmap {
        /// Where it goes.
        placement: Placement,
        /// The pixmap or its table index.
        pixmap: Resource<Pixmap>,
    },
    /// Draw an image.
    DrawImage {
        /// Where it goes.
        placement: Placement,
        /// The image or its table index.
        image: Resource<Image>,
        /// Stored from major 6 on.
        flags: ImageConversionFlags,
    },
    /// Unicode text at a point.
    DrawText2 {
        /// Baseline origin.
        at: PointF,
        /// The text.
        text: String,
    },
    /// Unicode text in a rectangle.
    DrawText2Formatted {
        /// Layout rectangle.
        rect: Rect,
        /// [`quill_core::TextFlags`] bits.
        flags: i16,
        /// The text.
        text: String,
    },
    /// A shaped text run.
    DrawTextItem(TextItem),
    /// Tile a pixmap across a rectangle.
    DrawTiledPixmap {
        /// Area to fill.
        rect: RectF,
        /// The tile or its table index.
        pixmap: Resource<Pixmap>,
        /// Tile origin inside the pixmap.
        offset: PointF,
    },
    /// Fill and stroke a path.
    DrawPath(Path),
    /// Opens a block of `records` records, the closing `End` included.
    Begin {
        /// Record count of the block.
        records: u32,
    },
    /// Closes the current block once its count is exhausted.
    End,
    /// Push the graphics state.
    Save,
    /// Pop the graphics state.
    Restore,
    /// Background colour.
    SetBkColor(Color),
    /// Background mode.
    SetBkMode(BackgroundMode),
    /// Raster operations are obsolete; the value is kept but never applied.
    SetRop(i8),
    /// Brush pattern origin.
    SetBrushOrigin(PointF),
    /// Text font.
    SetFont(Font),
    /// Stroke settings.
    SetPen(Resource<Pen>),
    /// Fill settings.
    SetBrush(Resource<Brush>),
    /// Enable the window/viewport mapping.
    SetVXform(bool),
    /// Logical window of the view mapping.
    SetWindow(RectF),
    /// Device viewport of the view mapping.
    SetViewport(RectF),
    /// Enable the world matrix.
    SetWXform(bool),
    /// Set or combine the world matrix.
    SetWMatrix {
        /// The recorded matrix.
        matrix: Transform,
        /// Combine with the current matrix instead of replacing it.
        combine: bool,
    },
    /// Enable clipping.
    SetClip(bool),
    /// The operation is only honoured from major 9 on.
    SetClipRegion {
        /// Clip area.
        region: Region,
        /// How it combines with the current clip.
        op: ClipOperation,
    },
    /// Clip to a path.
    SetClipPath {
        /// Clip outline.
        path: Path,
        /// How it combines with the current clip.
        op: ClipOperation,
    },
    /// Rendering quality hints.
    SetRenderHint(RenderHints),
    /// Pixel composition mode.
    SetCompositionMode(CompositionMode),
    /// Enable clipping.
    SetClipEnabled(bool),
    /// Global opacity.
    SetOpacity(f64),
}

impl Command {
    /// Wire code for this command.
    pub fn code(&self) -> CommandCode {
        use CommandCode as C;
        match self {
            Self::Nop => C::Nop,
            Self::DrawPoint(_) => C::DrawPoint,
            Self::DrawLine(_) => C::DrawLine,
            Self::DrawRect(_) => C::DrawRect,
            Self::DrawRoundRect { .. } => C::DrawRoundRect,
            Self::DrawEllipse(_) => C::DrawEllipse,
            Self::DrawArc { .. } => C::DrawArc,
            Self::DrawPie { .. } => C::DrawPie,
            Self::DrawChord { .. } => C::DrawChord,
            Self::DrawLineSegments(_) => C::DrawLineSegments,
            Self::DrawPolyline(_) => C::DrawPolyline,
            Self::DrawPolygon { .. } => C::DrawPolygon,
            Self::DrawCubicBezier(_) => C::DrawCubicBezier,
            Self::DrawText { .. } => C::DrawText,
            Self::DrawTextFormatted { .. } => C::DrawTextFormatted,
            Self::DrawPixmap { .. } => C::DrawPixmap,
            Self::DrawImage { .. } => C::DrawImage,
            Self::DrawText2 { .. } => C::DrawText2,
            Self::DrawText2Formatted { .. } => C::DrawText2Formatted,
            Self::DrawTextItem(_) => C::DrawTextItem,
            Self::DrawTiledPixmap { .. } => C::DrawTiledPixmap,
            Self::DrawPath(_) => C::DrawPath,
            Self::Begin { .. } => C::Begin,
            Self::End => C::End,
            Self::Save => C::Save,
            Self::Restore => C::Restore,
            Self::SetBkColor(_) => C::SetBkColor,
            Self::SetBkMode(_) => C::SetBkMode,
            Self::SetRop(_) => C::SetRop,
            Self::SetBrushOrigin(_) => C::SetBrushOrigin,
            Self::SetFont(_) => C::SetFont,
            Self::SetPen(_) => C::SetPen,
            Self::SetBrush(_) => C::SetBrush,
            Self::SetVXform(_) => C::SetVXform,
            Self::SetWindow(_) => C::SetWindow,
            Self::SetViewport(_) => C::SetViewport,
            Self::SetWXform(_) => C::SetWXform,
            Self::SetWMatrix { .. } => C::SetWMatrix,
            Self::SetClip(_) => C::SetClip,
            Self::SetClipRegion { .. } => C::SetClipRegion,
            Self::SetClipPath { .. } => C::SetClipPath,
            Self::SetRenderHint(_) => C::SetRenderHint,
            Self::SetCompositionMode(_) => C::SetCompositionMode,
            Self::SetClipEnabled(_) => C::SetClipEnabled,
            Self::SetOpacity(_) => C::SetOpacity,
        }
    }

    /// Extent of the geometry this command draws, in recording coordinates.
    ///
    /// State changes and text runs (whose extent depends on font metrics)
    /// return `None`. Pixmap and image draws placed at a point with an
    /// indexed bitmap have no known size and contribute only their origin.
    pub fn extent(&self) -> Option<RectF> {
        let rect = |r: &RectF| Some(*r);
        match self {
            Self::DrawPoint(p) => RectF::bounding([*p]),
            Self::DrawLine(l) => RectF::bounding([l.p1, l.p2]),
            Self::DrawRect(r) | Self::DrawEllipse(r) => rect(r),
            Self::DrawRoundRect { rect: r, .. }
            | Self::DrawArc { rect: r, .. }
            | Self::DrawPie { rect: r, .. }
            | Self::DrawChord { rect: r, .. }
            | Self::DrawTiledPixmap { rect: r, .. } => rect(r),
            Self::DrawLineSegments(points) => RectF::bounding(points.iter().map(|p| p.to_f())),
            Self::DrawCubicBezier(points) => RectF::bounding(points.iter().map(|p| p.to_f())),
            Self::DrawPolyline(points) | Self::DrawPolygon { points, .. } => {
                RectF::bounding(points.iter().copied())
            }
            Self::DrawTextFormatted { rect: r, .. } | Self::DrawText2Formatted { rect: r, .. } => {
                Some(r.to_f())
            }
            Self::DrawPixmap { placement, pixmap } => {
                let natural = pixmap.inline().map(|p| p.0.rect()).unwrap_or_default();
                Some(placement.target(natural))
            }
            Self::DrawImage {
                placement, image, ..
            } => {
                let natural = image.inline().map(|i| i.0.rect()).unwrap_or_default();
                Some(placement.target(natural))
            }
            Self::DrawPath(path) if !path.is_empty() => Some(path.control_rect()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_are_unique_and_roundtrip_through_repr() {
        let mut seen = std::collections::HashSet::new();
        for code in CommandCode::iter() {
            assert!(seen.insert(code as u8), "duplicate code {}", code as u8);
            assert_eq!(CommandCode::from_repr(code as u8), Some(code));
        }
        assert_eq!(seen.len(), 45);
    }

    #[test]
    fn retired_codes_are_unknown() {
        for raw in [2u8, 3, 22, 23, 44, 48, 50, 56, 99, 255] {
            assert_eq!(CommandCode::from_repr(raw), None);
        }
    }

    #[test]
    fn names_come_from_variants() {
        assert_eq!(CommandCode::SetWMatrix.name(), "SetWMatrix");
        assert_eq!(Command::DrawRect(RectF::default()).code(), CommandCode::DrawRect);
    }

    #[test]
    fn placement_at_uses_natural_size() {
        let natural = RectF::new(0.0, 0.0, 8.0, 4.0);
        let at = Placement::At(PointF::new(10.0, 20.0));
        assert_eq!(at.target(natural), RectF::new(10.0, 20.0, 8.0, 4.0));
        assert_eq!(at.source(natural), natural);
        let mapped = at.mapped(natural);
        assert_eq!(
            mapped,
            Placement::Mapped {
                target: RectF::new(10.0, 20.0, 8.0, 4.0),
                source: natural,
            }
        );
    }

    #[test]
    fn extent_covers_draw_operands() {
        let line = Command::DrawLine(LineF::new(PointF::new(5.0, 1.0), PointF::new(-1.0, 3.0)));
        assert_eq!(line.extent(), Some(RectF::new(-1.0, 1.0, 6.0, 2.0)));
        assert_eq!(Command::Save.extent(), None);
        let pix = Command::DrawPixmap {
            placement: Placement::At(PointF::new(2.0, 2.0)),
            pixmap: Resource::Inline(Pixmap::new(3, 3, vec![0; 9])),
        };
        assert_eq!(pix.extent(), Some(RectF::new(2.0, 2.0, 3.0, 3.0)));
    }
}
