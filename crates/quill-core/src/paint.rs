//! Paint resources: colours, pens, brushes, bitmaps, paths, and regions.
//!
//! These are plain value types. Decoding pixels, tessellating paths, and
//! rasterizing regions belong to the drawing surface; this crate only
//! carries the values from the recorder to the surface intact.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::geometry::{PointF, Rect, RectF};

/// An 8-bit-per-channel RGBA colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha; `255` is opaque.
    pub a: u8,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Colour with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Stroke dash pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
pub enum PenStyle {
    /// No stroke at all.
    NoPen = 0,
    #[default]
    /// Continuous line.
    Solid = 1,
    /// Dashes.
    Dash = 2,
    /// Dots.
    Dot = 3,
    /// Alternating dashes and dots.
    DashDot = 4,
    /// One dash, two dots.
    DashDotDot = 5,
}

/// Line end decoration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
pub enum CapStyle {
    /// Ends exactly at the end point.
    Flat = 0,
    #[default]
    /// Square extending half the width past the end point.
    Square = 1,
    /// Semicircle around the end point.
    Round = 2,
}

/// Line joint decoration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
pub enum JoinStyle {
    /// Outer edges extended to meet.
    Miter = 0,
    #[default]
    /// Triangular notch filled in.
    Bevel = 1,
    /// Circular arc.
    Round = 2,
}

/// Stroke settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Pen {
    /// Dash pattern.
    pub style: PenStyle,
    /// Stroke width; `0.0` is a one-pixel cosmetic line.
    pub width: f64,
    /// Stroke colour.
    pub color: Color,
    /// Line end decoration.
    pub cap: CapStyle,
    /// Line joint decoration.
    pub join: JoinStyle,
    /// Width is in device pixels regardless of the transform.
    pub cosmetic: bool,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            style: PenStyle::Solid,
            width: 1.0,
            color: Color::BLACK,
            cap: CapStyle::Square,
            join: JoinStyle::Bevel,
            cosmetic: false,
        }
    }
}

impl Pen {
    /// Solid pen of the given colour and width.
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }
}

/// Fill pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
pub enum BrushStyle {
    #[default]
    /// Nothing is filled.
    NoBrush = 0,
    /// Uniform colour.
    Solid = 1,
    /// 94% fill.
    Dense1 = 2,
    /// 88% fill.
    Dense2 = 3,
    /// 63% fill.
    Dense3 = 4,
    /// 50% fill.
    Dense4 = 5,
    /// 37% fill.
    Dense5 = 6,
    /// 12% fill.
    Dense6 = 7,
    /// 6% fill.
    Dense7 = 8,
    /// Horizontal lines.
    Horizontal = 9,
    /// Vertical lines.
    Vertical = 10,
    /// Horizontal and vertical lines.
    Cross = 11,
    /// Backward diagonal lines.
    BDiagonal = 12,
    /// Forward diagonal lines.
    FDiagonal = 13,
    /// Crossing diagonal lines.
    DiagonalCross = 14,
}

/// Fill settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Brush {
    /// Fill pattern.
    pub style: BrushStyle,
    /// Fill colour.
    pub color: Color,
}

impl Brush {
    /// Solid brush.
    pub fn solid(color: Color) -> Self {
        Self {
            style: BrushStyle::Solid,
            color,
        }
    }
}

/// Opaque bitmap payload: dimensions plus the encoded pixel bytes.
///
/// The byte layout is owned by whoever produced the bitmap; it is passed
/// through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes.
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Full-image source rectangle.
    pub fn rect(&self) -> RectF {
        RectF::new(0.0, 0.0, self.width as f64, self.height as f64)
    }

    /// `true` for a zero-sized bitmap.
    pub fn is_null(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A device-independent image.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Image(pub Bitmap);

/// A device-optimized pixmap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixmap(pub Bitmap);

impl Image {
    /// Construct from dimensions and pixel bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self(Bitmap {
            width,
            height,
            data,
        })
    }
}

impl Pixmap {
    /// Construct from dimensions and pixel bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self(Bitmap {
            width,
            height,
            data,
        })
    }
}

bitflags! {
    /// Colour-conversion hints forwarded with image draws.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ImageConversionFlags: u32 {
        /// Convert to one bit per pixel.
        const MONO_ONLY = 0x0000_0002;
        /// Error-diffusion dithering; the zero value.
        const DIFFUSE_DITHER = 0x0000_0000;
        /// Ordered dithering.
        const ORDERED_DITHER = 0x0000_0010;
        /// No dithering, threshold only.
        const THRESHOLD_DITHER = 0x0000_0020;
        /// Skip the scan for a fully opaque source.
        const NO_OPAQUE_DETECTION = 0x0000_0100;
        /// Keep the source pixel format.
        const NO_FORMAT_CONVERSION = 0x0000_0200;
        const _ = !0;
    }
}

/// Polygon fill rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
pub enum FillRule {
    #[default]
    /// Alternate fill.
    OddEven = 0,
    /// Non-zero winding fill.
    Winding = 1,
}

/// Kind of a path element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
pub enum PathElementKind {
    /// Start of a subpath.
    MoveTo = 0,
    /// Straight segment end point.
    LineTo = 1,
    /// First control point of a cubic; followed by two `CurveToData`.
    CurveTo = 2,
    /// Second control point or end point of a cubic.
    CurveToData = 3,
}

/// One vertex of a [`Path`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathElement {
    /// What the point means.
    pub kind: PathElementKind,
    /// Vertex position.
    pub point: PointF,
}

/// A vector path as a flat element list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    /// Elements in drawing order.
    pub elements: Vec<PathElement>,
    /// Fill rule used when the path is filled or used as a clip.
    pub fill_rule: FillRule,
}

impl Path {
    /// Empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new subpath.
    pub fn move_to(&mut self, p: PointF) {
        self.elements.push(PathElement {
            kind: PathElementKind::MoveTo,
            point: p,
        });
    }

    /// Straight segment to `p`.
    pub fn line_to(&mut self, p: PointF) {
        self.elements.push(PathElement {
            kind: PathElementKind::LineTo,
            point: p,
        });
    }

    /// Cubic Bézier segment.
    pub fn cubic_to(&mut self, c1: PointF, c2: PointF, end: PointF) {
        self.elements.push(PathElement {
            kind: PathElementKind::CurveTo,
            point: c1,
        });
        for p in [c2, end] {
            self.elements.push(PathElement {
                kind: PathElementKind::CurveToData,
                point: p,
            });
        }
    }

    /// `true` when the path has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Bounding rectangle of every vertex, including control points.
    pub fn control_rect(&self) -> RectF {
        RectF::bounding(self.elements.iter().map(|e| e.point)).unwrap_or_default()
    }
}

/// An integer region as a union of rectangles.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    /// Constituent rectangles.
    pub rects: SmallVec<[Rect; 4]>,
}

impl Region {
    /// Region covering a single rectangle.
    pub fn from_rect(r: Rect) -> Self {
        let mut rects = SmallVec::new();
        if !r.is_empty() {
            rects.push(r);
        }
        Self { rects }
    }

    /// `true` when the region covers nothing.
    pub fn is_empty(&self) -> bool {
        self.rects.iter().all(Rect::is_empty)
    }
}

/// How a new clip combines with the existing one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
pub enum ClipOperation {
    /// Clipping is switched off.
    NoClip = 0,
    #[default]
    /// The new clip replaces the old one.
    Replace = 1,
    /// The new clip is intersected with the old one.
    Intersect = 2,
}

/// Whether text and pattern backgrounds are painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::FromRepr)]
#[repr(u8)]
pub enum BackgroundMode {
    #[default]
    /// Backgrounds are left untouched.
    Transparent = 0,
    /// Backgrounds are filled with the background colour.
    Opaque = 1,
}

/// Porter-Duff or blend composition mode, kept as its raw value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CompositionMode(pub u32);

impl CompositionMode {
    /// Source alpha-blended over the destination.
    pub const SOURCE_OVER: CompositionMode = CompositionMode(0);
    /// Destination alpha-blended over the source.
    pub const DESTINATION_OVER: CompositionMode = CompositionMode(1);
    /// Destination cleared.
    pub const CLEAR: CompositionMode = CompositionMode(2);
    /// Source copied.
    pub const SOURCE: CompositionMode = CompositionMode(3);
    /// Destination kept.
    pub const DESTINATION: CompositionMode = CompositionMode(4);
    /// Colours multiplied.
    pub const MULTIPLY: CompositionMode = CompositionMode(13);
}

bitflags! {
    /// Rendering quality hints.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RenderHints: u32 {
        /// Antialias primitive edges.
        const ANTIALIASING = 0x01;
        /// Antialias glyphs.
        const TEXT_ANTIALIASING = 0x02;
        /// Filter scaled bitmaps.
        const SMOOTH_PIXMAP_TRANSFORM = 0x04;
        const _ = !0;
    }
}
