//! The drawing-surface contract a recording is replayed against.
//!
//! A surface owns every piece of paint state (pen, brush, font, transform
//! stack, clip, composition mode, opacity). The replay engine only drives
//! it through the verbs below and never inspects the result of a draw.

use crate::geometry::{LineF, PointF, Rect, RectF, Transform};
use crate::paint::{
    BackgroundMode, Brush, ClipOperation, Color, CompositionMode, FillRule, Image,
    ImageConversionFlags, Path, Pen, Pixmap, Region, RenderHints,
};
use crate::text::{Font, TextFlags};

/// A resolution in dots per inch, per axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dpi {
    /// Horizontal dots per inch.
    pub x: f64,
    /// Vertical dots per inch.
    pub y: f64,
}

impl Dpi {
    /// The resolution recordings are authored against unless configured
    /// otherwise.
    pub const STANDARD: Dpi = Dpi { x: 96.0, y: 96.0 };

    /// Construct a resolution.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A live drawing surface.
///
/// Angles are in sixteenths of a degree. Round-rect radii are percentages
/// of half the rectangle's width and height.
pub trait DrawSurface {
    // ── Queries ─────────────────────────────────────────────────────

    /// Logical resolution of the target device.
    fn logical_dpi(&self) -> Dpi;

    /// Current world transform.
    fn transform(&self) -> Transform;

    /// Ascent of `font` as the surface would lay it out.
    fn font_ascent(&self, font: &Font) -> f64;

    // ── Transform and state stack ───────────────────────────────────

    /// Replace the world transform, or compose `t` with it when `combine`.
    fn set_transform(&mut self, t: Transform, combine: bool);

    /// Push the full paint state.
    fn save(&mut self);

    /// Pop the paint state pushed by the matching [`save`](Self::save).
    fn restore(&mut self);

    /// Enable or disable the window/viewport transform.
    fn set_view_transform_enabled(&mut self, enabled: bool);

    /// Enable or disable the world transform.
    fn set_world_transform_enabled(&mut self, enabled: bool);

    /// Set the logical window rectangle.
    fn set_window(&mut self, window: Rect);

    /// Set the device viewport rectangle.
    fn set_viewport(&mut self, viewport: Rect);

    // ── Paint state ─────────────────────────────────────────────────

    /// Replace the stroke settings.
    fn set_pen(&mut self, pen: &Pen);
    /// Replace the fill settings.
    fn set_brush(&mut self, brush: &Brush);
    /// Replace the text font.
    fn set_font(&mut self, font: &Font);
    /// Colour used for opaque backgrounds.
    fn set_background(&mut self, color: Color);
    /// Whether backgrounds are painted.
    fn set_background_mode(&mut self, mode: BackgroundMode);
    /// Anchor for brush patterns.
    fn set_brush_origin(&mut self, origin: PointF);
    /// Turn a single render hint on or off; other hints are untouched.
    fn set_render_hint(&mut self, hint: RenderHints, on: bool);
    /// How drawn pixels combine with the destination.
    fn set_composition_mode(&mut self, mode: CompositionMode);
    /// Global opacity in `0.0..=1.0`.
    fn set_opacity(&mut self, opacity: f64);

    // ── Clipping ────────────────────────────────────────────────────

    /// Switch clipping on or off without changing the clip.
    fn set_clipping(&mut self, enabled: bool);
    /// Combine `region` into the clip.
    fn set_clip_region(&mut self, region: &Region, op: ClipOperation);
    /// Combine `path` into the clip.
    fn set_clip_path(&mut self, path: &Path, op: ClipOperation);

    // ── Shapes ──────────────────────────────────────────────────────

    /// Plot one point with the pen.
    fn draw_point(&mut self, p: PointF);
    /// Stroke one line.
    fn draw_line(&mut self, line: LineF);
    /// Stroke independent line segments.
    fn draw_lines(&mut self, lines: &[LineF]);
    /// Fill and stroke a rectangle.
    fn draw_rect(&mut self, rect: RectF);
    /// Fill and stroke a rectangle with radii given as percentages.
    fn draw_rounded_rect(&mut self, rect: RectF, x_radius: f64, y_radius: f64);
    /// Fill and stroke the ellipse inscribed in `rect`.
    fn draw_ellipse(&mut self, rect: RectF);
    /// Stroke an elliptical arc; angles are sixteenths of a degree.
    fn draw_arc(&mut self, rect: RectF, start: i32, span: i32);
    /// Fill and stroke a pie slice.
    fn draw_pie(&mut self, rect: RectF, start: i32, span: i32);
    /// Fill and stroke a chord.
    fn draw_chord(&mut self, rect: RectF, start: i32, span: i32);
    /// Stroke connected segments.
    fn draw_polyline(&mut self, points: &[PointF]);
    /// Fill and stroke a closed polygon.
    fn draw_polygon(&mut self, points: &[PointF], fill: FillRule);
    /// Fill and stroke a path with the current brush and pen.
    fn draw_path(&mut self, path: &Path);
    /// Stroke a path with the current pen, without filling.
    fn stroke_path(&mut self, path: &Path);

    // ── Text ────────────────────────────────────────────────────────

    /// Draw text with its baseline starting at `p`.
    fn draw_text(&mut self, p: PointF, text: &str);
    /// Draw text laid out inside `rect`.
    fn draw_text_in_rect(&mut self, rect: RectF, flags: TextFlags, text: &str);
    /// Lay out text with an explicit font, independent of the current font.
    fn draw_text_layout(&mut self, font: &Font, rect: RectF, flags: TextFlags, text: &str);

    // ── Bitmaps ─────────────────────────────────────────────────────

    /// Draw the `source` part of `pixmap` into `target`.
    fn draw_pixmap(&mut self, target: RectF, pixmap: &Pixmap, source: RectF);
    /// Draw the `source` part of `image` into `target`.
    fn draw_image(
        &mut self,
        target: RectF,
        image: &Image,
        source: RectF,
        flags: ImageConversionFlags,
    );
    /// Fill `target` with copies of `pixmap`, starting at `offset`.
    fn draw_tiled_pixmap(&mut self, target: RectF, pixmap: &Pixmap, offset: PointF);
}
