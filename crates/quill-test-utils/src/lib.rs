//! Test utilities and mock types for Quill development.
//!
//! Provides [`CapturingSurface`], a [`DrawSurface`] that records every
//! call it receives, and the recording fixtures in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use quill_core::{
    BackgroundMode, Brush, ClipOperation, Color, CompositionMode, Dpi, DrawSurface, FillRule,
    Font, Image, ImageConversionFlags, LineF, Path, Pen, Pixmap, PointF, Rect, RectF, Region,
    RenderHints, TextFlags, Transform,
};

/// One call received by a [`CapturingSurface`], with owned arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    SetTransform { t: Transform, combine: bool },
    Save,
    Restore,
    SetViewTransformEnabled(bool),
    SetWorldTransformEnabled(bool),
    SetWindow(Rect),
    SetViewport(Rect),
    SetPen(Pen),
    SetBrush(Brush),
    SetFont(Font),
    SetBackground(Color),
    SetBackgroundMode(BackgroundMode),
    SetBrushOrigin(PointF),
    SetRenderHint { hint: RenderHints, on: bool },
    SetCompositionMode(CompositionMode),
    SetOpacity(f64),
    SetClipping(bool),
    SetClipRegion { region: Region, op: ClipOperation },
    SetClipPath { path: Path, op: ClipOperation },
    DrawPoint(PointF),
    DrawLine(LineF),
    DrawLines(Vec<LineF>),
    DrawRect(RectF),
    DrawRoundedRect { rect: RectF, x_radius: f64, y_radius: f64 },
    DrawEllipse(RectF),
    DrawArc { rect: RectF, start: i32, span: i32 },
    DrawPie { rect: RectF, start: i32, span: i32 },
    DrawChord { rect: RectF, start: i32, span: i32 },
    DrawPolyline(Vec<PointF>),
    DrawPolygon { points: Vec<PointF>, fill: FillRule },
    DrawPath(Path),
    StrokePath(Path),
    DrawText { at: PointF, text: String },
    DrawTextInRect { rect: RectF, flags: TextFlags, text: String },
    DrawTextLayout { font: Font, rect: RectF, flags: TextFlags, text: String },
    DrawPixmap { target: RectF, pixmap: Pixmap, source: RectF },
    DrawImage { target: RectF, image: Image, source: RectF, flags: ImageConversionFlags },
    DrawTiledPixmap { target: RectF, pixmap: Pixmap, offset: PointF },
}

impl SurfaceCall {
    /// `true` for calls that put pixels on the surface.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::DrawPoint(_)
                | Self::DrawLine(_)
                | Self::DrawLines(_)
                | Self::DrawRect(_)
                | Self::DrawRoundedRect { .. }
                | Self::DrawEllipse(_)
                | Self::DrawArc { .. }
                | Self::DrawPie { .. }
                | Self::DrawChord { .. }
                | Self::DrawPolyline(_)
                | Self::DrawPolygon { .. }
                | Self::DrawPath(_)
                | Self::StrokePath(_)
                | Self::DrawText { .. }
                | Self::DrawTextInRect { .. }
                | Self::DrawTextLayout { .. }
                | Self::DrawPixmap { .. }
                | Self::DrawImage { .. }
                | Self::DrawTiledPixmap { .. }
        )
    }
}

/// A [`DrawSurface`] that records calls instead of rasterizing.
///
/// The world transform is tracked as real state (including the
/// save/restore stack) so tests can observe DPI scaling and matrix
/// composition. Everything else is only logged.
#[derive(Clone, Debug)]
pub struct CapturingSurface {
    pub calls: Vec<SurfaceCall>,
    pub dpi: Dpi,
    /// Returned by [`DrawSurface::font_ascent`] for every font.
    pub ascent: f64,
    transform: Transform,
    stack: Vec<Transform>,
}

impl CapturingSurface {
    pub fn new() -> Self {
        Self::with_dpi(Dpi::STANDARD)
    }

    pub fn with_dpi(dpi: Dpi) -> Self {
        Self {
            calls: Vec::new(),
            dpi,
            ascent: 10.0,
            transform: Transform::IDENTITY,
            stack: Vec::new(),
        }
    }

    /// Start from a non-identity world transform.
    pub fn with_transform(mut self, t: Transform) -> Self {
        self.transform = t;
        self
    }

    /// Only the calls that draw something.
    pub fn draws(&self) -> Vec<&SurfaceCall> {
        self.calls.iter().filter(|c| c.is_draw()).collect()
    }

    /// Calls after the initial world-transform setup made by every replay.
    pub fn after_setup(&self) -> &[SurfaceCall] {
        match self.calls.first() {
            Some(SurfaceCall::SetTransform { combine: false, .. }) => &self.calls[1..],
            _ => &self.calls,
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for CapturingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSurface for CapturingSurface {
    fn logical_dpi(&self) -> Dpi {
        self.dpi
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn font_ascent(&self, _font: &Font) -> f64 {
        self.ascent
    }

    fn set_transform(&mut self, t: Transform, combine: bool) {
        self.transform = if combine { t * self.transform } else { t };
        self.calls.push(SurfaceCall::SetTransform { t, combine });
    }

    fn save(&mut self) {
        self.stack.push(self.transform);
        self.calls.push(SurfaceCall::Save);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
        self.calls.push(SurfaceCall::Restore);
    }

    fn set_view_transform_enabled(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::SetViewTransformEnabled(enabled));
    }

    fn set_world_transform_enabled(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::SetWorldTransformEnabled(enabled));
    }

    fn set_window(&mut self, window: Rect) {
        self.calls.push(SurfaceCall::SetWindow(window));
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.calls.push(SurfaceCall::SetViewport(viewport));
    }

    fn set_pen(&mut self, pen: &Pen) {
        self.calls.push(SurfaceCall::SetPen(pen.clone()));
    }

    fn set_brush(&mut self, brush: &Brush) {
        self.calls.push(SurfaceCall::SetBrush(brush.clone()));
    }

    fn set_font(&mut self, font: &Font) {
        self.calls.push(SurfaceCall::SetFont(font.clone()));
    }

    fn set_background(&mut self, color: Color) {
        self.calls.push(SurfaceCall::SetBackground(color));
    }

    fn set_background_mode(&mut self, mode: BackgroundMode) {
        self.calls.push(SurfaceCall::SetBackgroundMode(mode));
    }

    fn set_brush_origin(&mut self, origin: PointF) {
        self.calls.push(SurfaceCall::SetBrushOrigin(origin));
    }

    fn set_render_hint(&mut self, hint: RenderHints, on: bool) {
        self.calls.push(SurfaceCall::SetRenderHint { hint, on });
    }

    fn set_composition_mode(&mut self, mode: CompositionMode) {
        self.calls.push(SurfaceCall::SetCompositionMode(mode));
    }

    fn set_opacity(&mut self, opacity: f64) {
        self.calls.push(SurfaceCall::SetOpacity(opacity));
    }

    fn set_clipping(&mut self, enabled: bool) {
        self.calls.push(SurfaceCall::SetClipping(enabled));
    }

    fn set_clip_region(&mut self, region: &Region, op: ClipOperation) {
        self.calls.push(SurfaceCall::SetClipRegion {
            region: region.clone(),
            op,
        });
    }

    fn set_clip_path(&mut self, path: &Path, op: ClipOperation) {
        self.calls.push(SurfaceCall::SetClipPath {
            path: path.clone(),
            op,
        });
    }

    fn draw_point(&mut self, p: PointF) {
        self.calls.push(SurfaceCall::DrawPoint(p));
    }

    fn draw_line(&mut self, line: LineF) {
        self.calls.push(SurfaceCall::DrawLine(line));
    }

    fn draw_lines(&mut self, lines: &[LineF]) {
        self.calls.push(SurfaceCall::DrawLines(lines.to_vec()));
    }

    fn draw_rect(&mut self, rect: RectF) {
        self.calls.push(SurfaceCall::DrawRect(rect));
    }

    fn draw_rounded_rect(&mut self, rect: RectF, x_radius: f64, y_radius: f64) {
        self.calls.push(SurfaceCall::DrawRoundedRect {
            rect,
            x_radius,
            y_radius,
        });
    }

    fn draw_ellipse(&mut self, rect: RectF) {
        self.calls.push(SurfaceCall::DrawEllipse(rect));
    }

    fn draw_arc(&mut self, rect: RectF, start: i32, span: i32) {
        self.calls.push(SurfaceCall::DrawArc { rect, start, span });
    }

    fn draw_pie(&mut self, rect: RectF, start: i32, span: i32) {
        self.calls.push(SurfaceCall::DrawPie { rect, start, span });
    }

    fn draw_chord(&mut self, rect: RectF, start: i32, span: i32) {
        self.calls.push(SurfaceCall::DrawChord { rect, start, span });
    }

    fn draw_polyline(&mut self, points: &[PointF]) {
        self.calls.push(SurfaceCall::DrawPolyline(points.to_vec()));
    }

    fn draw_polygon(&mut self, points: &[PointF], fill: FillRule) {
        self.calls.push(SurfaceCall::DrawPolygon {
            points: points.to_vec(),
            fill,
        });
    }

    fn draw_path(&mut self, path: &Path) {
        self.calls.push(SurfaceCall::DrawPath(path.clone()));
    }

    fn stroke_path(&mut self, path: &Path) {
        self.calls.push(SurfaceCall::StrokePath(path.clone()));
    }

    fn draw_text(&mut self, p: PointF, text: &str) {
        self.calls.push(SurfaceCall::DrawText {
            at: p,
            text: text.to_owned(),
        });
    }

    fn draw_text_in_rect(&mut self, rect: RectF, flags: TextFlags, text: &str) {
        self.calls.push(SurfaceCall::DrawTextInRect {
            rect,
            flags,
            text: text.to_owned(),
        });
    }

    fn draw_text_layout(&mut self, font: &Font, rect: RectF, flags: TextFlags, text: &str) {
        self.calls.push(SurfaceCall::DrawTextLayout {
            font: font.clone(),
            rect,
            flags,
            text: text.to_owned(),
        });
    }

    fn draw_pixmap(&mut self, target: RectF, pixmap: &Pixmap, source: RectF) {
        self.calls.push(SurfaceCall::DrawPixmap {
            target,
            pixmap: pixmap.clone(),
            source,
        });
    }

    fn draw_image(
        &mut self,
        target: RectF,
        image: &Image,
        source: RectF,
        flags: ImageConversionFlags,
    ) {
        self.calls.push(SurfaceCall::DrawImage {
            target,
            image: image.clone(),
            source,
            flags,
        });
    }

    fn draw_tiled_pixmap(&mut self, target: RectF, pixmap: &Pixmap, offset: PointF) {
        self.calls.push(SurfaceCall::DrawTiledPixmap {
            target,
            pixmap: pixmap.clone(),
            offset,
        });
    }
}
