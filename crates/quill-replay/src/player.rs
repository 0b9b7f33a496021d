//! The replay engine.
//!
//! Walks the command stream block by block and drives a [`DrawSurface`].
//! A block runs until its `End` arrives as the last of its counted
//! records; running out of records or bytes first is a format error.
//! Replay is not transactional: state already applied to the surface
//! stays applied when a later record fails.

use byteorder::{BigEndian, ReadBytesExt};
use quill_core::{
    DrawSurface, Font, LineF, MetricDevice, Path, PointF, RectF, RenderHints,
    TextFlags, Transform,
};
use tracing::{debug, trace, warn};

use crate::command::{Command, Placement, TextItem};
use crate::config::PlayConfig;
use crate::error::ReplayError;
use crate::header::FormatInfo;
use crate::record::{decode_payload, read_record_header, take_payload};
use crate::resources::{materialize, ResourceTables};
use crate::version::FormatVersion;

/// Replays one recording's command stream against a surface.
pub struct Player<'a> {
    surface: &'a mut dyn DrawSurface,
    config: &'a PlayConfig,
    resources: &'a ResourceTables,
    version: FormatVersion,
    resident: bool,
    /// Surface transform at entry, rescaled to the surface's resolution.
    world: Transform,
    executed: u64,
}

impl<'a> Player<'a> {
    /// Prepare a replay. Nothing touches the surface until [`run`](Self::run).
    pub fn new(
        surface: &'a mut dyn DrawSurface,
        config: &'a PlayConfig,
        resources: &'a ResourceTables,
        version: FormatVersion,
        resident: bool,
    ) -> Self {
        Self {
            surface,
            config,
            resources,
            version,
            resident,
            world: Transform::IDENTITY,
            executed: 0,
        }
    }

    /// Replay a validated buffer whose header is described by `info`.
    ///
    /// Returns the number of records executed, skipped unknown records
    /// included.
    pub fn run(mut self, buf: &[u8], info: &FormatInfo) -> Result<u64, ReplayError> {
        self.config.validate()?;

        let dpi = self.surface.logical_dpi();
        let reference = self.config.reference_dpi;
        self.world = self
            .surface
            .transform()
            .scale(dpi.x / reference.x, dpi.y / reference.y);
        self.surface.set_transform(self.world, false);

        let mut input = buf.get(info.count_offset..).unwrap_or_default();
        let count = read_u32(&mut input)?;
        debug!(version = %self.version, records = count, resident = self.resident, "replay start");
        self.exec_block(&mut input, count, 1)?;
        debug!(executed = self.executed, "replay finished");
        Ok(self.executed)
    }

    fn exec_block(
        &mut self,
        input: &mut &[u8],
        records: u32,
        depth: usize,
    ) -> Result<(), ReplayError> {
        let mut remaining = records;
        while remaining > 0 && !input.is_empty() {
            remaining -= 1;
            let header =
                read_record_header(input).map_err(|e| e.from_payload_read("record header"))?;
            let payload = take_payload(input, header.len)?;
            self.executed += 1;

            let Some(code) = header.command() else {
                warn!(code = header.code, len = header.len, "skipping unknown command");
                continue;
            };
            trace!(command = code.name(), len = header.len, depth, "exec");

            match decode_payload(code, payload, self.version, self.resident)? {
                Command::Begin { records } => {
                    if depth >= self.config.max_block_depth {
                        return Err(ReplayError::structure(format!(
                            "blocks nested deeper than {}",
                            self.config.max_block_depth
                        )));
                    }
                    self.exec_block(input, records, depth + 1)?;
                }
                Command::End => {
                    if remaining == 0 {
                        return Ok(());
                    }
                }
                cmd => self.dispatch(cmd)?,
            }
        }
        Err(ReplayError::structure(format!(
            "block of {records} records ended without End ({} records unread)",
            remaining
        )))
    }

    fn dispatch(&mut self, cmd: Command) -> Result<(), ReplayError> {
        let s = &mut *self.surface;
        let res = self.resources;
        match cmd {
            Command::Nop | Command::SetRop(_) => {}
            Command::DrawPoint(p) => s.draw_point(p),
            Command::DrawLine(line) => s.draw_line(line),
            Command::DrawRect(r) => s.draw_rect(r),
            Command::DrawRoundRect {
                rect,
                x_radius,
                y_radius,
            } => s.draw_rounded_rect(rect, x_radius.into(), y_radius.into()),
            Command::DrawEllipse(r) => s.draw_ellipse(r),
            Command::DrawArc { rect, start, span } => s.draw_arc(rect, start.into(), span.into()),
            Command::DrawPie { rect, start, span } => s.draw_pie(rect, start.into(), span.into()),
            Command::DrawChord { rect, start, span } => {
                s.draw_chord(rect, start.into(), span.into())
            }
            Command::DrawLineSegments(points) => {
                let lines: Vec<LineF> = points
                    .chunks_exact(2)
                    .map(|pair| LineF::new(pair[0].to_f(), pair[1].to_f()))
                    .collect();
                s.draw_lines(&lines);
            }
            Command::DrawPolyline(points) => s.draw_polyline(&points),
            Command::DrawPolygon { points, fill } => s.draw_polygon(&points, fill),
            Command::DrawCubicBezier([start, c1, c2, end]) => {
                let mut path = Path::new();
                path.move_to(start.to_f());
                path.cubic_to(c1.to_f(), c2.to_f(), end.to_f());
                s.stroke_path(&path);
            }
            Command::DrawText { at, text } => s.draw_text(at.to_f(), &text),
            Command::DrawTextFormatted { rect, flags, text }
            | Command::DrawText2Formatted { rect, flags, text } => {
                let flags = TextFlags::from_bits_retain(u32::from(flags as u16));
                s.draw_text_in_rect(rect.to_f(), flags, &text);
            }
            Command::DrawText2 { at, text } => s.draw_text(at, &text),
            Command::DrawTextItem(item) => self.draw_text_item(&item),
            Command::DrawPixmap { placement, pixmap } => {
                let pixmap = materialize(&pixmap, |i| res.resolve_pixmap(i))?;
                let natural = pixmap.0.rect();
                s.draw_pixmap(placement.target(natural), pixmap, placement.source(natural));
            }
            Command::DrawImage {
                placement,
                image,
                flags,
            } => {
                let image = materialize(&image, |i| res.resolve_image(i))?;
                let natural = image.0.rect();
                let target = placement.target(natural);
                let source = match placement {
                    // Rect placements sample the top-left corner at 1:1.
                    Placement::Into(r) => RectF::new(0.0, 0.0, r.width, r.height),
                    other => other.source(natural),
                };
                s.draw_image(target, image, source, flags);
            }
            Command::DrawTiledPixmap {
                rect,
                pixmap,
                offset,
            } => {
                let pixmap = materialize(&pixmap, |i| res.resolve_pixmap(i))?;
                s.draw_tiled_pixmap(rect, pixmap, offset);
            }
            Command::DrawPath(path) => s.draw_path(&path),
            Command::Save => s.save(),
            Command::Restore => s.restore(),
            Command::SetBkColor(c) => s.set_background(c),
            Command::SetBkMode(mode) => s.set_background_mode(mode),
            Command::SetBrushOrigin(p) => s.set_brush_origin(p),
            Command::SetFont(font) => s.set_font(&font),
            Command::SetPen(pen) => s.set_pen(materialize(&pen, |i| res.resolve_pen(i))?),
            Command::SetBrush(brush) => {
                s.set_brush(materialize(&brush, |i| res.resolve_brush(i))?)
            }
            Command::SetVXform(on) => s.set_view_transform_enabled(on),
            Command::SetWindow(r) => s.set_window(r.to_rect()),
            Command::SetViewport(r) => s.set_viewport(r.to_rect()),
            Command::SetWXform(on) => s.set_world_transform_enabled(on),
            Command::SetWMatrix { matrix, combine } => s.set_transform(matrix * self.world, combine),
            Command::SetClip(on) | Command::SetClipEnabled(on) => s.set_clipping(on),
            Command::SetClipRegion { region, op } => s.set_clip_region(&region, op),
            Command::SetClipPath { path, op } => s.set_clip_path(&path, op),
            Command::SetRenderHint(hints) => {
                for hint in [
                    RenderHints::ANTIALIASING,
                    RenderHints::SMOOTH_PIXMAP_TRANSFORM,
                ] {
                    s.set_render_hint(hint, hints.contains(hint));
                }
            }
            Command::SetCompositionMode(mode) => s.set_composition_mode(mode),
            Command::SetOpacity(o) => s.set_opacity(o),
            Command::Begin { .. } | Command::End => {
                return Err(ReplayError::structure("block marker outside block handling"));
            }
        }
        Ok(())
    }

    fn draw_text_item(&mut self, item: &TextItem) {
        if !self.version.text_item_extras() {
            self.surface.draw_text_layout(
                &item.font,
                RectF::from_origin(item.at, 1.0, 1.0),
                TextFlags::SINGLE_LINE | TextFlags::DONT_CLIP,
                &item.text,
            );
            return;
        }

        let font: Font = if item.scale != 1.0 {
            let device = MetricDevice::scaled(self.config.reference_dpi, item.scale);
            item.font.for_device(&device)
        } else {
            item.font.clone()
        };

        let mut flags =
            TextFlags::SINGLE_LINE | TextFlags::DONT_CLIP | TextFlags::FORCE_LEFT_TO_RIGHT;
        let mut width = 1.0;
        if item.justification_width > 0.0 {
            width = item.justification_width;
            flags |= TextFlags::JUSTIFICATION_FORCED | TextFlags::ALIGN_JUSTIFY;
        }

        let ascent = self.surface.font_ascent(&font);
        let origin = PointF::new(item.at.x, item.at.y - ascent);
        self.surface.draw_text_layout(
            &font,
            RectF::from_origin(origin, width, 1.0),
            flags,
            &item.text,
        );
    }
}

fn read_u32(input: &mut &[u8]) -> Result<u32, ReplayError> {
    input
        .read_u32::<BigEndian>()
        .map_err(|e| ReplayError::from(e).from_payload_read("top-level record count"))
}
