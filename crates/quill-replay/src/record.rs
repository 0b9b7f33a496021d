//! Record framing and the per-command payload encodings.
//!
//! A record is a one-byte command code, a length, and a payload of exactly
//! that many bytes. Lengths below 255 take one byte; longer payloads write
//! `0xFF` followed by a `u32`.
//!
//! Each command has a single encode arm and a single decode arm, both
//! driven by the same [`FormatVersion`] predicates, so the two sides cannot
//! disagree about a layout.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use quill_core::{
    BackgroundMode, ClipOperation, CompositionMode, FillRule, Image, ImageConversionFlags, LineF,
    Pixmap, Point, RectF, RenderHints,
};

use crate::codec::*;
use crate::command::{Command, CommandCode, Placement, Resource, TextItem};
use crate::error::{ReplayError, ResourceKind};
use crate::header::FormatInfo;
use crate::version::{BitmapLayout, FormatVersion};

/// Length byte announcing a following `u32` length.
pub const LONG_LENGTH: u8 = 0xFF;

/// Code and payload length of one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    /// Raw command code; may not be a known [`CommandCode`].
    pub code: u8,
    /// Payload length in bytes.
    pub len: u32,
}

impl RecordHeader {
    /// The known command for this record, if any.
    pub fn command(&self) -> Option<CommandCode> {
        CommandCode::from_repr(self.code)
    }
}

/// Read a record header.
pub fn read_record_header<R: Read>(r: &mut R) -> Result<RecordHeader, ReplayError> {
    let code = r.read_u8()?;
    let len = match r.read_u8()? {
        LONG_LENGTH => r.read_u32::<BigEndian>()?,
        short => u32::from(short),
    };
    Ok(RecordHeader { code, len })
}

/// Write a complete record: header plus payload.
pub fn write_record<W: Write>(w: &mut W, code: u8, payload: &[u8]) -> Result<(), ReplayError> {
    w.write_u8(code)?;
    match u8::try_from(payload.len()) {
        Ok(short) if short < LONG_LENGTH => w.write_u8(short)?,
        _ => {
            let len = u32::try_from(payload.len()).map_err(|_| {
                ReplayError::structure(format!("record payload too large ({})", payload.len()))
            })?;
            w.write_u8(LONG_LENGTH)?;
            w.write_u32::<BigEndian>(len)?;
        }
    }
    w.write_all(payload)?;
    Ok(())
}

/// Encode `cmd` as a complete record for `version`.
///
/// `resident` selects the memory-resident layout, in which pens and
/// brushes (and, from major 6, pixmaps and images) are table indices.
/// A [`Resource`] that contradicts the mode is a structural error.
pub fn encode_command(
    cmd: &Command,
    version: FormatVersion,
    resident: bool,
) -> Result<Vec<u8>, ReplayError> {
    let payload = encode_payload(cmd, version, resident)?;
    let mut out = Vec::with_capacity(payload.len() + 6);
    write_record(&mut out, cmd.code() as u8, &payload)?;
    Ok(out)
}

/// Decode one complete record from the front of `input`, advancing it.
///
/// Unknown command codes are a structural error here; the player skips
/// them instead of calling this.
pub fn decode_command(
    input: &mut &[u8],
    version: FormatVersion,
    resident: bool,
) -> Result<Command, ReplayError> {
    let header = read_record_header(input)
        .map_err(|e| e.from_payload_read("record header"))?;
    let payload = take_payload(input, header.len)?;
    let code = header
        .command()
        .ok_or_else(|| ReplayError::structure(format!("unknown command {}", header.code)))?;
    decode_payload(code, payload, version, resident)
}

/// Decode every record of a recording in stream order.
///
/// Nested blocks are flattened: each `Begin` and `End` appears as its own
/// command. The header is assumed valid for `version`; block counts are
/// not checked. Useful for inspecting a recording without a surface.
pub fn decode_command_stream(
    buf: &[u8],
    version: FormatVersion,
    resident: bool,
) -> Result<Vec<Command>, ReplayError> {
    let start = FormatInfo::count_offset_for(version) + 4;
    let mut input = buf
        .get(start..)
        .ok_or_else(|| ReplayError::structure("recording ends inside its header"))?;
    let mut out = Vec::new();
    while !input.is_empty() {
        out.push(decode_command(&mut input, version, resident)?);
    }
    Ok(out)
}

/// Split the next `len` bytes off `input`.
pub(crate) fn take_payload<'a>(input: &mut &'a [u8], len: u32) -> Result<&'a [u8], ReplayError> {
    let len = len as usize;
    if input.len() < len {
        return Err(ReplayError::structure(format!(
            "record length {len} exceeds the {} bytes remaining",
            input.len()
        )));
    }
    let (payload, rest) = input.split_at(len);
    *input = rest;
    Ok(payload)
}

/// Decode a payload that must be consumed exactly.
pub fn decode_payload(
    code: CommandCode,
    payload: &[u8],
    version: FormatVersion,
    resident: bool,
) -> Result<Command, ReplayError> {
    let mut cursor = payload;
    let cmd = read_operands(code, &mut cursor, version, resident)
        .map_err(|e| e.from_payload_read(code.name()))?;
    if !cursor.is_empty() {
        return Err(ReplayError::structure(format!(
            "{}: record length mismatch ({} of {} payload bytes unread)",
            code.name(),
            cursor.len(),
            payload.len()
        )));
    }
    Ok(cmd)
}

// ── Resource operands ───────────────────────────────────────────

fn read_index<R: Read>(r: &mut R) -> Result<i32, ReplayError> {
    Ok(r.read_i32::<BigEndian>()?)
}

fn read_resource<R: Read, T>(
    r: &mut R,
    indexed: bool,
    inline: impl FnOnce(&mut R) -> Result<T, ReplayError>,
) -> Result<Resource<T>, ReplayError> {
    if indexed {
        Ok(Resource::Indexed(read_index(r)?))
    } else {
        Ok(Resource::Inline(inline(r)?))
    }
}

fn write_resource<W: Write, T>(
    w: &mut W,
    res: &Resource<T>,
    indexed: bool,
    kind: ResourceKind,
    inline: impl FnOnce(&mut W, &T) -> Result<(), ReplayError>,
) -> Result<(), ReplayError> {
    match (res, indexed) {
        (Resource::Indexed(i), true) => {
            w.write_i32::<BigEndian>(*i)?;
            Ok(())
        }
        (Resource::Inline(v), false) => inline(w, v),
        (Resource::Indexed(_), false) => Err(ReplayError::structure(format!(
            "{kind} index written to a record that stores {kind}s inline"
        ))),
        (Resource::Inline(_), true) => Err(ReplayError::structure(format!(
            "inline {kind} written to a record that stores {kind}s by index"
        ))),
    }
}

fn read_image<R: Read>(r: &mut R) -> Result<Image, ReplayError> {
    Ok(Image(read_bitmap(r)?))
}

fn read_pixmap<R: Read>(r: &mut R) -> Result<Pixmap, ReplayError> {
    Ok(Pixmap(read_bitmap(r)?))
}

fn read_clip_op<R: Read>(r: &mut R) -> Result<ClipOperation, ReplayError> {
    let raw = r.read_i8()?;
    u8::try_from(raw)
        .ok()
        .and_then(ClipOperation::from_repr)
        .ok_or_else(|| ReplayError::structure(format!("invalid clip operation {raw}")))
}

// ── Decode ──────────────────────────────────────────────────────

fn read_arc<R: Read>(r: &mut R, v: FormatVersion) -> Result<(RectF, i16, i16), ReplayError> {
    let rect = read_rect(r, v)?;
    let start = r.read_i16::<BigEndian>()?;
    let span = r.read_i16::<BigEndian>()?;
    Ok((rect, start, span))
}

fn read_operands<R: Read>(
    code: CommandCode,
    r: &mut R,
    v: FormatVersion,
    resident: bool,
) -> Result<Command, ReplayError> {
    use CommandCode as C;
    let bitmap_indexed = resident && v.indexed_bitmaps();
    Ok(match code {
        C::Nop => Command::Nop,
        C::DrawPoint => Command::DrawPoint(read_point(r, v)?),
        C::DrawLine => {
            let p1 = read_point(r, v)?;
            let p2 = read_point(r, v)?;
            Command::DrawLine(LineF::new(p1, p2))
        }
        C::DrawRect => Command::DrawRect(read_rect(r, v)?),
        C::DrawRoundRect => Command::DrawRoundRect {
            rect: read_rect(r, v)?,
            x_radius: r.read_i16::<BigEndian>()?,
            y_radius: r.read_i16::<BigEndian>()?,
        },
        C::DrawEllipse => Command::DrawEllipse(read_rect(r, v)?),
        C::DrawArc => {
            let (rect, start, span) = read_arc(r, v)?;
            Command::DrawArc { rect, start, span }
        }
        C::DrawPie => {
            let (rect, start, span) = read_arc(r, v)?;
            Command::DrawPie { rect, start, span }
        }
        C::DrawChord => {
            let (rect, start, span) = read_arc(r, v)?;
            Command::DrawChord { rect, start, span }
        }
        C::DrawLineSegments => Command::DrawLineSegments(read_ipolygon(r)?),
        C::DrawPolyline => Command::DrawPolyline(read_polygon(r, v)?),
        C::DrawPolygon => {
            let points = read_polygon(r, v)?;
            let fill = if read_flag(r)? {
                FillRule::Winding
            } else {
                FillRule::OddEven
            };
            Command::DrawPolygon { points, fill }
        }
        C::DrawCubicBezier => {
            let points = read_ipolygon(r)?;
            let points: [Point; 4] = points.try_into().map_err(|p: Vec<Point>| {
                ReplayError::structure(format!("cubic bezier needs 4 points, got {}", p.len()))
            })?;
            Command::DrawCubicBezier(points)
        }
        C::DrawText => Command::DrawText {
            at: read_ipoint(r)?,
            text: read_latin1(r)?,
        },
        C::DrawTextFormatted => Command::DrawTextFormatted {
            rect: read_irect(r)?,
            flags: r.read_i16::<BigEndian>()?,
            text: read_latin1(r)?,
        },
        C::DrawPixmap => match v.bitmap_layout() {
            BitmapLayout::Point => Command::DrawPixmap {
                placement: Placement::At(read_ipoint(r)?.to_f()),
                pixmap: Resource::Inline(read_pixmap(r)?),
            },
            BitmapLayout::Rect => Command::DrawPixmap {
                placement: Placement::Into(read_irect(r)?.to_f()),
                pixmap: Resource::Inline(read_pixmap(r)?),
            },
            BitmapLayout::Mapped => {
                let target = read_frect(r)?;
                let pixmap = read_resource(r, bitmap_indexed, read_pixmap)?;
                let source = read_frect(r)?;
                Command::DrawPixmap {
                    placement: Placement::Mapped { target, source },
                    pixmap,
                }
            }
        },
        C::DrawImage => match v.bitmap_layout() {
            BitmapLayout::Point => Command::DrawImage {
                placement: Placement::At(read_fpoint(r)?),
                image: Resource::Inline(read_image(r)?),
                flags: ImageConversionFlags::empty(),
            },
            BitmapLayout::Rect => Command::DrawImage {
                placement: Placement::Into(read_irect(r)?.to_f()),
                image: Resource::Inline(read_image(r)?),
                flags: ImageConversionFlags::empty(),
            },
            BitmapLayout::Mapped => {
                let target = read_frect(r)?;
                let image = read_resource(r, bitmap_indexed, read_image)?;
                let source = read_frect(r)?;
                let flags = ImageConversionFlags::from_bits_retain(r.read_u32::<BigEndian>()?);
                Command::DrawImage {
                    placement: Placement::Mapped { target, source },
                    image,
                    flags,
                }
            }
        },
        C::DrawText2 => Command::DrawText2 {
            at: read_point(r, v)?,
            text: read_string(r)?,
        },
        C::DrawText2Formatted => Command::DrawText2Formatted {
            rect: read_irect(r)?,
            flags: r.read_i16::<BigEndian>()?,
            text: read_string(r)?,
        },
        C::DrawTextItem => {
            let at = read_fpoint(r)?;
            let text = read_string(r)?;
            let font = read_font(r)?;
            let layout_flags = r.read_u32::<BigEndian>()?;
            let (scale, justification_width) = if v.text_item_extras() {
                (r.read_f64::<BigEndian>()?, r.read_f64::<BigEndian>()?)
            } else {
                (1.0, 0.0)
            };
            Command::DrawTextItem(TextItem {
                at,
                text,
                font,
                layout_flags,
                scale,
                justification_width,
            })
        }
        C::DrawTiledPixmap => {
            let rect = read_frect(r)?;
            let pixmap = read_resource(r, resident, read_pixmap)?;
            let offset = read_fpoint(r)?;
            Command::DrawTiledPixmap {
                rect,
                pixmap,
                offset,
            }
        }
        C::DrawPath => Command::DrawPath(read_path(r)?),
        C::Begin => Command::Begin {
            records: r.read_u32::<BigEndian>()?,
        },
        C::End => Command::End,
        C::Save => Command::Save,
        C::Restore => Command::Restore,
        C::SetBkColor => Command::SetBkColor(read_color(r)?),
        C::SetBkMode => {
            let raw = r.read_i8()?;
            let mode = u8::try_from(raw)
                .ok()
                .and_then(BackgroundMode::from_repr)
                .ok_or_else(|| ReplayError::structure(format!("invalid background mode {raw}")))?;
            Command::SetBkMode(mode)
        }
        C::SetRop => Command::SetRop(r.read_i8()?),
        C::SetBrushOrigin => Command::SetBrushOrigin(read_point(r, v)?),
        C::SetFont => Command::SetFont(read_font(r)?),
        C::SetPen => Command::SetPen(read_resource(r, resident, read_pen)?),
        C::SetBrush => Command::SetBrush(read_resource(r, resident, read_brush)?),
        C::SetVXform => Command::SetVXform(read_flag(r)?),
        C::SetWindow => Command::SetWindow(read_rect(r, v)?),
        C::SetViewport => Command::SetViewport(read_rect(r, v)?),
        C::SetWXform => Command::SetWXform(read_flag(r)?),
        C::SetWMatrix => Command::SetWMatrix {
            matrix: read_transform(r, v)?,
            combine: read_flag(r)?,
        },
        C::SetClip => Command::SetClip(read_flag(r)?),
        C::SetClipRegion => {
            let region = read_region(r)?;
            let op = if v.region_clip_op() {
                read_clip_op(r)?
            } else {
                // Stored but never honoured before major 9.
                r.read_i8()?;
                ClipOperation::Replace
            };
            Command::SetClipRegion { region, op }
        }
        C::SetClipPath => Command::SetClipPath {
            path: read_path(r)?,
            op: read_clip_op(r)?,
        },
        C::SetRenderHint => {
            Command::SetRenderHint(RenderHints::from_bits_retain(r.read_u32::<BigEndian>()?))
        }
        C::SetCompositionMode => {
            Command::SetCompositionMode(CompositionMode(r.read_u32::<BigEndian>()?))
        }
        C::SetClipEnabled => Command::SetClipEnabled(read_bool(r)?),
        C::SetOpacity => Command::SetOpacity(r.read_f64::<BigEndian>()?),
    })
}

// ── Encode ──────────────────────────────────────────────────────

fn write_arc<W: Write>(
    w: &mut W,
    v: FormatVersion,
    rect: RectF,
    start: i16,
    span: i16,
) -> Result<(), ReplayError> {
    write_rect(w, v, rect)?;
    w.write_i16::<BigEndian>(start)?;
    w.write_i16::<BigEndian>(span)?;
    Ok(())
}

/// Encode only the payload of `cmd`.
pub fn encode_payload(
    cmd: &Command,
    v: FormatVersion,
    resident: bool,
) -> Result<Vec<u8>, ReplayError> {
    let mut w = Vec::new();
    let bitmap_indexed = resident && v.indexed_bitmaps();
    match cmd {
        Command::Nop | Command::End | Command::Save | Command::Restore => {}
        Command::DrawPoint(p) => write_point(&mut w, v, *p)?,
        Command::DrawLine(line) => {
            write_point(&mut w, v, line.p1)?;
            write_point(&mut w, v, line.p2)?;
        }
        Command::DrawRect(rect) | Command::DrawEllipse(rect) => write_rect(&mut w, v, *rect)?,
        Command::DrawRoundRect {
            rect,
            x_radius,
            y_radius,
        } => write_arc(&mut w, v, *rect, *x_radius, *y_radius)?,
        Command::DrawArc { rect, start, span }
        | Command::DrawPie { rect, start, span }
        | Command::DrawChord { rect, start, span } => write_arc(&mut w, v, *rect, *start, *span)?,
        Command::DrawLineSegments(points) => write_ipolygon(&mut w, points)?,
        Command::DrawPolyline(points) => write_polygon(&mut w, v, points)?,
        Command::DrawPolygon { points, fill } => {
            write_polygon(&mut w, v, points)?;
            write_flag(&mut w, *fill == FillRule::Winding)?;
        }
        Command::DrawCubicBezier(points) => write_ipolygon(&mut w, points)?,
        Command::DrawText { at, text } => {
            write_ipoint(&mut w, *at)?;
            write_latin1(&mut w, text)?;
        }
        Command::DrawTextFormatted { rect, flags, text } => {
            write_irect(&mut w, *rect)?;
            w.write_i16::<BigEndian>(*flags)?;
            write_latin1(&mut w, text)?;
        }
        Command::DrawPixmap { placement, pixmap } => {
            let natural = pixmap.inline().map(|p| p.0.rect()).unwrap_or_default();
            write_placed(
                &mut w,
                v,
                placement,
                natural,
                |w, target, source| {
                    write_frect(w, target)?;
                    write_resource(w, pixmap, bitmap_indexed, ResourceKind::Pixmap, |w, p| {
                        write_bitmap(w, &p.0)
                    })?;
                    write_frect(w, source)
                },
                |w| match pixmap {
                    Resource::Inline(p) => write_bitmap(w, &p.0),
                    Resource::Indexed(_) => Err(legacy_index(ResourceKind::Pixmap, v)),
                },
                false,
            )?;
        }
        Command::DrawImage {
            placement,
            image,
            flags,
        } => {
            let natural = image.inline().map(|i| i.0.rect()).unwrap_or_default();
            write_placed(
                &mut w,
                v,
                placement,
                natural,
                |w, target, source| {
                    write_frect(w, target)?;
                    write_resource(w, image, bitmap_indexed, ResourceKind::Image, |w, i| {
                        write_bitmap(w, &i.0)
                    })?;
                    write_frect(w, source)?;
                    w.write_u32::<BigEndian>(flags.bits())?;
                    Ok(())
                },
                |w| match image {
                    Resource::Inline(i) => write_bitmap(w, &i.0),
                    Resource::Indexed(_) => Err(legacy_index(ResourceKind::Image, v)),
                },
                true,
            )?;
        }
        Command::DrawText2 { at, text } => {
            write_point(&mut w, v, *at)?;
            write_string(&mut w, text)?;
        }
        Command::DrawText2Formatted { rect, flags, text } => {
            write_irect(&mut w, *rect)?;
            w.write_i16::<BigEndian>(*flags)?;
            write_string(&mut w, text)?;
        }
        Command::DrawTextItem(item) => {
            write_fpoint(&mut w, item.at)?;
            write_string(&mut w, &item.text)?;
            write_font(&mut w, &item.font)?;
            w.write_u32::<BigEndian>(item.layout_flags)?;
            if v.text_item_extras() {
                w.write_f64::<BigEndian>(item.scale)?;
                w.write_f64::<BigEndian>(item.justification_width)?;
            }
        }
        Command::DrawTiledPixmap {
            rect,
            pixmap,
            offset,
        } => {
            write_frect(&mut w, *rect)?;
            write_resource(&mut w, pixmap, resident, ResourceKind::Pixmap, |w, p| {
                write_bitmap(w, &p.0)
            })?;
            write_fpoint(&mut w, *offset)?;
        }
        Command::DrawPath(path) => write_path(&mut w, path)?,
        Command::Begin { records } => w.write_u32::<BigEndian>(*records)?,
        Command::SetBkColor(c) => write_color(&mut w, *c)?,
        Command::SetBkMode(mode) => w.write_i8(*mode as i8)?,
        Command::SetRop(rop) => w.write_i8(*rop)?,
        Command::SetBrushOrigin(p) => write_point(&mut w, v, *p)?,
        Command::SetFont(font) => write_font(&mut w, font)?,
        Command::SetPen(pen) => write_resource(&mut w, pen, resident, ResourceKind::Pen, |w, p| {
            write_pen(w, p)
        })?,
        Command::SetBrush(brush) => {
            write_resource(&mut w, brush, resident, ResourceKind::Brush, |w, b| {
                write_brush(w, b)
            })?
        }
        Command::SetVXform(on)
        | Command::SetWXform(on)
        | Command::SetClip(on) => write_flag(&mut w, *on)?,
        Command::SetWindow(rect) | Command::SetViewport(rect) => write_rect(&mut w, v, *rect)?,
        Command::SetWMatrix { matrix, combine } => {
            write_transform(&mut w, v, matrix)?;
            write_flag(&mut w, *combine)?;
        }
        Command::SetClipRegion { region, op } => {
            write_region(&mut w, region)?;
            w.write_i8(*op as i8)?;
        }
        Command::SetClipPath { path, op } => {
            write_path(&mut w, path)?;
            w.write_i8(*op as i8)?;
        }
        Command::SetRenderHint(hints) => w.write_u32::<BigEndian>(hints.bits())?,
        Command::SetCompositionMode(mode) => w.write_u32::<BigEndian>(mode.0)?,
        Command::SetClipEnabled(on) => write_bool(&mut w, *on)?,
        Command::SetOpacity(o) => w.write_f64::<BigEndian>(*o)?,
    }
    Ok(w)
}

fn legacy_index(kind: ResourceKind, v: FormatVersion) -> ReplayError {
    ReplayError::structure(format!(
        "{kind} index cannot be stored in format {v}; bitmaps are inline before major 6"
    ))
}

/// Write a pixmap or image placement in the version's layout.
///
/// Point layouts write an integer point for pixmaps and a float point for
/// images; rect layouts write an integer target rectangle.
fn write_placed<W: Write>(
    w: &mut W,
    v: FormatVersion,
    placement: &Placement,
    natural: RectF,
    mapped: impl FnOnce(&mut W, RectF, RectF) -> Result<(), ReplayError>,
    bitmap: impl FnOnce(&mut W) -> Result<(), ReplayError>,
    float_point: bool,
) -> Result<(), ReplayError> {
    match v.bitmap_layout() {
        BitmapLayout::Point => {
            let origin = placement.origin();
            if float_point {
                write_fpoint(w, origin)?;
            } else {
                write_ipoint(w, origin.round())?;
            }
            bitmap(w)
        }
        BitmapLayout::Rect => {
            write_irect(w, placement.target(natural).to_rect())?;
            bitmap(w)
        }
        BitmapLayout::Mapped => mapped(w, placement.target(natural), placement.source(natural)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{Pen, PointF, Rect, Region};

    const V9: FormatVersion = FormatVersion::major(9);

    #[test]
    fn short_and_long_lengths() {
        let mut short = Vec::new();
        write_record(&mut short, 5, &[0u8; 254]).unwrap();
        assert_eq!(&short[..2], &[5, 254]);
        assert_eq!(short.len(), 256);

        let mut long = Vec::new();
        write_record(&mut long, 5, &[0u8; 255]).unwrap();
        assert_eq!(&long[..6], &[5, 0xff, 0, 0, 0, 255]);
        let header = read_record_header(&mut long.as_slice()).unwrap();
        assert_eq!(header, RecordHeader { code: 5, len: 255 });
    }

    #[test]
    fn draw_rect_v9_layout() {
        let bytes =
            encode_command(&Command::DrawRect(RectF::new(0.0, 0.0, 10.0, 10.0)), V9, false)
                .unwrap();
        assert_eq!(bytes[0], CommandCode::DrawRect as u8);
        assert_eq!(bytes[1], 32);
        assert_eq!(bytes.len(), 34);
    }

    #[test]
    fn trailing_payload_bytes_are_a_length_mismatch() {
        let mut bytes = Vec::new();
        write_record(&mut bytes, CommandCode::Save as u8, &[1, 2]).unwrap();
        let err = decode_command(&mut bytes.as_slice(), V9, false).unwrap_err();
        assert!(matches!(err, ReplayError::Structure { ref detail } if detail.contains("length mismatch")));
    }

    #[test]
    fn short_payload_is_a_length_mismatch() {
        let mut bytes = Vec::new();
        write_record(&mut bytes, CommandCode::SetOpacity as u8, &[0, 0, 0]).unwrap();
        let err = decode_command(&mut bytes.as_slice(), V9, false).unwrap_err();
        assert!(matches!(err, ReplayError::Structure { ref detail } if detail.contains("over-read")));
    }

    #[test]
    fn length_beyond_input_is_structure_error() {
        let bytes = [CommandCode::DrawRect as u8, 32, 0, 0];
        let err = decode_command(&mut bytes.as_slice(), V9, false).unwrap_err();
        assert!(matches!(err, ReplayError::Structure { .. }));
    }

    #[test]
    fn residency_mismatch_rejected_on_encode() {
        let inline = Command::SetPen(Resource::Inline(Pen::default()));
        assert!(encode_command(&inline, V9, true).is_err());
        let indexed = Command::SetPen(Resource::Indexed(0));
        assert!(encode_command(&indexed, V9, false).is_err());
        let legacy_pixmap = Command::DrawPixmap {
            placement: Placement::At(PointF::new(0.0, 0.0)),
            pixmap: Resource::Indexed(0),
        };
        assert!(encode_command(&legacy_pixmap, FormatVersion::major(5), true).is_err());
    }

    #[test]
    fn resident_pen_is_four_byte_index() {
        let bytes = encode_command(&Command::SetPen(Resource::Indexed(7)), V9, true).unwrap();
        assert_eq!(bytes, [CommandCode::SetPen as u8, 4, 0, 0, 0, 7]);
    }

    #[test]
    fn legacy_region_clip_op_byte_is_not_validated() {
        let region = Region::from_rect(Rect::new(0, 0, 5, 5));
        let mut payload = Vec::new();
        write_region(&mut payload, &region).unwrap();
        payload.push(3);

        let v8 = FormatVersion::major(8);
        let cmd = decode_payload(CommandCode::SetClipRegion, &payload, v8, false).unwrap();
        assert_eq!(
            cmd,
            Command::SetClipRegion {
                region,
                op: ClipOperation::Replace,
            }
        );
        let err = decode_payload(CommandCode::SetClipRegion, &payload, V9, false).unwrap_err();
        assert!(matches!(err, ReplayError::Structure { ref detail } if detail.contains("clip operation 3")));
    }

    #[test]
    fn cubic_bezier_needs_four_points() {
        let mut payload = Vec::new();
        write_ipolygon(&mut payload, &[Point::new(0, 0); 3]).unwrap();
        let err = decode_payload(CommandCode::DrawCubicBezier, &payload, V9, false).unwrap_err();
        assert!(matches!(err, ReplayError::Structure { .. }));
    }

    #[test]
    fn text_item_extras_only_from_major_9() {
        let item = TextItem {
            scale: 2.0,
            justification_width: 50.0,
            ..TextItem::new(PointF::new(1.0, 2.0), "hi", quill_core::Font::new("Sans", 10.0))
        };
        let cmd = Command::DrawTextItem(item.clone());
        let v8 = encode_payload(&cmd, FormatVersion::major(8), false).unwrap();
        let v9 = encode_payload(&cmd, V9, false).unwrap();
        assert_eq!(v9.len(), v8.len() + 16);
        let back = decode_payload(CommandCode::DrawTextItem, &v8, FormatVersion::major(8), false)
            .unwrap();
        assert_eq!(
            back,
            Command::DrawTextItem(TextItem {
                scale: 1.0,
                justification_width: 0.0,
                ..item
            })
        );
    }
}
