//! Reusable recording fixtures.
//!
//! - [`sample_commands`]: one of nearly every command, chosen so each
//!   survives an encode/decode cycle at the given version unchanged.
//! - [`record_sample`]: drives a [`Recorder`] through its resource-aware
//!   helpers and a nested block.
//! - [`raw_recording`]: hand-assembles a stamped recording around an
//!   arbitrary record body, for streams a `Recorder` refuses to write.

use quill_core::{
    BackgroundMode, Brush, BrushStyle, ClipOperation, Color, CompositionMode, FillRule, Font,
    FontStyle, Image, ImageConversionFlags, LineF, Path, Pen, PenStyle, Pixmap, Point, PointF,
    Rect, RectF, Region, RenderHints, Transform,
};
use quill_replay::checksum::stamp;
use quill_replay::{
    Command, CommandCode, FormatVersion, Placement, Recorder, ReplayError, Resource, TextItem,
    MAGIC,
};

pub fn sample_pen() -> Pen {
    Pen {
        style: PenStyle::Dash,
        ..Pen::solid(Color::rgb(200, 10, 10), 2.5)
    }
}

pub fn sample_brush() -> Brush {
    Brush {
        style: BrushStyle::Dense4,
        color: Color::rgba(0, 128, 255, 200),
    }
}

pub fn sample_pixmap() -> Pixmap {
    Pixmap::new(4, 3, (0..12).collect())
}

pub fn sample_image() -> Image {
    Image::new(2, 2, vec![9, 8, 7, 6])
}

pub fn sample_font() -> Font {
    Font {
        weight: quill_core::text::WEIGHT_BOLD,
        style: FontStyle::ITALIC,
        ..Font::new("Sans", 12.0)
    }
}

fn sample_path() -> Path {
    let mut path = Path::new();
    path.move_to(PointF::new(0.0, 0.0));
    path.line_to(PointF::new(20.0, 0.0));
    path.cubic_to(
        PointF::new(25.0, 5.0),
        PointF::new(25.0, 15.0),
        PointF::new(20.0, 20.0),
    );
    path
}

/// Inline commands that round-trip exactly at `version`.
///
/// Coordinates are whole numbers so integer-coordinate majors lose
/// nothing, and every version-gated operand is given the value the
/// decoder reconstructs for versions that do not store it.
pub fn sample_commands(version: FormatVersion) -> Vec<Command> {
    let rect = RectF::new(10.0, 20.0, 30.0, 40.0);
    let pixmap_placement = match version.major {
        0..=3 => Placement::At(PointF::new(5.0, 6.0)),
        4 | 5 => Placement::Into(RectF::new(5.0, 6.0, 8.0, 6.0)),
        _ => Placement::Mapped {
            target: RectF::new(5.0, 6.0, 8.0, 6.0),
            source: RectF::new(1.0, 1.0, 2.0, 2.0),
        },
    };
    let image_placement = match version.major {
        0..=3 => Placement::At(PointF::new(60.0, 70.0)),
        4 | 5 => Placement::Into(RectF::new(60.0, 70.0, 4.0, 4.0)),
        _ => Placement::Mapped {
            target: RectF::new(60.0, 70.0, 4.0, 4.0),
            source: RectF::new(0.0, 0.0, 2.0, 2.0),
        },
    };
    let image_flags = if version.indexed_bitmaps() {
        ImageConversionFlags::ORDERED_DITHER
    } else {
        ImageConversionFlags::empty()
    };
    let matrix = if version.projective_transform() {
        Transform::new(1.0, 0.0, 0.001, 0.0, 1.0, 0.0, 3.0, 4.0, 1.0)
    } else {
        Transform::affine(2.0, 0.0, 0.0, 2.0, 3.0, 4.0)
    };
    let region_op = if version.region_clip_op() {
        ClipOperation::Intersect
    } else {
        ClipOperation::Replace
    };
    let mut item = TextItem::new(PointF::new(15.0, 90.0), "shaped", sample_font());
    item.layout_flags = 0x10;
    if version.text_item_extras() {
        item.scale = 2.0;
        item.justification_width = 120.0;
    }

    vec![
        Command::Nop,
        Command::Save,
        Command::SetPen(Resource::Inline(sample_pen())),
        Command::SetBrush(Resource::Inline(sample_brush())),
        Command::SetFont(sample_font()),
        Command::SetBkColor(Color::WHITE),
        Command::SetBkMode(BackgroundMode::Opaque),
        Command::SetBrushOrigin(PointF::new(2.0, 3.0)),
        Command::SetRop(3),
        Command::SetRenderHint(RenderHints::ANTIALIASING),
        Command::SetCompositionMode(CompositionMode::MULTIPLY),
        Command::SetOpacity(0.5),
        Command::SetVXform(true),
        Command::SetWindow(RectF::new(0.0, 0.0, 100.0, 100.0)),
        Command::SetViewport(RectF::new(0.0, 0.0, 200.0, 200.0)),
        Command::SetWXform(true),
        Command::SetWMatrix {
            matrix,
            combine: true,
        },
        Command::SetClip(true),
        Command::SetClipRegion {
            region: Region::from_rect(Rect::new(0, 0, 50, 50)),
            op: region_op,
        },
        Command::SetClipPath {
            path: sample_path(),
            op: ClipOperation::Replace,
        },
        Command::SetClipEnabled(false),
        Command::DrawPoint(PointF::new(1.0, 2.0)),
        Command::DrawLine(LineF::new(PointF::new(0.0, 0.0), PointF::new(10.0, 10.0))),
        Command::DrawRect(rect),
        Command::DrawRoundRect {
            rect,
            x_radius: 25,
            y_radius: 50,
        },
        Command::DrawEllipse(rect),
        Command::DrawArc {
            rect,
            start: 0,
            span: 90 * 16,
        },
        Command::DrawPie {
            rect,
            start: 45 * 16,
            span: 180 * 16,
        },
        Command::DrawChord {
            rect,
            start: -30 * 16,
            span: 60 * 16,
        },
        Command::DrawLineSegments(vec![
            Point::new(0, 0),
            Point::new(5, 5),
            Point::new(10, 0),
            Point::new(15, 5),
        ]),
        Command::DrawPolyline(vec![
            PointF::new(0.0, 0.0),
            PointF::new(4.0, 8.0),
            PointF::new(8.0, 0.0),
        ]),
        Command::DrawPolygon {
            points: vec![
                PointF::new(0.0, 0.0),
                PointF::new(10.0, 0.0),
                PointF::new(5.0, 10.0),
            ],
            fill: FillRule::Winding,
        },
        Command::DrawCubicBezier([
            Point::new(0, 0),
            Point::new(10, 20),
            Point::new(30, 20),
            Point::new(40, 0),
        ]),
        Command::DrawText {
            at: Point::new(5, 15),
            text: "latin text".into(),
        },
        Command::DrawTextFormatted {
            rect: Rect::new(0, 0, 80, 20),
            flags: 0x0104,
            text: "centred".into(),
        },
        Command::DrawText2 {
            at: PointF::new(7.0, 30.0),
            text: "unicode \u{263a}".into(),
        },
        Command::DrawText2Formatted {
            rect: Rect::new(0, 30, 80, 20),
            flags: 0x0001,
            text: "left".into(),
        },
        Command::DrawTextItem(item),
        Command::DrawPixmap {
            placement: pixmap_placement,
            pixmap: Resource::Inline(sample_pixmap()),
        },
        Command::DrawImage {
            placement: image_placement,
            image: Resource::Inline(sample_image()),
            flags: image_flags,
        },
        Command::DrawTiledPixmap {
            rect: RectF::new(0.0, 100.0, 16.0, 16.0),
            pixmap: Resource::Inline(sample_pixmap()),
            offset: PointF::new(1.0, 1.0),
        },
        Command::DrawPath(sample_path()),
        Command::Restore,
    ]
}

/// Record a small scene through the recorder's resource-aware helpers.
///
/// Produces the same replay in inline and memory-resident mode.
pub fn record_sample(rec: &mut Recorder) -> Result<(), ReplayError> {
    rec.set_pen(&sample_pen())?;
    rec.set_brush(&sample_brush())?;
    rec.record(&Command::DrawRect(RectF::new(0.0, 0.0, 64.0, 48.0)))?;
    rec.begin_block()?;
    rec.record(&Command::Save)?;
    rec.set_pen(&Pen::solid(Color::BLACK, 1.0))?;
    rec.draw_pixmap(
        Placement::Into(RectF::new(8.0, 8.0, 8.0, 6.0)),
        &sample_pixmap(),
    )?;
    rec.draw_tiled_pixmap(
        RectF::new(16.0, 16.0, 8.0, 8.0),
        &sample_pixmap(),
        PointF::default(),
    )?;
    rec.record(&Command::Restore)?;
    rec.end_block()?;
    rec.draw_image(
        Placement::At(PointF::new(40.0, 30.0)),
        &sample_image(),
        ImageConversionFlags::empty(),
    )?;
    Ok(())
}

/// Assemble a checksummed recording whose top-level block declares
/// `count` records and holds the raw `body` bytes.
///
/// Nothing about `body` is checked; pair it with [`record`] to frame
/// individual records.
pub fn raw_recording(version: FormatVersion, count: u32, body: &[u8]) -> Vec<u8> {
    let mut buf = MAGIC.to_vec();
    buf.extend_from_slice(&[0, 0]);
    buf.extend_from_slice(&version.major.to_be_bytes());
    buf.extend_from_slice(&version.minor.to_be_bytes());
    buf.extend_from_slice(&[CommandCode::Begin as u8, 4]);
    if version.has_bounding_rect() {
        for v in [0i32, 0, 100, 100] {
            buf.extend_from_slice(&v.to_be_bytes());
        }
    }
    buf.extend_from_slice(&count.to_be_bytes());
    buf.extend_from_slice(body);
    stamp(&mut buf);
    buf
}

/// Frame one raw record with a short length byte.
pub fn record(code: u8, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() < 255, "use a long length for big payloads");
    let mut out = vec![code, payload.len() as u8];
    out.extend_from_slice(payload);
    out
}

/// `End` with an empty payload.
pub fn end() -> Vec<u8> {
    record(CommandCode::End as u8, &[])
}
