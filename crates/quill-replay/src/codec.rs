//! Operand encodings.
//!
//! All multi-byte values are big-endian. Geometry readers and writers take
//! the [`FormatVersion`] and pick the integer or floating-point layout from
//! it; everything else has one layout across all versions. Readers work on
//! any `Read`, which in practice is a payload slice of exactly the declared
//! record length.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use quill_core::{
    Bitmap, Brush, BrushStyle, CapStyle, Color, FillRule, Font, FontStyle, JoinStyle, Path,
    PathElement, PathElementKind, Pen, PenStyle, Point, PointF, Rect, RectF, Region, Transform,
};

use crate::error::ReplayError;
use crate::version::FormatVersion;

/// Length value marking a null string or byte array.
const NULL_LENGTH: u32 = u32::MAX;

/// Upper bound on speculative preallocation for length-prefixed lists.
const MAX_PREALLOC: usize = 1024;

fn bad(detail: impl Into<String>) -> ReplayError {
    ReplayError::structure(detail)
}

fn enum_byte<T>(raw: u8, what: &str, from: impl Fn(u8) -> Option<T>) -> Result<T, ReplayError> {
    from(raw).ok_or_else(|| bad(format!("invalid {what} {raw}")))
}

// ── Scalars ─────────────────────────────────────────────────────

/// Read a one-byte boolean (any non-zero byte is `true`).
pub fn read_bool<R: Read>(r: &mut R) -> Result<bool, ReplayError> {
    Ok(r.read_u8()? != 0)
}

/// Write a one-byte boolean.
pub fn write_bool<W: Write>(w: &mut W, v: bool) -> Result<(), ReplayError> {
    w.write_u8(u8::from(v))?;
    Ok(())
}

/// Read a signed byte flag (any non-zero value is `true`).
pub fn read_flag<R: Read>(r: &mut R) -> Result<bool, ReplayError> {
    Ok(r.read_i8()? != 0)
}

/// Write a signed byte flag.
pub fn write_flag<W: Write>(w: &mut W, v: bool) -> Result<(), ReplayError> {
    w.write_i8(i8::from(v))?;
    Ok(())
}

fn read_len<R: Read>(r: &mut R) -> Result<Option<usize>, ReplayError> {
    match r.read_u32::<BigEndian>()? {
        NULL_LENGTH => Ok(None),
        n => Ok(Some(n as usize)),
    }
}

fn write_len<W: Write>(w: &mut W, len: usize, what: &str) -> Result<(), ReplayError> {
    let len = u32::try_from(len)
        .ok()
        .filter(|&n| n != NULL_LENGTH)
        .ok_or_else(|| bad(format!("{what} too long to encode ({len})")))?;
    w.write_u32::<BigEndian>(len)?;
    Ok(())
}

fn read_exact_vec<R: Read>(r: &mut R, len: usize) -> Result<Vec<u8>, ReplayError> {
    let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC * 64));
    let got = r.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if got != len {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(buf)
}

/// Read a length-prefixed byte array. A null array decodes as empty.
pub fn read_bytes<R: Read>(r: &mut R) -> Result<Vec<u8>, ReplayError> {
    match read_len(r)? {
        None => Ok(Vec::new()),
        Some(len) => read_exact_vec(r, len),
    }
}

/// Write a length-prefixed byte array.
pub fn write_bytes<W: Write>(w: &mut W, b: &[u8]) -> Result<(), ReplayError> {
    write_len(w, b.len(), "byte array")?;
    w.write_all(b)?;
    Ok(())
}

/// Read a UTF-16BE string with a byte-length prefix.
pub fn read_string<R: Read>(r: &mut R) -> Result<String, ReplayError> {
    let Some(len) = read_len(r)? else {
        return Ok(String::new());
    };
    if len % 2 != 0 {
        return Err(bad(format!("odd UTF-16 byte length {len}")));
    }
    let raw = read_exact_vec(r, len)?;
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| bad(format!("invalid UTF-16 string: {e}")))
}

/// Write a UTF-16BE string with a byte-length prefix.
pub fn write_string<W: Write>(w: &mut W, s: &str) -> Result<(), ReplayError> {
    let units: Vec<u16> = s.encode_utf16().collect();
    write_len(w, units.len() * 2, "string")?;
    for u in units {
        w.write_u16::<BigEndian>(u)?;
    }
    Ok(())
}

/// Read a Latin-1 byte array as a string.
pub fn read_latin1<R: Read>(r: &mut R) -> Result<String, ReplayError> {
    Ok(read_bytes(r)?.into_iter().map(char::from).collect())
}

/// Write a string as a Latin-1 byte array; characters outside Latin-1
/// become `?`.
pub fn write_latin1<W: Write>(w: &mut W, s: &str) -> Result<(), ReplayError> {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    write_bytes(w, &bytes)
}

// ── Geometry ────────────────────────────────────────────────────

/// Read an integer point.
pub fn read_ipoint<R: Read>(r: &mut R) -> Result<Point, ReplayError> {
    Ok(Point::new(
        r.read_i32::<BigEndian>()?,
        r.read_i32::<BigEndian>()?,
    ))
}

/// Write an integer point.
pub fn write_ipoint<W: Write>(w: &mut W, p: Point) -> Result<(), ReplayError> {
    w.write_i32::<BigEndian>(p.x)?;
    w.write_i32::<BigEndian>(p.y)?;
    Ok(())
}

/// Read a floating-point point.
pub fn read_fpoint<R: Read>(r: &mut R) -> Result<PointF, ReplayError> {
    Ok(PointF::new(
        r.read_f64::<BigEndian>()?,
        r.read_f64::<BigEndian>()?,
    ))
}

/// Write a floating-point point.
pub fn write_fpoint<W: Write>(w: &mut W, p: PointF) -> Result<(), ReplayError> {
    w.write_f64::<BigEndian>(p.x)?;
    w.write_f64::<BigEndian>(p.y)?;
    Ok(())
}

/// Read an integer rectangle (x, y, width, height).
pub fn read_irect<R: Read>(r: &mut R) -> Result<Rect, ReplayError> {
    Ok(Rect::new(
        r.read_i32::<BigEndian>()?,
        r.read_i32::<BigEndian>()?,
        r.read_i32::<BigEndian>()?,
        r.read_i32::<BigEndian>()?,
    ))
}

/// Write an integer rectangle.
pub fn write_irect<W: Write>(w: &mut W, rect: Rect) -> Result<(), ReplayError> {
    for v in [rect.x, rect.y, rect.width, rect.height] {
        w.write_i32::<BigEndian>(v)?;
    }
    Ok(())
}

/// Read a floating-point rectangle.
pub fn read_frect<R: Read>(r: &mut R) -> Result<RectF, ReplayError> {
    Ok(RectF::new(
        r.read_f64::<BigEndian>()?,
        r.read_f64::<BigEndian>()?,
        r.read_f64::<BigEndian>()?,
        r.read_f64::<BigEndian>()?,
    ))
}

/// Write a floating-point rectangle.
pub fn write_frect<W: Write>(w: &mut W, rect: RectF) -> Result<(), ReplayError> {
    for v in [rect.x, rect.y, rect.width, rect.height] {
        w.write_f64::<BigEndian>(v)?;
    }
    Ok(())
}

/// Read a point in the version's coordinate encoding.
pub fn read_point<R: Read>(r: &mut R, v: FormatVersion) -> Result<PointF, ReplayError> {
    if v.float_coords() {
        read_fpoint(r)
    } else {
        Ok(read_ipoint(r)?.to_f())
    }
}

/// Write a point in the version's coordinate encoding, rounding when the
/// version stores integers.
pub fn write_point<W: Write>(w: &mut W, v: FormatVersion, p: PointF) -> Result<(), ReplayError> {
    if v.float_coords() {
        write_fpoint(w, p)
    } else {
        write_ipoint(w, p.round())
    }
}

/// Read a rectangle in the version's coordinate encoding.
pub fn read_rect<R: Read>(r: &mut R, v: FormatVersion) -> Result<RectF, ReplayError> {
    if v.float_coords() {
        read_frect(r)
    } else {
        Ok(read_irect(r)?.to_f())
    }
}

/// Write a rectangle in the version's coordinate encoding.
pub fn write_rect<W: Write>(w: &mut W, v: FormatVersion, rect: RectF) -> Result<(), ReplayError> {
    if v.float_coords() {
        write_frect(w, rect)
    } else {
        write_irect(w, rect.to_rect())
    }
}

fn read_list<R: Read, T>(
    r: &mut R,
    mut item: impl FnMut(&mut R) -> Result<T, ReplayError>,
) -> Result<Vec<T>, ReplayError> {
    let count = r.read_u32::<BigEndian>()? as usize;
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        out.push(item(r)?);
    }
    Ok(out)
}

fn write_count<W: Write>(w: &mut W, n: usize) -> Result<(), ReplayError> {
    let n = u32::try_from(n).map_err(|_| bad(format!("list too long to encode ({n})")))?;
    w.write_u32::<BigEndian>(n)?;
    Ok(())
}

/// Read an integer polygon.
pub fn read_ipolygon<R: Read>(r: &mut R) -> Result<Vec<Point>, ReplayError> {
    read_list(r, read_ipoint)
}

/// Write an integer polygon.
pub fn write_ipolygon<W: Write>(w: &mut W, points: &[Point]) -> Result<(), ReplayError> {
    write_count(w, points.len())?;
    for &p in points {
        write_ipoint(w, p)?;
    }
    Ok(())
}

/// Read a polygon in the version's coordinate encoding.
pub fn read_polygon<R: Read>(r: &mut R, v: FormatVersion) -> Result<Vec<PointF>, ReplayError> {
    read_list(r, |r| read_point(r, v))
}

/// Write a polygon in the version's coordinate encoding.
pub fn write_polygon<W: Write>(
    w: &mut W,
    v: FormatVersion,
    points: &[PointF],
) -> Result<(), ReplayError> {
    write_count(w, points.len())?;
    for &p in points {
        write_point(w, v, p)?;
    }
    Ok(())
}

/// Read a world matrix followed by nothing else.
///
/// Majors before 8 store the 2×3 affine part as `m11 m12 m21 m22 dx dy`;
/// later majors store all nine entries row by row.
pub fn read_transform<R: Read>(r: &mut R, v: FormatVersion) -> Result<Transform, ReplayError> {
    if v.projective_transform() {
        let mut m = [0.0f64; 9];
        for slot in &mut m {
            *slot = r.read_f64::<BigEndian>()?;
        }
        Ok(Transform::new(
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8],
        ))
    } else {
        let mut m = [0.0f64; 6];
        for slot in &mut m {
            *slot = r.read_f64::<BigEndian>()?;
        }
        Ok(Transform::affine(m[0], m[1], m[2], m[3], m[4], m[5]))
    }
}

/// Write a world matrix. The projective part is dropped for majors
/// before 8.
pub fn write_transform<W: Write>(
    w: &mut W,
    v: FormatVersion,
    t: &Transform,
) -> Result<(), ReplayError> {
    if v.projective_transform() {
        for x in [
            t.m11, t.m12, t.m13, t.m21, t.m22, t.m23, t.m31, t.m32, t.m33,
        ] {
            w.write_f64::<BigEndian>(x)?;
        }
    } else {
        for x in [t.m11, t.m12, t.m21, t.m22, t.m31, t.m32] {
            w.write_f64::<BigEndian>(x)?;
        }
    }
    Ok(())
}

// ── Paint resources ─────────────────────────────────────────────

/// Read an RGBA colour.
pub fn read_color<R: Read>(r: &mut R) -> Result<Color, ReplayError> {
    let mut c = [0u8; 4];
    r.read_exact(&mut c)?;
    Ok(Color::rgba(c[0], c[1], c[2], c[3]))
}

/// Write an RGBA colour.
pub fn write_color<W: Write>(w: &mut W, c: Color) -> Result<(), ReplayError> {
    w.write_all(&[c.r, c.g, c.b, c.a])?;
    Ok(())
}

/// Read a pen.
pub fn read_pen<R: Read>(r: &mut R) -> Result<Pen, ReplayError> {
    let style = enum_byte(r.read_u8()?, "pen style", PenStyle::from_repr)?;
    let width = r.read_f64::<BigEndian>()?;
    let color = read_color(r)?;
    let cap = enum_byte(r.read_u8()?, "cap style", CapStyle::from_repr)?;
    let join = enum_byte(r.read_u8()?, "join style", JoinStyle::from_repr)?;
    let cosmetic = read_bool(r)?;
    Ok(Pen {
        style,
        width,
        color,
        cap,
        join,
        cosmetic,
    })
}

/// Write a pen.
pub fn write_pen<W: Write>(w: &mut W, pen: &Pen) -> Result<(), ReplayError> {
    w.write_u8(pen.style as u8)?;
    w.write_f64::<BigEndian>(pen.width)?;
    write_color(w, pen.color)?;
    w.write_u8(pen.cap as u8)?;
    w.write_u8(pen.join as u8)?;
    write_bool(w, pen.cosmetic)
}

/// Read a brush.
pub fn read_brush<R: Read>(r: &mut R) -> Result<Brush, ReplayError> {
    let style = enum_byte(r.read_u8()?, "brush style", BrushStyle::from_repr)?;
    let color = read_color(r)?;
    Ok(Brush { style, color })
}

/// Write a brush.
pub fn write_brush<W: Write>(w: &mut W, brush: &Brush) -> Result<(), ReplayError> {
    w.write_u8(brush.style as u8)?;
    write_color(w, brush.color)
}

/// Read a font description. The device resolution is never stored.
pub fn read_font<R: Read>(r: &mut R) -> Result<Font, ReplayError> {
    let family = read_string(r)?;
    let point_size = r.read_f64::<BigEndian>()?;
    let weight = r.read_u16::<BigEndian>()?;
    let style = FontStyle::from_bits_truncate(r.read_u8()?);
    Ok(Font {
        family,
        point_size,
        weight,
        style,
        device_dpi: None,
    })
}

/// Write a font description.
pub fn write_font<W: Write>(w: &mut W, font: &Font) -> Result<(), ReplayError> {
    write_string(w, &font.family)?;
    w.write_f64::<BigEndian>(font.point_size)?;
    w.write_u16::<BigEndian>(font.weight)?;
    w.write_u8(font.style.bits())?;
    Ok(())
}

/// Read a bitmap (shared layout of images and pixmaps).
pub fn read_bitmap<R: Read>(r: &mut R) -> Result<Bitmap, ReplayError> {
    let width = r.read_u32::<BigEndian>()?;
    let height = r.read_u32::<BigEndian>()?;
    let data = read_bytes(r)?;
    Ok(Bitmap {
        width,
        height,
        data,
    })
}

/// Write a bitmap.
pub fn write_bitmap<W: Write>(w: &mut W, b: &Bitmap) -> Result<(), ReplayError> {
    w.write_u32::<BigEndian>(b.width)?;
    w.write_u32::<BigEndian>(b.height)?;
    write_bytes(w, &b.data)
}

/// Read a path.
pub fn read_path<R: Read>(r: &mut R) -> Result<Path, ReplayError> {
    let elements = read_list(r, |r| {
        let kind = enum_byte(r.read_u8()?, "path element", PathElementKind::from_repr)?;
        let point = read_fpoint(r)?;
        Ok(PathElement { kind, point })
    })?;
    let fill_rule = enum_byte(r.read_u8()?, "fill rule", FillRule::from_repr)?;
    Ok(Path {
        elements,
        fill_rule,
    })
}

/// Write a path.
pub fn write_path<W: Write>(w: &mut W, path: &Path) -> Result<(), ReplayError> {
    write_count(w, path.elements.len())?;
    for e in &path.elements {
        w.write_u8(e.kind as u8)?;
        write_fpoint(w, e.point)?;
    }
    w.write_u8(path.fill_rule as u8)?;
    Ok(())
}

/// Read a region. Regions are integer in every version.
pub fn read_region<R: Read>(r: &mut R) -> Result<Region, ReplayError> {
    let rects = read_list(r, read_irect)?;
    Ok(Region {
        rects: rects.into_iter().collect(),
    })
}

/// Write a region.
pub fn write_region<W: Write>(w: &mut W, region: &Region) -> Result<(), ReplayError> {
    write_count(w, region.rects.len())?;
    for &rect in &region.rects {
        write_irect(w, rect)?;
    }
    Ok(())
}
