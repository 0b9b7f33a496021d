//! Integer and floating-point geometry plus the 3×3 [`Transform`].
//!
//! Recordings of format major 5 and earlier store integer coordinates;
//! later formats store `f64`. Both families live here so the codec can
//! convert between them without touching the drawing surface.

use std::ops::Mul;

/// Round half away from zero and saturate into `i32`.
#[inline]
pub fn round_i32(v: f64) -> i32 {
    v.round() as i32
}

/// Distance from `from` to `to`, saturated into `i32`.
#[inline]
fn span(from: i32, to: i32) -> i32 {
    (i64::from(to) - i64::from(from)).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// An integer point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Widen to a floating-point point.
    pub fn to_f(self) -> PointF {
        PointF::new(self.x as f64, self.y as f64)
    }
}

/// A floating-point point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointF {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl PointF {
    /// Construct a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round each coordinate to the nearest integer.
    pub fn round(self) -> Point {
        Point::new(round_i32(self.x), round_i32(self.y))
    }
}

impl From<Point> for PointF {
    fn from(p: Point) -> Self {
        p.to_f()
    }
}

/// An integer rectangle stored as origin plus size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width; zero or negative means empty.
    pub width: i32,
    /// Height; zero or negative means empty.
    pub height: i32,
}

impl Rect {
    /// Construct a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `true` when either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Widen to a floating-point rectangle.
    pub fn to_f(self) -> RectF {
        RectF::new(
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
        )
    }
}

/// A floating-point rectangle stored as origin plus size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectF {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl RectF {
    /// Construct a rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle with its top-left corner at `origin`.
    pub fn from_origin(origin: PointF, width: f64, height: f64) -> Self {
        Self::new(origin.x, origin.y, width, height)
    }

    /// `true` when either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Top-left corner.
    pub fn top_left(&self) -> PointF {
        PointF::new(self.x, self.y)
    }

    /// Round the edges to integers.
    ///
    /// The width is derived from the rounded right edge, so adjacent
    /// rectangles stay adjacent after rounding.
    pub fn to_rect(self) -> Rect {
        let x = round_i32(self.x);
        let y = round_i32(self.y);
        Rect::new(
            x,
            y,
            span(x, round_i32(self.x + self.width)),
            span(y, round_i32(self.y + self.height)),
        )
    }

    /// Smallest integer rectangle that contains this one.
    pub fn to_aligned_rect(self) -> Rect {
        let x = self.x.floor() as i32;
        let y = self.y.floor() as i32;
        let right = (self.x + self.width).ceil() as i32;
        let bottom = (self.y + self.height).ceil() as i32;
        Rect::new(x, y, span(x, right), span(y, bottom))
    }

    /// Bounding rectangle of `self` and `other`. Empty rectangles are ignored.
    pub fn united(&self, other: &RectF) -> RectF {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        RectF::new(left, top, right - left, bottom - top)
    }

    /// Bounding rectangle of a point set, or `None` when empty.
    pub fn bounding(points: impl IntoIterator<Item = PointF>) -> Option<RectF> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in iter {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(RectF::new(x0, y0, x1 - x0, y1 - y0))
    }
}

impl From<Rect> for RectF {
    fn from(r: Rect) -> Self {
        r.to_f()
    }
}

/// A line segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineF {
    /// Start point.
    pub p1: PointF,
    /// End point.
    pub p2: PointF,
}

impl LineF {
    /// Construct a line.
    pub const fn new(p1: PointF, p2: PointF) -> Self {
        Self { p1, p2 }
    }
}

/// A 3×3 transformation matrix in row-vector convention.
///
/// `a * b` applies `a` first, then `b`. The translation lives in
/// `m31`/`m32`; `m13`, `m23` and `m33` carry the projective part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Horizontal scale.
    pub m11: f64,
    /// Vertical shear.
    pub m12: f64,
    /// Horizontal projection factor.
    pub m13: f64,
    /// Horizontal shear.
    pub m21: f64,
    /// Vertical scale.
    pub m22: f64,
    /// Vertical projection factor.
    pub m23: f64,
    /// Horizontal translation.
    pub m31: f64,
    /// Vertical translation.
    pub m32: f64,
    /// Projective divisor; `1.0` for affine transforms.
    pub m33: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform {
        m11: 1.0,
        m12: 0.0,
        m13: 0.0,
        m21: 0.0,
        m22: 1.0,
        m23: 0.0,
        m31: 0.0,
        m32: 0.0,
        m33: 1.0,
    };

    /// Full projective constructor, row by row.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        m11: f64,
        m12: f64,
        m13: f64,
        m21: f64,
        m22: f64,
        m23: f64,
        m31: f64,
        m32: f64,
        m33: f64,
    ) -> Self {
        Self {
            m11,
            m12,
            m13,
            m21,
            m22,
            m23,
            m31,
            m32,
            m33,
        }
    }

    /// Affine constructor (`dx`/`dy` are the translation).
    pub const fn affine(m11: f64, m12: f64, m21: f64, m22: f64, dx: f64, dy: f64) -> Self {
        Self::new(m11, m12, 0.0, m21, m22, 0.0, dx, dy, 1.0)
    }

    /// Pure scale.
    pub const fn from_scale(sx: f64, sy: f64) -> Self {
        Self::affine(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Pure translation.
    pub const fn from_translation(dx: f64, dy: f64) -> Self {
        Self::affine(1.0, 0.0, 0.0, 1.0, dx, dy)
    }

    /// Scale the coordinate system: the scale is applied before `self`.
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self::from_scale(sx, sy) * self
    }

    /// Horizontal translation.
    pub fn dx(&self) -> f64 {
        self.m31
    }

    /// Vertical translation.
    pub fn dy(&self) -> f64 {
        self.m32
    }

    /// `true` when the projective row is `(0, 0, 1)`.
    pub fn is_affine(&self) -> bool {
        self.m13 == 0.0 && self.m23 == 0.0 && self.m33 == 1.0
    }

    /// `true` for the identity matrix.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Map a point through the transform.
    pub fn map(&self, p: PointF) -> PointF {
        let x = self.m11 * p.x + self.m21 * p.y + self.m31;
        let y = self.m12 * p.x + self.m22 * p.y + self.m32;
        if self.is_affine() {
            return PointF::new(x, y);
        }
        let w = self.m13 * p.x + self.m23 * p.y + self.m33;
        if w == 0.0 {
            PointF::new(x, y)
        } else {
            PointF::new(x / w, y / w)
        }
    }

    /// Bounding rectangle of the four mapped corners.
    pub fn map_rect(&self, r: RectF) -> RectF {
        let corners = [
            PointF::new(r.x, r.y),
            PointF::new(r.x + r.width, r.y),
            PointF::new(r.x, r.y + r.height),
            PointF::new(r.x + r.width, r.y + r.height),
        ];
        RectF::bounding(corners.iter().map(|&c| self.map(c))).unwrap_or_default()
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, o: Transform) -> Transform {
        Transform::new(
            self.m11 * o.m11 + self.m12 * o.m21 + self.m13 * o.m31,
            self.m11 * o.m12 + self.m12 * o.m22 + self.m13 * o.m32,
            self.m11 * o.m13 + self.m12 * o.m23 + self.m13 * o.m33,
            self.m21 * o.m11 + self.m22 * o.m21 + self.m23 * o.m31,
            self.m21 * o.m12 + self.m22 * o.m22 + self.m23 * o.m32,
            self.m21 * o.m13 + self.m22 * o.m23 + self.m23 * o.m33,
            self.m31 * o.m11 + self.m32 * o.m21 + self.m33 * o.m31,
            self.m31 * o.m12 + self.m32 * o.m22 + self.m33 * o.m32,
            self.m31 * o.m13 + self.m32 * o.m23 + self.m33 * o.m33,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn to_rect_keeps_right_edge_adjacent() {
        let r = RectF::new(0.4, 0.6, 10.2, 9.8).to_rect();
        assert_eq!(r, Rect::new(0, 1, 11, 9));
    }

    #[test]
    fn aligned_rect_contains_source() {
        let r = RectF::new(-0.5, 0.25, 1.0, 1.0).to_aligned_rect();
        assert_eq!(r, Rect::new(-1, 0, 2, 2));
    }

    #[test]
    fn huge_rects_saturate_instead_of_overflowing() {
        let wide = RectF::new(-2e9, 0.0, 4e9, 10.0);
        assert_eq!(wide.to_rect(), Rect::new(-2_000_000_000, 0, i32::MAX, 10));
        assert_eq!(
            wide.to_aligned_rect(),
            Rect::new(-2_000_000_000, 0, i32::MAX, 10)
        );
        let beyond = RectF::new(-1e12, -1e12, 3e12, 3e12).to_rect();
        assert_eq!(beyond, Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX));
    }

    #[test]
    fn united_ignores_empty() {
        let a = RectF::new(0.0, 0.0, 5.0, 5.0);
        let empty = RectF::default();
        assert_eq!(a.united(&empty), a);
        assert_eq!(empty.united(&a), a);
        let b = RectF::new(10.0, -2.0, 1.0, 1.0);
        assert_eq!(a.united(&b), RectF::new(0.0, -2.0, 11.0, 7.0));
    }

    #[test]
    fn scale_is_applied_before_existing_transform() {
        let t = Transform::from_translation(10.0, 0.0).scale(2.0, 3.0);
        let p = t.map(PointF::new(1.0, 1.0));
        assert_eq!(p, PointF::new(12.0, 3.0));
    }

    #[test]
    fn product_applies_left_operand_first() {
        let scale = Transform::from_scale(2.0, 2.0);
        let shift = Transform::from_translation(5.0, 5.0);
        assert_eq!((scale * shift).map(PointF::new(1.0, 1.0)), PointF::new(7.0, 7.0));
        assert_eq!((shift * scale).map(PointF::new(1.0, 1.0)), PointF::new(12.0, 12.0));
    }

    #[test]
    fn projective_map_divides_by_w() {
        let t = Transform::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0);
        assert!(!t.is_affine());
        assert_eq!(t.map(PointF::new(4.0, 8.0)), PointF::new(2.0, 4.0));
    }

    #[test]
    fn map_rect_of_scale() {
        let r = Transform::from_scale(2.0, 0.5).map_rect(RectF::new(1.0, 2.0, 10.0, 10.0));
        assert_eq!(r, RectF::new(2.0, 1.0, 20.0, 5.0));
    }

    proptest! {
        #[test]
        fn identity_is_neutral(x in -1e6f64..1e6, y in -1e6f64..1e6) {
            let p = PointF::new(x, y);
            prop_assert_eq!(Transform::IDENTITY.map(p), p);
            let t = Transform::affine(1.5, 0.0, 0.0, 2.0, x, y);
            prop_assert_eq!(t * Transform::IDENTITY, t);
            prop_assert_eq!(Transform::IDENTITY * t, t);
        }

        #[test]
        fn integer_rect_widening_roundtrips(
            x in -10_000i32..10_000,
            y in -10_000i32..10_000,
            w in 0i32..10_000,
            h in 0i32..10_000,
        ) {
            let r = Rect::new(x, y, w, h);
            prop_assert_eq!(r.to_f().to_rect(), r);
        }
    }
}
