//! Format versions and the operand layouts each one selects.
//!
//! Every version-dependent encoding rule is expressed as a predicate here,
//! so the codec and the player ask "does this version have X" instead of
//! comparing raw numbers.

use std::fmt;

use crate::{CURRENT_MINOR, MAX_MAJOR_VERSION};

/// A `(major, minor)` wire-format version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    /// Selects the operand encodings.
    pub major: u16,
    /// Informational; no encoding depends on it.
    pub minor: u16,
}

/// How a pixmap or image draw places its bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BitmapLayout {
    /// Top-left point only (majors 1..=3).
    Point,
    /// Integer target rectangle (majors 4 and 5).
    Rect,
    /// Float target and source rectangles (major 6 and later).
    Mapped,
}

impl FormatVersion {
    /// The version new recordings are written in.
    pub const CURRENT: FormatVersion = FormatVersion {
        major: MAX_MAJOR_VERSION,
        minor: CURRENT_MINOR,
    };

    /// Construct a version.
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Version with minor `0`.
    pub const fn major(major: u16) -> Self {
        Self::new(major, 0)
    }

    /// `true` when this build can read the version.
    pub fn is_supported(self) -> bool {
        self.major <= MAX_MAJOR_VERSION
    }

    /// Points, rects and polygons are `f64` rather than `i32`.
    pub fn float_coords(self) -> bool {
        self.major >= 6
    }

    /// The top-level `Begin` record carries a bounding rectangle.
    ///
    /// Only the legacy range 1..=3 lacks it.
    pub fn has_bounding_rect(self) -> bool {
        !(1..=3).contains(&self.major)
    }

    /// World matrices are written as a full 3×3 rather than 2×3 affine.
    pub fn projective_transform(self) -> bool {
        self.major >= 8
    }

    /// Text items carry a device scale and a justification width.
    pub fn text_item_extras(self) -> bool {
        self.major >= 9
    }

    /// Region clips honour their recorded clip operation. Older streams
    /// carry the byte but always replace the clip.
    pub fn region_clip_op(self) -> bool {
        self.major >= 9
    }

    /// Placement layout for pixmap and image draws.
    pub fn bitmap_layout(self) -> BitmapLayout {
        match self.major {
            0..=3 => BitmapLayout::Point,
            4 | 5 => BitmapLayout::Rect,
            _ => BitmapLayout::Mapped,
        }
    }

    /// Pixmaps and images may be stored by table index in resident mode.
    pub fn indexed_bitmaps(self) -> bool {
        self.bitmap_layout() == BitmapLayout::Mapped
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_boundaries() {
        assert_eq!(FormatVersion::major(3).bitmap_layout(), BitmapLayout::Point);
        assert_eq!(FormatVersion::major(4).bitmap_layout(), BitmapLayout::Rect);
        assert_eq!(FormatVersion::major(5).bitmap_layout(), BitmapLayout::Rect);
        assert_eq!(FormatVersion::major(6).bitmap_layout(), BitmapLayout::Mapped);
        assert!(!FormatVersion::major(5).float_coords());
        assert!(FormatVersion::major(6).float_coords());
        assert!(!FormatVersion::major(7).projective_transform());
        assert!(FormatVersion::major(8).projective_transform());
        assert!(!FormatVersion::major(8).text_item_extras());
        assert!(FormatVersion::major(9).region_clip_op());
    }

    #[test]
    fn bounding_rect_absent_only_for_legacy_range() {
        let with: Vec<u16> = (0..=9)
            .filter(|&m| FormatVersion::major(m).has_bounding_rect())
            .collect();
        assert_eq!(with, vec![0, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn current_is_newest_supported() {
        assert!(FormatVersion::CURRENT.is_supported());
        assert!(!FormatVersion::major(MAX_MAJOR_VERSION + 1).is_supported());
        assert_eq!(FormatVersion::CURRENT.to_string(), "9.0");
    }
}
