//! Fonts, text layout flags, and the metric-only device used to rescale
//! fonts for text items recorded at a non-unit device scale.

use bitflags::bitflags;

use crate::surface::Dpi;

bitflags! {
    /// Style bits carried alongside a font's family and size.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FontStyle: u8 {
        /// Slanted glyphs.
        const ITALIC = 0x01;
        /// Line below the baseline.
        const UNDERLINE = 0x02;
        /// Line through the middle.
        const STRIKE_OUT = 0x04;
        /// Line above the ascent.
        const OVERLINE = 0x08;
    }
}

/// Font weight on the 1..=1000 CSS scale.
pub const WEIGHT_NORMAL: u16 = 400;
/// Bold font weight.
pub const WEIGHT_BOLD: u16 = 700;

/// A font description.
///
/// `device_dpi` is not serialized. It is set by [`Font::for_device`] when a
/// text item needs its font resolved against a scaled resolution, and is
/// `None` for fonts that follow the drawing surface's own resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name.
    pub family: String,
    /// Size in typographic points.
    pub point_size: f64,
    /// Weight, see [`WEIGHT_NORMAL`].
    pub weight: u16,
    /// Italic/underline/strike-out bits.
    pub style: FontStyle,
    /// Resolution the font was resolved against, if any.
    pub device_dpi: Option<Dpi>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: String::new(),
            point_size: 12.0,
            weight: WEIGHT_NORMAL,
            style: FontStyle::empty(),
            device_dpi: None,
        }
    }
}

impl Font {
    /// Regular-weight font of the given family and point size.
    pub fn new(family: impl Into<String>, point_size: f64) -> Self {
        Self {
            family: family.into(),
            point_size,
            ..Self::default()
        }
    }

    /// Copy of this font resolved against `device`'s resolution.
    pub fn for_device(&self, device: &MetricDevice) -> Font {
        Font {
            device_dpi: Some(device.dpi()),
            ..self.clone()
        }
    }

    /// Pixel size at `dpi`, or at the font's own device resolution when it
    /// has one.
    pub fn pixel_size(&self, dpi: Dpi) -> f64 {
        let dpi = self.device_dpi.unwrap_or(dpi);
        self.point_size * dpi.y / 72.0
    }
}

/// A paint device that only answers resolution queries.
///
/// It has no backing store and cannot be drawn on; it exists so fonts can be
/// resolved at an arbitrary resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MetricDevice {
    dpi_x: i32,
    dpi_y: i32,
}

impl MetricDevice {
    /// Device at the given resolution.
    pub fn new(dpi_x: i32, dpi_y: i32) -> Self {
        Self { dpi_x, dpi_y }
    }

    /// Device whose resolution is `reference` multiplied by `scale`,
    /// rounded to whole dots per inch.
    pub fn scaled(reference: Dpi, scale: f64) -> Self {
        Self::new(
            crate::geometry::round_i32(scale * reference.x),
            crate::geometry::round_i32(scale * reference.y),
        )
    }

    /// Horizontal resolution.
    pub fn dpi_x(&self) -> i32 {
        self.dpi_x
    }

    /// Vertical resolution.
    pub fn dpi_y(&self) -> i32 {
        self.dpi_y
    }

    /// Resolution as a [`Dpi`].
    pub fn dpi(&self) -> Dpi {
        Dpi::new(self.dpi_x as f64, self.dpi_y as f64)
    }
}

bitflags! {
    /// Alignment and layout flags for text drawn into a rectangle.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TextFlags: u32 {
        /// Flush left.
        const ALIGN_LEFT = 0x0001;
        /// Flush right.
        const ALIGN_RIGHT = 0x0002;
        /// Centred horizontally.
        const ALIGN_HCENTER = 0x0004;
        /// Stretched to the full width.
        const ALIGN_JUSTIFY = 0x0008;
        /// Flush top.
        const ALIGN_TOP = 0x0020;
        /// Flush bottom.
        const ALIGN_BOTTOM = 0x0040;
        /// Centred vertically.
        const ALIGN_VCENTER = 0x0080;
        /// Line breaks are spaces.
        const SINGLE_LINE = 0x0100;
        /// Text may overflow the rectangle.
        const DONT_CLIP = 0x0200;
        /// Tabs advance to tab stops.
        const EXPAND_TABS = 0x0400;
        /// `&` underlines the next character.
        const SHOW_MNEMONIC = 0x0800;
        /// Break lines at word boundaries.
        const WORD_WRAP = 0x1000;
        /// Justify the last line too.
        const JUSTIFICATION_FORCED = 0x0001_0000;
        /// Lay out left to right whatever the content.
        const FORCE_LEFT_TO_RIGHT = 0x0002_0000;
        /// Lay out right to left whatever the content.
        const FORCE_RIGHT_TO_LEFT = 0x0004_0000;
        const _ = !0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_device_rounds_dpi() {
        let dev = MetricDevice::scaled(Dpi::new(96.0, 96.0), 1.5);
        assert_eq!((dev.dpi_x(), dev.dpi_y()), (144, 144));
        let dev = MetricDevice::scaled(Dpi::new(96.0, 72.0), 0.33);
        assert_eq!((dev.dpi_x(), dev.dpi_y()), (32, 24));
    }

    #[test]
    fn for_device_pins_pixel_size() {
        let font = Font::new("Sans", 12.0);
        let surface_dpi = Dpi::new(96.0, 96.0);
        assert_eq!(font.pixel_size(surface_dpi), 16.0);

        let scaled = font.for_device(&MetricDevice::new(144, 144));
        assert_eq!(scaled.family, "Sans");
        assert_eq!(scaled.pixel_size(surface_dpi), 24.0);
    }

    #[test]
    fn legacy_flags_fit_in_i16() {
        let flags = TextFlags::from_bits_retain(0x0905);
        assert!(flags.contains(TextFlags::SINGLE_LINE | TextFlags::ALIGN_LEFT));
        assert!(flags.contains(TextFlags::SHOW_MNEMONIC));
    }
}
