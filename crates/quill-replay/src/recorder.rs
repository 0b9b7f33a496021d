//! The command stream writer.
//!
//! [`Recorder`] appends records to a growing buffer, keeps one open block
//! per nesting level, and on [`finish`](Recorder::finish) patches the
//! record counts, bounding rectangle and checksum into place.

use byteorder::{BigEndian, ByteOrder};
use quill_core::{
    Brush, Image, ImageConversionFlags, Pen, Pixmap, PointF, Rect, RectF,
};
use tracing::debug;

use crate::checksum::stamp;
use crate::command::{Command, CommandCode, Placement, Resource};
use crate::error::ReplayError;
use crate::header::FormatInfo;
use crate::record::{encode_command, write_record};
use crate::recording::Recording;
use crate::resources::ResourceTables;
use crate::version::FormatVersion;
use crate::MAGIC;

/// Length byte written for every `Begin` record: it covers the count only.
const BEGIN_PAYLOAD_LEN: usize = 4;

#[derive(Debug)]
struct OpenBlock {
    /// Offset of the block's `u32` record count.
    count_offset: usize,
    records: u32,
}

/// Running min/max of drawn geometry.
#[derive(Clone, Copy, Debug)]
struct Extent {
    min: PointF,
    max: PointF,
}

impl Extent {
    fn of(r: RectF) -> Self {
        Self {
            min: PointF::new(r.x, r.y),
            max: PointF::new(r.x + r.width, r.y + r.height),
        }
    }

    fn include(&mut self, r: RectF) {
        let other = Self::of(r);
        self.min.x = self.min.x.min(other.min.x);
        self.min.y = self.min.y.min(other.min.y);
        self.max.x = self.max.x.max(other.max.x);
        self.max.y = self.max.y.max(other.max.y);
    }

    fn to_rect(self) -> Rect {
        RectF::new(
            self.min.x,
            self.min.y,
            self.max.x - self.min.x,
            self.max.y - self.min.y,
        )
        .to_aligned_rect()
    }
}

/// Writes a recording for one format version.
///
/// # Examples
///
/// ```
/// use quill_core::{Color, Pen, RectF};
/// use quill_replay::{Command, FormatVersion, Recorder};
///
/// let mut rec = Recorder::new(FormatVersion::CURRENT);
/// rec.set_pen(&Pen::solid(Color::BLACK, 1.0)).unwrap();
/// rec.record(&Command::DrawRect(RectF::new(0.0, 0.0, 10.0, 10.0))).unwrap();
/// let recording = rec.finish().unwrap();
///
/// assert!(recording.is_format_valid());
/// assert_eq!(recording.bounding_rect().width, 10);
/// ```
#[derive(Debug)]
pub struct Recorder {
    version: FormatVersion,
    resident: bool,
    resources: ResourceTables,
    buf: Vec<u8>,
    blocks: Vec<OpenBlock>,
    extent: Option<Extent>,
    override_rect: Option<Rect>,
}

impl Recorder {
    /// Recorder that serializes every resource inline.
    pub fn new(version: FormatVersion) -> Self {
        Self::with_mode(version, false)
    }

    /// Recorder in memory-resident mode: pens and brushes (and, from major
    /// 6, pixmaps and images) go to side tables and records store indices.
    pub fn in_memory(version: FormatVersion) -> Self {
        Self::with_mode(version, true)
    }

    fn with_mode(version: FormatVersion, resident: bool) -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&[0, 0]);
        buf.extend_from_slice(&version.major.to_be_bytes());
        buf.extend_from_slice(&version.minor.to_be_bytes());
        buf.push(CommandCode::Begin as u8);
        buf.push(BEGIN_PAYLOAD_LEN as u8);
        if version.has_bounding_rect() {
            buf.extend_from_slice(&[0; 16]);
        }
        let count_offset = buf.len();
        debug_assert_eq!(count_offset, FormatInfo::count_offset_for(version));
        buf.extend_from_slice(&[0; 4]);
        Self {
            version,
            resident,
            resources: ResourceTables::new(),
            buf,
            blocks: vec![OpenBlock {
                count_offset,
                records: 0,
            }],
            extent: None,
            override_rect: None,
        }
    }

    /// Version being written.
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// `true` for a memory-resident recorder.
    pub fn is_memory_resident(&self) -> bool {
        self.resident
    }

    /// Tables filled so far.
    pub fn resources(&self) -> &ResourceTables {
        &self.resources
    }

    /// Current nesting depth, the top-level block counting as 1.
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// Use `r` as the header's bounding rectangle instead of the extent
    /// of the recorded geometry.
    pub fn set_bounding_rect(&mut self, r: Rect) {
        self.override_rect = Some(r);
    }

    fn current(&mut self) -> Result<&mut OpenBlock, ReplayError> {
        self.blocks
            .last_mut()
            .ok_or_else(|| ReplayError::structure("recorder has no open block"))
    }

    fn push_record(&mut self, bytes: &[u8]) -> Result<(), ReplayError> {
        let block = self.current()?;
        block.records = block
            .records
            .checked_add(1)
            .ok_or_else(|| ReplayError::structure("block record count overflow"))?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append one command to the current block.
    ///
    /// Block markers are rejected; use [`begin_block`](Self::begin_block)
    /// and [`end_block`](Self::end_block) so counts stay consistent.
    pub fn record(&mut self, cmd: &Command) -> Result<(), ReplayError> {
        if matches!(cmd, Command::Begin { .. } | Command::End) {
            return Err(ReplayError::structure(
                "Begin/End must be written with begin_block/end_block",
            ));
        }
        let bytes = encode_command(cmd, self.version, self.resident)?;
        self.push_record(&bytes)?;
        if let Some(r) = cmd.extent() {
            match &mut self.extent {
                Some(e) => e.include(r),
                None => self.extent = Some(Extent::of(r)),
            }
        }
        Ok(())
    }

    /// Open a nested block. It counts as one record of its parent.
    pub fn begin_block(&mut self) -> Result<(), ReplayError> {
        let mut bytes = Vec::with_capacity(6);
        write_record(&mut bytes, CommandCode::Begin as u8, &[0; BEGIN_PAYLOAD_LEN])?;
        self.push_record(&bytes)?;
        let count_offset = self.buf.len() - BEGIN_PAYLOAD_LEN;
        self.blocks.push(OpenBlock {
            count_offset,
            records: 0,
        });
        Ok(())
    }

    fn close_block(&mut self) -> Result<(), ReplayError> {
        let mut end = Vec::with_capacity(2);
        write_record(&mut end, CommandCode::End as u8, &[])?;
        self.push_record(&end)?;
        let block = self
            .blocks
            .pop()
            .ok_or_else(|| ReplayError::structure("recorder has no open block"))?;
        BigEndian::write_u32(
            &mut self.buf[block.count_offset..block.count_offset + 4],
            block.records,
        );
        Ok(())
    }

    /// Close the innermost nested block with an `End` record.
    pub fn end_block(&mut self) -> Result<(), ReplayError> {
        if self.blocks.len() <= 1 {
            return Err(ReplayError::structure("end_block without a matching begin_block"));
        }
        self.close_block()
    }

    // ── Resource-aware helpers ──────────────────────────────────

    /// Record a pen change, via the pen table when memory-resident.
    pub fn set_pen(&mut self, pen: &Pen) -> Result<(), ReplayError> {
        let res = if self.resident {
            Resource::Indexed(self.resources.push_pen(pen.clone()))
        } else {
            Resource::Inline(pen.clone())
        };
        self.record(&Command::SetPen(res))
    }

    /// Record a brush change, via the brush table when memory-resident.
    pub fn set_brush(&mut self, brush: &Brush) -> Result<(), ReplayError> {
        let res = if self.resident {
            Resource::Indexed(self.resources.push_brush(brush.clone()))
        } else {
            Resource::Inline(brush.clone())
        };
        self.record(&Command::SetBrush(res))
    }

    /// Record a pixmap draw.
    ///
    /// When the pixmap goes to the table its natural size is no longer
    /// available to the encoder, so the placement is made explicit first.
    pub fn draw_pixmap(&mut self, placement: Placement, pixmap: &Pixmap) -> Result<(), ReplayError> {
        let cmd = if self.resident && self.version.indexed_bitmaps() {
            let natural = pixmap.0.rect();
            Command::DrawPixmap {
                placement: placement.mapped(natural),
                pixmap: Resource::Indexed(self.resources.push_pixmap(pixmap.clone())),
            }
        } else {
            Command::DrawPixmap {
                placement,
                pixmap: Resource::Inline(pixmap.clone()),
            }
        };
        self.record(&cmd)
    }

    /// Record an image draw.
    pub fn draw_image(
        &mut self,
        placement: Placement,
        image: &Image,
        flags: ImageConversionFlags,
    ) -> Result<(), ReplayError> {
        let cmd = if self.resident && self.version.indexed_bitmaps() {
            let natural = image.0.rect();
            Command::DrawImage {
                placement: placement.mapped(natural),
                image: Resource::Indexed(self.resources.push_image(image.clone())),
                flags,
            }
        } else {
            Command::DrawImage {
                placement,
                image: Resource::Inline(image.clone()),
                flags,
            }
        };
        self.record(&cmd)
    }

    /// Record a tiled pixmap fill, via the pixmap table when memory-resident.
    pub fn draw_tiled_pixmap(
        &mut self,
        rect: RectF,
        pixmap: &Pixmap,
        offset: PointF,
    ) -> Result<(), ReplayError> {
        let pixmap = if self.resident {
            Resource::Indexed(self.resources.push_pixmap(pixmap.clone()))
        } else {
            Resource::Inline(pixmap.clone())
        };
        self.record(&Command::DrawTiledPixmap {
            rect,
            pixmap,
            offset,
        })
    }

    // ── Finish ──────────────────────────────────────────────────

    /// Close the top-level block and produce a format-valid recording.
    ///
    /// Fails if a nested block is still open.
    pub fn finish(mut self) -> Result<Recording, ReplayError> {
        if self.blocks.len() != 1 {
            return Err(ReplayError::structure(format!(
                "{} nested block(s) still open",
                self.blocks.len() - 1
            )));
        }
        self.close_block()?;

        let bounding_rect = self
            .override_rect
            .or_else(|| self.extent.map(Extent::to_rect))
            .unwrap_or_default();
        if self.version.has_bounding_rect() {
            let at = crate::header::BEGIN_OFFSET + 2;
            for (i, v) in [
                bounding_rect.x,
                bounding_rect.y,
                bounding_rect.width,
                bounding_rect.height,
            ]
            .into_iter()
            .enumerate()
            {
                BigEndian::write_i32(&mut self.buf[at + i * 4..at + i * 4 + 4], v);
            }
        }
        stamp(&mut self.buf);

        let info = FormatInfo {
            version: self.version,
            bounding_rect: if self.version.has_bounding_rect() {
                bounding_rect
            } else {
                Rect::default()
            },
            count_offset: FormatInfo::count_offset_for(self.version),
        };
        debug!(
            version = %self.version,
            bytes = self.buf.len(),
            resident = self.resident,
            "recording finished"
        );
        Ok(Recording::from_parts(
            self.buf,
            info,
            self.resident,
            self.resources,
            None,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::check_format;
    use quill_core::Color;

    #[test]
    fn finished_recording_passes_validation() {
        let mut rec = Recorder::new(FormatVersion::CURRENT);
        rec.record(&Command::DrawRect(RectF::new(2.0, 3.0, 10.0, 20.0)))
            .unwrap();
        let out = rec.finish().unwrap();
        let info = check_format(out.data()).unwrap();
        assert_eq!(info.bounding_rect, Rect::new(2, 3, 10, 20));
        assert_eq!(out.check_format().unwrap(), info);
    }

    #[test]
    fn top_level_count_includes_end() {
        let mut rec = Recorder::new(FormatVersion::CURRENT);
        rec.record(&Command::Save).unwrap();
        rec.record(&Command::Restore).unwrap();
        let out = rec.finish().unwrap();
        let at = FormatInfo::count_offset_for(FormatVersion::CURRENT);
        assert_eq!(BigEndian::read_u32(&out.data()[at..at + 4]), 3);
    }

    #[test]
    fn nested_block_counts_as_one_parent_record() {
        let mut rec = Recorder::new(FormatVersion::CURRENT);
        rec.begin_block().unwrap();
        assert_eq!(rec.depth(), 2);
        rec.record(&Command::Save).unwrap();
        rec.end_block().unwrap();
        let out = rec.finish().unwrap();
        let bytes = out.data();
        let at = FormatInfo::count_offset_for(FormatVersion::CURRENT);
        assert_eq!(BigEndian::read_u32(&bytes[at..at + 4]), 2);
        // Begin record, then its own count of Save + End.
        assert_eq!(&bytes[at + 4..at + 6], &[CommandCode::Begin as u8, 4]);
        assert_eq!(BigEndian::read_u32(&bytes[at + 6..at + 10]), 2);
    }

    #[test]
    fn unbalanced_blocks_rejected() {
        let mut rec = Recorder::new(FormatVersion::CURRENT);
        assert!(rec.end_block().is_err());
        rec.begin_block().unwrap();
        assert!(matches!(rec.finish(), Err(ReplayError::Structure { .. })));
    }

    #[test]
    fn raw_block_markers_rejected() {
        let mut rec = Recorder::new(FormatVersion::CURRENT);
        assert!(rec.record(&Command::End).is_err());
        assert!(rec.record(&Command::Begin { records: 1 }).is_err());
    }

    #[test]
    fn resident_helpers_fill_tables() {
        let mut rec = Recorder::in_memory(FormatVersion::CURRENT);
        rec.set_pen(&Pen::solid(Color::WHITE, 3.0)).unwrap();
        rec.set_brush(&Brush::solid(Color::BLACK)).unwrap();
        rec.draw_pixmap(
            Placement::At(PointF::new(1.0, 1.0)),
            &Pixmap::new(2, 2, vec![0; 4]),
        )
        .unwrap();
        assert_eq!(rec.resources().pens().len(), 1);
        assert_eq!(rec.resources().brushes().len(), 1);
        assert_eq!(rec.resources().pixmaps().len(), 1);
        let out = rec.finish().unwrap();
        assert!(out.is_memory_resident());
        assert_eq!(out.bounding_rect(), Rect::new(1, 1, 2, 2));
    }

    #[test]
    fn legacy_resident_pixmaps_stay_inline() {
        let mut rec = Recorder::in_memory(FormatVersion::major(5));
        rec.draw_pixmap(
            Placement::Into(RectF::new(0.0, 0.0, 4.0, 4.0)),
            &Pixmap::new(1, 1, vec![7]),
        )
        .unwrap();
        assert!(rec.resources().pixmaps().is_empty());
    }

    #[test]
    fn override_rect_replaces_extent() {
        let mut rec = Recorder::new(FormatVersion::CURRENT);
        rec.record(&Command::DrawPoint(PointF::new(50.0, 50.0)))
            .unwrap();
        rec.set_bounding_rect(Rect::new(0, 0, 640, 480));
        let out = rec.finish().unwrap();
        assert_eq!(out.bounding_rect(), Rect::new(0, 0, 640, 480));
    }

    #[test]
    fn legacy_header_has_no_rect() {
        let rec = Recorder::new(FormatVersion::major(2));
        let out = rec.finish().unwrap();
        // magic, checksum, version, Begin+len, count, End+len
        assert_eq!(out.size(), 4 + 2 + 4 + 2 + 4 + 2);
        assert_eq!(out.format_version(), Some(FormatVersion::major(2)));
    }
}
