//! The shared recording handle.
//!
//! [`Recording`] is a cheap-to-clone handle over reference-counted data.
//! Clones share one buffer until one of them mutates, at which point the
//! mutator takes a private copy (`Arc::make_mut`). Format validity is
//! cached in a `OnceLock` on first successful check, so concurrent
//! read-only replays of a shared recording need no locking.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use quill_core::{DrawSurface, Rect};
use tracing::{debug, warn};

use crate::config::PlayConfig;
use crate::error::ReplayError;
use crate::header::{self, FormatInfo};
use crate::player::Player;
use crate::resources::ResourceTables;
use crate::version::FormatVersion;

/// A device property queried through [`Recording::metric`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum PaintMetric {
    /// Bounding rect width in device pixels.
    Width,
    /// Bounding rect height in device pixels.
    Height,
    /// Width in millimetres at the reference DPI.
    WidthMm,
    /// Height in millimetres at the reference DPI.
    HeightMm,
    /// Horizontal reference DPI.
    DpiX,
    /// Vertical reference DPI.
    DpiY,
    /// Same as [`PaintMetric::DpiX`].
    PhysicalDpiX,
    /// Same as [`PaintMetric::DpiY`].
    PhysicalDpiY,
    /// Always 2^24.
    NumColors,
    /// Always 24 bits.
    Depth,
    /// Always 1.
    DevicePixelRatio,
}

#[derive(Clone, Debug, Default)]
struct RecordingData {
    bytes: Vec<u8>,
    format: OnceLock<FormatInfo>,
    override_rect: Option<Rect>,
    resident: bool,
    resources: ResourceTables,
}

impl RecordingData {
    fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }
}

/// A serialized drawing-command stream plus header metadata.
#[derive(Clone, Debug, Default)]
pub struct Recording {
    d: Arc<RecordingData>,
}

impl Recording {
    /// A null recording: no bytes, nothing to play.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw recording bytes. The format is checked lazily.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            d: Arc::new(RecordingData::with_bytes(bytes.into())),
        }
    }

    /// Build a recording whose format is already known to be valid.
    pub(crate) fn from_parts(
        bytes: Vec<u8>,
        info: FormatInfo,
        resident: bool,
        resources: ResourceTables,
        override_rect: Option<Rect>,
    ) -> Self {
        let format = OnceLock::new();
        let _ = format.set(info);
        Self {
            d: Arc::new(RecordingData {
                bytes,
                format,
                override_rect,
                resident,
                resources,
            }),
        }
    }

    // ── Data access ─────────────────────────────────────────────

    /// The raw recording bytes.
    pub fn data(&self) -> &[u8] {
        &self.d.bytes
    }

    /// Length of the raw bytes.
    pub fn size(&self) -> usize {
        self.d.bytes.len()
    }

    /// `true` when the recording holds no bytes.
    pub fn is_null(&self) -> bool {
        self.d.bytes.is_empty()
    }

    /// Replace the bytes with a copy of `data`.
    ///
    /// Clears the cached format, memory-resident mode and resource tables;
    /// an explicit bounding rect override is kept.
    pub fn set_data(&mut self, data: &[u8]) {
        let d = Arc::make_mut(&mut self.d);
        d.bytes = data.to_vec();
        d.format = OnceLock::new();
        d.resident = false;
        d.resources = ResourceTables::default();
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Replace the contents with everything `reader` yields, then check
    /// the format.
    ///
    /// The bytes are kept even when the check fails, matching
    /// [`set_data`](Self::set_data).
    pub fn load<R: Read>(&mut self, mut reader: R) -> Result<FormatInfo, ReplayError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.set_data(&bytes);
        self.check_format()
    }

    /// Load from a file. On open or read failure the recording becomes null.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<FormatInfo, ReplayError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot open recording");
                *self = Self::new();
                return Err(e.into());
            }
        };
        match self.load(BufReader::new(file)) {
            Err(ReplayError::Io(e)) => {
                *self = Self::new();
                Err(ReplayError::Io(e))
            }
            other => other,
        }
    }

    /// Write the raw bytes to `writer`.
    ///
    /// Resource tables of a memory-resident recording live in memory only,
    /// so what gets written cannot be replayed on its own.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<(), ReplayError> {
        if self.d.resident {
            warn!("saving a memory-resident recording; resource tables are not written");
        }
        writer.write_all(&self.d.bytes)?;
        writer.flush()?;
        Ok(())
    }

    /// Write the raw bytes to a file, creating or truncating it.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let file = File::create(path.as_ref())?;
        self.save(BufWriter::new(file))
    }

    /// Write the recording into a larger stream as a `u32` size followed
    /// by the raw bytes. A null recording writes size 0 only.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), ReplayError> {
        let size = u32::try_from(self.size()).map_err(|_| {
            ReplayError::structure(format!("recording too large to frame ({})", self.size()))
        })?;
        writer.write_u32::<BigEndian>(size)?;
        writer.write_all(&self.d.bytes)?;
        Ok(())
    }

    /// Read a recording framed by [`write_to`](Self::write_to), replacing
    /// the contents. The format is not checked until it is needed.
    pub fn read_from<R: Read>(&mut self, mut reader: R) -> Result<(), ReplayError> {
        let size = reader.read_u32::<BigEndian>()? as usize;
        let mut bytes = Vec::new();
        let got = reader.by_ref().take(size as u64).read_to_end(&mut bytes)?;
        if got != size {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        self.set_data(&bytes);
        Ok(())
    }

    // ── Format ──────────────────────────────────────────────────

    /// Validate the header, caching the result on success.
    pub fn check_format(&self) -> Result<FormatInfo, ReplayError> {
        if let Some(info) = self.d.format.get() {
            return Ok(*info);
        }
        let info = header::check_format(&self.d.bytes)?;
        Ok(*self.d.format.get_or_init(|| info))
    }

    /// `true` once a format check has succeeded since the last mutation.
    pub fn is_format_valid(&self) -> bool {
        self.d.format.get().is_some()
    }

    /// Version of a validated recording.
    pub fn format_version(&self) -> Option<FormatVersion> {
        self.check_format().ok().map(|info| info.version)
    }

    /// The explicit override if one is set and non-empty, otherwise the
    /// header's rectangle. Invalid recordings report an empty rectangle.
    pub fn bounding_rect(&self) -> Rect {
        if let Some(r) = self.d.override_rect.filter(|r| !r.is_empty()) {
            return r;
        }
        self.check_format()
            .map(|info| info.bounding_rect)
            .unwrap_or_default()
    }

    /// Override the bounding rectangle stored in the header.
    pub fn set_bounding_rect(&mut self, r: Rect) {
        Arc::make_mut(&mut self.d).override_rect = Some(r);
    }

    // ── Sharing ─────────────────────────────────────────────────

    /// Make sure this handle owns its data exclusively.
    pub fn detach(&mut self) {
        Arc::make_mut(&mut self.d);
    }

    /// `true` when no other handle shares this data.
    pub fn is_detached(&self) -> bool {
        Arc::strong_count(&self.d) == 1
    }

    // ── Resources ───────────────────────────────────────────────

    /// `true` when pens, brushes and bitmaps are referenced by index.
    pub fn is_memory_resident(&self) -> bool {
        self.d.resident
    }

    /// Side tables of a memory-resident recording.
    pub fn resources(&self) -> &ResourceTables {
        &self.d.resources
    }

    // ── Replay ──────────────────────────────────────────────────

    /// Replay every command against `surface`.
    ///
    /// A null recording succeeds without touching the surface. On error
    /// the surface keeps whatever state earlier records applied.
    pub fn play(
        &self,
        surface: &mut dyn DrawSurface,
        config: &PlayConfig,
    ) -> Result<(), ReplayError> {
        if self.is_null() {
            return Ok(());
        }
        let info = self.check_format()?;
        let player = Player::new(
            surface,
            config,
            &self.d.resources,
            info.version,
            self.d.resident,
        );
        match player.run(&self.d.bytes, &info) {
            Ok(executed) => {
                debug!(executed, "recording played");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "replay aborted");
                Err(e)
            }
        }
    }

    /// A paint-device metric of the recording.
    ///
    /// Sizes come from [`bounding_rect`](Self::bounding_rect); resolution
    /// is the configured reference DPI.
    pub fn metric(&self, metric: PaintMetric, config: &PlayConfig) -> i32 {
        let rect = self.bounding_rect();
        let dpi = config.reference_dpi;
        match metric {
            PaintMetric::Width => rect.width,
            PaintMetric::Height => rect.height,
            PaintMetric::WidthMm => (25.4 / dpi.x * rect.width as f64) as i32,
            PaintMetric::HeightMm => (25.4 / dpi.y * rect.height as f64) as i32,
            PaintMetric::DpiX | PaintMetric::PhysicalDpiX => dpi.x.round() as i32,
            PaintMetric::DpiY | PaintMetric::PhysicalDpiY => dpi.y.round() as i32,
            PaintMetric::NumColors => 16_777_216,
            PaintMetric::Depth => 24,
            PaintMetric::DevicePixelRatio => 1,
        }
    }
}
