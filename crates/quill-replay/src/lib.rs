//! Binary drawing-command recording, validation, and replay.
//!
//! A recording is a self-describing byte stream of drawing operations
//! (primitives, text, bitmaps, and graphics-state changes) that can be
//! stored, shipped, and replayed later against any [`DrawSurface`]
//! implementation.
//!
//! # Architecture
//!
//! - [`Recorder`] appends commands and produces a finished [`Recording`]
//! - [`Recording`] owns the bytes, validates the header lazily, and
//!   replays through [`Player`]
//! - [`record`] frames individual commands; [`codec`] holds the operand
//!   primitives shared by every command
//! - [`FormatVersion`] decides every version-dependent encoding choice
//!
//! # Format
//!
//! ```text
//! ["QPIC"] [checksum u16] [major u16] [minor u16]
//! [Begin 30, len] [bounding rect 4×i32, majors ≥ 4] [count u32]
//! [record 1] [record 2] ... [End 31, 0]
//! ```
//!
//! Every record is a `u8` command code, a length (`u8`, or `0xFF`
//! followed by a `u32`), and exactly that many payload bytes. All
//! integers are big-endian.
//!
//! [`DrawSurface`]: quill_core::DrawSurface

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod checksum;
pub mod codec;
pub mod command;
pub mod config;
pub mod error;
pub mod header;
pub mod player;
pub mod record;
pub mod recorder;
pub mod recording;
pub mod resources;
pub mod version;

pub use command::{Command, CommandCode, Placement, Resource, TextItem};
pub use config::{ConfigError, PlayConfig};
pub use error::{ReplayError, ResourceKind};
pub use header::{check_format, FormatInfo};
pub use player::Player;
pub use record::{decode_command, decode_command_stream, encode_command};
pub use recorder::Recorder;
pub use recording::{PaintMetric, Recording};
pub use resources::ResourceTables;
pub use version::{BitmapLayout, FormatVersion};

/// Magic bytes at the start of every recording.
pub const MAGIC: [u8; 4] = *b"QPIC";

/// Newest major format version this crate reads and writes.
///
/// History:
/// - 1..=3: integer coordinates, no bounding rect in the header
/// - 4, 5: header bounding rect; bitmaps drawn into a target rect
/// - 6, 7: floating-point coordinates; indexed pixmaps and images
/// - 8: projective (3×3) world matrices
/// - 9: text-item scale and justification; region clip operations
pub const MAX_MAJOR_VERSION: u16 = 9;

/// Minor version written by [`Recorder`].
pub const CURRENT_MINOR: u16 = 0;
