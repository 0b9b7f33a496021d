//! Error types for recording, validation, and replay.

use std::io;

use crate::config::ConfigError;

/// The kind of table a resource index points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    /// The pen table.
    Pen,
    /// The brush table.
    Brush,
    /// The image table.
    Image,
    /// The pixmap table.
    Pixmap,
}

/// Errors that can occur while validating, recording, or replaying.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The recording holds no bytes, so there is no header to check.
    #[error("recording is empty")]
    Empty,

    /// The buffer is shorter than a header or does not start with `b"QPIC"`.
    #[error("incorrect header (expected b\"QPIC\" and at least 12 bytes)")]
    HeaderMismatch,

    /// The stored checksum disagrees with the checksum of the body.
    #[error("invalid checksum {computed:#06x}, {stored:#06x} expected")]
    ChecksumMismatch {
        /// Checksum stored in the header.
        stored: u16,
        /// Checksum computed over the buffer.
        computed: u16,
    },

    /// The major version is newer than this build understands.
    #[error("incompatible version {major}.{minor}")]
    UnsupportedVersion {
        /// Major version found in the header.
        major: u16,
        /// Minor version found in the header.
        minor: u16,
    },

    /// The command stream is malformed.
    #[error("format error: {detail}")]
    Structure {
        /// What was wrong.
        detail: String,
    },

    /// A memory-resident record referenced a resource that is not in its table.
    #[error("{kind} index {index} out of range (table holds {len})")]
    ResourceIndexOutOfRange {
        /// Which table was consulted.
        kind: ResourceKind,
        /// The index found in the stream.
        index: i32,
        /// Number of entries in the table.
        len: usize,
    },

    /// The replay configuration was rejected before any command ran.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// An I/O error occurred while loading or saving.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ReplayError {
    /// Shorthand for [`ReplayError::Structure`].
    pub fn structure(detail: impl Into<String>) -> Self {
        Self::Structure {
            detail: detail.into(),
        }
    }

    /// Map a short read inside a bounded payload to a structural error.
    ///
    /// Decoding happens against a slice of exactly the declared record
    /// length, so running off its end means the length lied.
    pub(crate) fn from_payload_read(self, what: &str) -> Self {
        match self {
            Self::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Self::structure(format!("{what}: record length mismatch (payload over-read)"))
            }
            other => other,
        }
    }
}
