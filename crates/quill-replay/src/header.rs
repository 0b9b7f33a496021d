//! Header layout and the format validator.
//!
//! ```text
//! 0   magic "QPIC"
//! 4   checksum u16   (over bytes 6..)
//! 6   major u16
//! 8   minor u16
//! 10  Begin code u8, length u8
//! 12  bounding rect 4 × i32   (majors outside 1..=3 only)
//! ..  top-level record count u32, then the records
//! ```

use byteorder::{BigEndian, ReadBytesExt};
use quill_core::Rect;
use tracing::warn;

use crate::checksum::{body_checksum, CHECKSUM_OFFSET};
use crate::codec::read_irect;
use crate::command::CommandCode;
use crate::error::ReplayError;
use crate::version::FormatVersion;
use crate::{MAGIC, MAX_MAJOR_VERSION};

/// Smallest buffer that can hold magic, checksum and version.
pub const MIN_HEADER_LEN: usize = 12;

/// Offset of the top-level `Begin` record.
pub const BEGIN_OFFSET: usize = 10;

/// What a successful format check learns about a recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatInfo {
    /// Wire-format version.
    pub version: FormatVersion,
    /// Bounding rectangle from the header; empty for legacy majors.
    pub bounding_rect: Rect,
    /// Byte offset of the top-level record count.
    pub(crate) count_offset: usize,
}

impl FormatInfo {
    /// Offset of the top-level record count for a given version.
    pub(crate) fn count_offset_for(version: FormatVersion) -> usize {
        BEGIN_OFFSET + 2 + if version.has_bounding_rect() { 16 } else { 0 }
    }
}

/// Check magic, checksum, version and the leading `Begin` record.
///
/// Every rejection other than [`ReplayError::Empty`] is also reported as
/// a `warn!` event. Nothing is retained on failure; the caller decides
/// what to cache on success.
pub fn check_format(buf: &[u8]) -> Result<FormatInfo, ReplayError> {
    let result = parse(buf);
    match &result {
        Err(ReplayError::Empty) | Ok(_) => {}
        Err(e) => warn!(error = %e, len = buf.len(), "rejected recording header"),
    }
    result
}

fn parse(buf: &[u8]) -> Result<FormatInfo, ReplayError> {
    if buf.is_empty() {
        return Err(ReplayError::Empty);
    }
    if buf.len() < MIN_HEADER_LEN || buf[..MAGIC.len()] != MAGIC {
        return Err(ReplayError::HeaderMismatch);
    }

    let mut r = &buf[CHECKSUM_OFFSET..];
    let stored = r.read_u16::<BigEndian>()?;
    let computed = body_checksum(buf);
    if stored != computed {
        return Err(ReplayError::ChecksumMismatch { stored, computed });
    }

    let major = r.read_u16::<BigEndian>()?;
    let minor = r.read_u16::<BigEndian>()?;
    if major > MAX_MAJOR_VERSION {
        return Err(ReplayError::UnsupportedVersion { major, minor });
    }
    let version = FormatVersion::new(major, minor);

    let code = r.read_u8()?;
    let _len = r.read_u8()?;
    if code != CommandCode::Begin as u8 {
        return Err(ReplayError::structure(format!(
            "first record is command {code}, expected Begin"
        )));
    }

    let bounding_rect = if version.has_bounding_rect() {
        read_irect(&mut r).map_err(|e| e.from_payload_read("header bounding rect"))?
    } else {
        Rect::default()
    };

    Ok(FormatInfo {
        version,
        bounding_rect,
        count_offset: FormatInfo::count_offset_for(version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::stamp;

    fn header(major: u16, first: u8, tail: &[u8]) -> Vec<u8> {
        let mut buf = MAGIC.to_vec();
        buf.extend_from_slice(&[0, 0]);
        buf.extend_from_slice(&major.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes());
        buf.extend_from_slice(&[first, 4]);
        buf.extend_from_slice(tail);
        stamp(&mut buf);
        buf
    }

    fn rect_and_count() -> Vec<u8> {
        let mut tail = Vec::new();
        for v in [1i32, 2, 30, 40] {
            tail.extend_from_slice(&v.to_be_bytes());
        }
        tail.extend_from_slice(&0u32.to_be_bytes());
        tail
    }

    #[test]
    fn reads_bounding_rect_for_modern_majors() {
        let info = check_format(&header(9, 30, &rect_and_count())).unwrap();
        assert_eq!(info.version, FormatVersion::new(9, 0));
        assert_eq!(info.bounding_rect, Rect::new(1, 2, 30, 40));
        assert_eq!(info.count_offset, 28);
    }

    #[test]
    fn legacy_majors_have_no_rect() {
        let info = check_format(&header(3, 30, &0u32.to_be_bytes())).unwrap();
        assert_eq!(info.bounding_rect, Rect::default());
        assert_eq!(info.count_offset, 12);
    }

    #[test]
    fn empty_buffer() {
        assert!(matches!(check_format(&[]), Err(ReplayError::Empty)));
    }

    #[test]
    fn wrong_magic_or_short_buffer() {
        let mut buf = header(9, 30, &rect_and_count());
        buf[0] = b'X';
        assert!(matches!(check_format(&buf), Err(ReplayError::HeaderMismatch)));
        assert!(matches!(check_format(b"QPIC\0\0\0\x09\0"), Err(ReplayError::HeaderMismatch)));
    }

    #[test]
    fn flipped_body_byte_fails_checksum() {
        let mut buf = header(9, 30, &rect_and_count());
        let last = buf.len() - 1;
        buf[last] ^= 0x01;
        assert!(matches!(
            check_format(&buf),
            Err(ReplayError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn future_major_rejected() {
        let buf = header(MAX_MAJOR_VERSION + 1, 30, &rect_and_count());
        assert!(matches!(
            check_format(&buf),
            Err(ReplayError::UnsupportedVersion { major: 10, minor: 0 })
        ));
    }

    #[test]
    fn first_record_must_be_begin() {
        let buf = header(9, CommandCode::Nop as u8, &rect_and_count());
        assert!(matches!(check_format(&buf), Err(ReplayError::Structure { .. })));
    }

    #[test]
    fn truncated_bounding_rect() {
        let buf = header(9, 30, &[0, 0, 0, 1]);
        assert!(matches!(check_format(&buf), Err(ReplayError::Structure { .. })));
    }
}
