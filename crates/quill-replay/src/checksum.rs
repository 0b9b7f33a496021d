//! Header checksum: CRC-16/IBM-SDLC (ISO 3309, also known as X.25).
//!
//! The checksum covers every byte from [`CHECKSUM_START`] to the end of
//! the buffer, i.e. the version fields and the whole command stream.

use crc::{Crc, CRC_16_IBM_SDLC};

/// Byte offset of the stored checksum.
pub const CHECKSUM_OFFSET: usize = 4;

/// First byte covered by the checksum.
pub const CHECKSUM_START: usize = CHECKSUM_OFFSET + 2;

const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Checksum of `bytes`.
pub fn checksum(bytes: &[u8]) -> u16 {
    X25.checksum(bytes)
}

/// Checksum of the covered region of a whole recording buffer.
pub fn body_checksum(buf: &[u8]) -> u16 {
    checksum(buf.get(CHECKSUM_START..).unwrap_or_default())
}

/// Recompute and store the checksum of a recording buffer in place.
///
/// Buffers shorter than a checksum field are left untouched.
pub fn stamp(buf: &mut [u8]) {
    if buf.len() < CHECKSUM_START {
        return;
    }
    let sum = body_checksum(buf);
    buf[CHECKSUM_OFFSET..CHECKSUM_START].copy_from_slice(&sum.to_be_bytes());
}
