use bytes::Bytes;

use crate::error::IoError;

/// Trait for reading byte ranges from a bundle file.
///
/// The bundle reader only ever needs a handful of small, bounded reads per
/// request (one index record, then one payload), so the trait is synchronous.
/// Implementations must be thread-safe.
pub trait RangeReader: Send + Sync {
    /// Read exactly `len` bytes starting at `offset`.
    ///
    /// Returns an error if the range is out of bounds or if the read fails.
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError>;

    /// Get the total size of the resource in bytes.
    fn size(&self) -> u64;

    /// Get a unique identifier for this resource (for logging).
    fn identifier(&self) -> &str;
}

// =============================================================================
// Fixed-Width Little-Endian Helpers
// =============================================================================
//
// Bundle index records pack a 40-bit offset and a 24-bit length into 8 bytes
// with no alignment padding. These helpers take fixed-size arrays so a short
// buffer is a compile error rather than a silent misread.

/// Read an unsigned 24-bit little-endian integer (3 bytes).
#[inline]
pub fn read_u24_le(bytes: &[u8; 3]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0])
}

/// Read an unsigned 40-bit little-endian integer (5 bytes).
#[inline]
pub fn read_u40_le(bytes: &[u8; 5]) -> u64 {
    u64::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], 0, 0, 0])
}

/// Write the low 24 bits of `value` as 3 little-endian bytes.
#[inline]
pub fn write_u24_le(value: u32) -> [u8; 3] {
    let b = value.to_le_bytes();
    [b[0], b[1], b[2]]
}

/// Write the low 40 bits of `value` as 5 little-endian bytes.
#[inline]
pub fn write_u40_le(value: u64) -> [u8; 5] {
    let b = value.to_le_bytes();
    [b[0], b[1], b[2], b[3], b[4]]
}
