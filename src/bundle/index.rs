//! Bundle index records.
//!
//! # Bundle Layout
//!
//! ```text
//! Bytes 0-63:             Header (opaque)
//! Bytes 64-131135:        Index table, 16384 records × 8 bytes
//! Bytes 131136-...:       Tile payloads, addressed by the index records
//! ```
//!
//! # Record Layout (8 bytes, little-endian, unpadded)
//!
//! ```text
//! Bytes 0-4: Tile payload offset from start of file (40 bits)
//! Bytes 5-7: Tile payload length in bytes (24 bits, 0 = no tile)
//! ```

use crate::io::{read_u24_le, read_u40_le, write_u24_le, write_u40_le};

use super::addressing::RECORDS_PER_BUNDLE;

/// Size of the bundle header preceding the index table.
pub const BUNDLE_HEADER_SIZE: u64 = 64;

/// Size of one packed index record.
pub const INDEX_RECORD_SIZE: usize = 8;

/// Total size of the index table in bytes.
pub const INDEX_TABLE_SIZE: usize = RECORDS_PER_BUNDLE * INDEX_RECORD_SIZE;

/// Largest offset representable in a record (2^40 - 1).
pub const MAX_TILE_OFFSET: u64 = (1 << 40) - 1;

/// Largest length representable in a record (2^24 - 1).
pub const MAX_TILE_LENGTH: u32 = (1 << 24) - 1;

/// Byte position of a record within the bundle file.
#[inline]
pub fn record_position(record_index: usize) -> u64 {
    BUNDLE_HEADER_SIZE + (record_index * INDEX_RECORD_SIZE) as u64
}

/// A decoded index record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleIndexRecord {
    /// Absolute offset of the tile payload in the bundle file
    pub offset: u64,

    /// Length of the tile payload in bytes
    pub length: u32,
}

impl BundleIndexRecord {
    /// Create a record, or `None` if a field exceeds its bit width.
    pub fn new(offset: u64, length: u32) -> Option<Self> {
        if offset > MAX_TILE_OFFSET || length > MAX_TILE_LENGTH {
            return None;
        }
        Some(Self { offset, length })
    }

    /// Decode an 8-byte packed record.
    pub fn decode(bytes: &[u8; INDEX_RECORD_SIZE]) -> Self {
        Self {
            offset: read_u40_le(&[bytes[0], bytes[1], bytes[2], bytes[3], bytes[4]]),
            length: Self::decode_length(bytes),
        }
    }

    /// Decode only the length field, which is all an existence check needs.
    #[inline]
    pub fn decode_length(bytes: &[u8; INDEX_RECORD_SIZE]) -> u32 {
        read_u24_le(&[bytes[5], bytes[6], bytes[7]])
    }

    /// Encode into the 8-byte packed form.
    pub fn encode(&self) -> [u8; INDEX_RECORD_SIZE] {
        let o = write_u40_le(self.offset);
        let l = write_u24_le(self.length);
        [o[0], o[1], o[2], o[3], o[4], l[0], l[1], l[2]]
    }

    /// Whether the slot holds no tile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}
