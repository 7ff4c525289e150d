//! Reading tiles and tilemaps out of bundle files.
//!
//! Every call opens its own handle on the bundle, performs a small, bounded
//! number of range reads and drops the handle before returning. Nothing is
//! cached: the store is static and concurrent readers need no coordination.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::error::{IoError, TileError};
use crate::io::{FileRangeReader, RangeReader};

use super::addressing::{locate, BundleAddress, BUNDLE_SIZE};
use super::index::{record_position, BundleIndexRecord, INDEX_RECORD_SIZE};

// =============================================================================
// Tilemap
// =============================================================================

/// Existence bitmap for a rectangular block of tile slots.
///
/// Serializes as:
///
/// ```json
/// { "adjusted": false, "location": "0,0,2,2", "data": [1, 0, 0, 1] }
/// ```
///
/// `location` is `"<column>,<row>,<width>,<height>"` using the effective
/// (possibly clamped) width and height. `data` is row-major: all columns of
/// the first row, then the next row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tilemap {
    /// Whether the block was clamped to stay inside one bundle
    pub adjusted: bool,

    /// `"<column>,<row>,<width>,<height>"`
    pub location: String,

    /// One entry per slot: 1 if a tile is stored, 0 otherwise
    pub data: Vec<u8>,
}

impl Tilemap {
    fn new(row: u32, column: u32, width: u32, height: u32, adjusted: bool, data: Vec<u8>) -> Self {
        Self {
            adjusted,
            location: format!("{},{},{},{}", column, row, width, height),
            data,
        }
    }
}

// =============================================================================
// Bundle Reader
// =============================================================================

/// Reads tile payloads and existence bitmaps from a cache's bundle files.
#[derive(Debug, Clone)]
pub struct BundleReader {
    root: PathBuf,
}

impl BundleReader {
    /// Create a reader for the cache rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root this reader resolves bundle paths against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the bundle file and record slot for a tile.
    pub fn locate(&self, level: u32, row: u32, column: u32) -> BundleAddress {
        locate(&self.root, level, row, column)
    }

    /// Open the bundle for an address, or `None` if the file does not exist.
    fn open_bundle(&self, address: &BundleAddress) -> Result<Option<FileRangeReader>, IoError> {
        match FileRangeReader::open(&address.bundle_path) {
            Ok(reader) => Ok(Some(reader)),
            Err(IoError::NotFound(path)) => {
                debug!(bundle = %path, "Bundle not present");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Read the raw payload of one tile.
    ///
    /// # Errors
    /// - `TileNotFound` if the bundle file is missing or the slot is empty
    /// - `ReadFault` if the bundle cannot be read (permissions, truncation)
    pub fn read_tile(&self, level: u32, row: u32, column: u32) -> Result<Bytes, TileError> {
        let not_found = TileError::TileNotFound { level, row, column };
        let address = self.locate(level, row, column);

        let Some(reader) = self.open_bundle(&address)? else {
            return Err(not_found);
        };

        match read_tile_at(&reader, address.record_index)? {
            Some(payload) => {
                debug!(
                    level,
                    row,
                    column,
                    bytes = payload.len(),
                    bundle = reader.identifier(),
                    "Read tile"
                );
                Ok(payload)
            }
            None => Err(not_found),
        }
    }

    /// Build an existence bitmap for a `width` × `height` block of slots whose
    /// top-left corner is `(row, column)`.
    ///
    /// A block that would cross the bundle's last row or column is clamped to
    /// the bundle and reported with `adjusted = true`. A missing bundle yields
    /// an all-zero bitmap.
    pub fn read_tilemap(
        &self,
        level: u32,
        row: u32,
        column: u32,
        width: u32,
        height: u32,
    ) -> Result<Tilemap, TileError> {
        let rows_left = BUNDLE_SIZE - row % BUNDLE_SIZE;
        let columns_left = BUNDLE_SIZE - column % BUNDLE_SIZE;

        let effective_height = height.min(rows_left);
        let effective_width = width.min(columns_left);
        let adjusted = effective_height < height || effective_width < width;

        let address = self.locate(level, row, column);
        let data = match self.open_bundle(&address)? {
            Some(reader) => scan_block(&reader, row, column, effective_width, effective_height)?,
            None => vec![0; (effective_width * effective_height) as usize],
        };

        Ok(Tilemap::new(
            row,
            column,
            effective_width,
            effective_height,
            adjusted,
            data,
        ))
    }
}

// =============================================================================
// Record Access
// =============================================================================

/// Read and decode the index record at `record_index`.
pub fn read_record<R: RangeReader>(
    reader: &R,
    record_index: usize,
) -> Result<BundleIndexRecord, IoError> {
    let bytes = reader.read_exact_at(record_position(record_index), INDEX_RECORD_SIZE)?;
    Ok(BundleIndexRecord::decode(&to_record_bytes(&bytes)))
}

/// Read the payload addressed by the record at `record_index`.
///
/// Returns `None` for an empty slot.
pub fn read_tile_at<R: RangeReader>(
    reader: &R,
    record_index: usize,
) -> Result<Option<Bytes>, IoError> {
    let record = read_record(reader, record_index)?;
    if record.is_empty() {
        return Ok(None);
    }
    let payload = reader.read_exact_at(record.offset, record.length as usize)?;
    Ok(Some(payload))
}

/// Existence flags for a block that lies entirely inside one bundle.
///
/// Records for consecutive columns are adjacent on disk, so each row of the
/// block is fetched with a single read.
fn scan_block<R: RangeReader>(
    reader: &R,
    row: u32,
    column: u32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, IoError> {
    let mut data = Vec::with_capacity((width * height) as usize);
    if width == 0 {
        return Ok(data);
    }

    for r in 0..height {
        let first = super::addressing::record_index(row + r, column);
        let bytes =
            reader.read_exact_at(record_position(first), width as usize * INDEX_RECORD_SIZE)?;

        data.extend(bytes.chunks_exact(INDEX_RECORD_SIZE).map(|chunk| {
            let length = BundleIndexRecord::decode_length(&to_record_bytes(chunk));
            u8::from(length != 0)
        }));
    }

    Ok(data)
}

/// Copy an 8-byte slice into a fixed-size record buffer.
fn to_record_bytes(chunk: &[u8]) -> [u8; INDEX_RECORD_SIZE] {
    let mut record = [0u8; INDEX_RECORD_SIZE];
    record.copy_from_slice(&chunk[..INDEX_RECORD_SIZE]);
    record
}

// =============================================================================
// Tests
// =============================================================================
