//! Mapping from tile addresses to bundle files and index slots.
//!
//! Tiles are grouped into square bundles of 128 × 128 tiles. A tile at
//! `(level, row, column)` lives in the bundle whose base row/column is the
//! row/column rounded down to a multiple of 128:
//!
//! ```text
//! <root>/_alllayers/L<level:02>/R<baseRow:04x>C<baseCol:04x>.bundle
//! ```
//!
//! Inside the bundle, index records are ordered row-major over the local
//! 128 × 128 grid. Nothing here touches the filesystem.

use std::path::{Path, PathBuf};

/// Bundle side length in tiles.
pub const BUNDLE_SIZE: u32 = 128;

/// Number of tile slots (and index records) in one bundle.
pub const RECORDS_PER_BUNDLE: usize = (BUNDLE_SIZE * BUNDLE_SIZE) as usize;

/// Name of the tile-data directory under the cache root.
pub const TILE_DATA_DIR: &str = "_alllayers";

/// File extension of bundle files.
pub const BUNDLE_EXTENSION: &str = "bundle";

/// Location of one tile slot on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleAddress {
    /// Full path of the bundle file
    pub bundle_path: PathBuf,

    /// Slot of the tile's record in the bundle index, in `[0, 16384)`
    pub record_index: usize,

    /// First row covered by the bundle
    pub base_row: u32,

    /// First column covered by the bundle
    pub base_column: u32,
}

/// Round a row or column down to its bundle's base.
#[inline]
pub fn bundle_base(value: u32) -> u32 {
    (value / BUNDLE_SIZE) * BUNDLE_SIZE
}

/// Index of the record for `(row, column)` within its bundle.
#[inline]
pub fn record_index(row: u32, column: u32) -> usize {
    (BUNDLE_SIZE * (row % BUNDLE_SIZE) + column % BUNDLE_SIZE) as usize
}

/// Name of the directory holding a level's bundles, e.g. `L07`.
pub fn level_dir_name(level: u32) -> String {
    format!("L{:02}", level)
}

/// File name of the bundle containing `(row, column)`, e.g. `R0080C0000.bundle`.
pub fn bundle_file_name(row: u32, column: u32) -> String {
    format!(
        "R{:04x}C{:04x}.{}",
        bundle_base(row),
        bundle_base(column),
        BUNDLE_EXTENSION
    )
}

/// Locate the bundle file and record slot for a tile.
///
/// Any non-negative address is accepted; whether the level exists in the
/// cache is for the caller to check.
pub fn locate(root: &Path, level: u32, row: u32, column: u32) -> BundleAddress {
    let bundle_path = root
        .join(TILE_DATA_DIR)
        .join(level_dir_name(level))
        .join(bundle_file_name(row, column));

    BundleAddress {
        bundle_path,
        record_index: record_index(row, column),
        base_row: bundle_base(row),
        base_column: bundle_base(column),
    }
}
