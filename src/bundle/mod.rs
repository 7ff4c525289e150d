//! Bundle addressing and decoding.
//!
//! A compact cache stores its tiles in bundle files, each covering a fixed
//! 128 × 128 block of tiles at one level:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        (level, row, column)             │
//! └────────────────────┬────────────────────┘
//!                      │  addressing (pure)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │   L07/R0080C0000.bundle, record 261     │
//! └────────────────────┬────────────────────┘
//!                      │  reader (I/O)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │  8-byte record → (offset, length)       │
//! │  payload bytes at offset                │
//! └─────────────────────────────────────────┘
//! ```

mod addressing;
mod index;
mod reader;

pub use addressing::{
    bundle_base, bundle_file_name, level_dir_name, locate, record_index, BundleAddress,
    BUNDLE_EXTENSION, BUNDLE_SIZE, RECORDS_PER_BUNDLE, TILE_DATA_DIR,
};
pub use index::{
    record_position, BundleIndexRecord, BUNDLE_HEADER_SIZE, INDEX_RECORD_SIZE, INDEX_TABLE_SIZE,
    MAX_TILE_LENGTH, MAX_TILE_OFFSET,
};
pub use reader::{read_record, read_tile_at, BundleReader, Tilemap};
