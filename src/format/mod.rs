//! Tile payload formats.
//!
//! Tiles are served exactly as stored. This module only decides which
//! content type they are served with.

mod detect;
mod tile_format;

pub use detect::{detect_content_type, is_jpeg, is_png, JPEG_SOI, OCTET_STREAM, PNG_SIGNATURE};
pub use tile_format::TileFormat;
