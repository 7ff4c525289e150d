use serde::Serialize;

use super::detect::{detect_content_type, OCTET_STREAM};

/// Image format of the tiles in a cache, from `CacheTileFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TileFormat {
    /// PNG, PNG8, PNG24 or PNG32
    Png,
    /// JPEG
    Jpeg,
    /// JPEG and PNG tiles side by side
    Mixed,
    /// LERC-compressed elevation rasters
    Lerc,
    /// Anything else
    Unknown,
}

impl TileFormat {
    /// Parse the `CacheTileFormat` value of a cache (case-insensitive).
    pub fn from_cache_format(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PNG" | "PNG8" | "PNG24" | "PNG32" => TileFormat::Png,
            "JPEG" | "JPG" => TileFormat::Jpeg,
            "MIXED" => TileFormat::Mixed,
            "LERC" | "LERC2" => TileFormat::Lerc,
            _ => TileFormat::Unknown,
        }
    }

    /// Content type to serve a payload with.
    ///
    /// Mixed and unknown caches are sniffed from the payload's magic bytes.
    pub fn content_type(&self, payload: &[u8]) -> &'static str {
        match self {
            TileFormat::Png => "image/png",
            TileFormat::Jpeg => "image/jpeg",
            TileFormat::Lerc => OCTET_STREAM,
            TileFormat::Mixed | TileFormat::Unknown => detect_content_type(payload),
        }
    }
}
