//! Payload sniffing for caches that mix image formats.
//!
//! `MIXED` caches store opaque tiles as JPEG and tiles with transparency as
//! PNG, so the content type has to be read off the payload itself.

/// PNG file signature.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// JPEG Start Of Image marker.
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// Fallback content type for payloads that are not a recognized image.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Check if the payload starts with the PNG signature.
#[inline]
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

/// Check if the payload starts with a JPEG SOI marker.
#[inline]
pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&JPEG_SOI)
}

/// Detect the MIME type of a tile payload from its magic bytes.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    if is_png(data) {
        "image/png"
    } else if is_jpeg(data) {
        "image/jpeg"
    } else {
        OCTET_STREAM
    }
}
