//! Cache metadata types.
//!
//! These are loaded once when a cache is opened and are read-only afterwards.
//! Serialization follows the JSON field names of the tile service REST schema
//! so the presentation layer can embed them directly.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::format::TileFormat;

/// One zoom level of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelMetadata {
    /// Level identifier (0 = smallest scale)
    pub level: u32,

    /// Map scale denominator
    pub scale: f64,

    /// Map units per pixel
    pub resolution: f64,
}

/// Spatial reference of the cache. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wkt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wkid: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_wkid: Option<u32>,

    pub xy_tolerance: f64,
    pub z_tolerance: f64,
    pub m_tolerance: f64,
    pub xy_units: f64,
    pub z_units: f64,
    pub m_units: f64,
    pub false_x: f64,
    pub false_y: f64,
    pub false_z: f64,
    pub false_m: f64,
}

/// Full coverage of the cache in map units.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub spatial_reference: SpatialReference,
}

/// Map coordinates of the top-left corner of the tiling grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TileOrigin {
    pub x: f64,
    pub y: f64,
}

/// Image parameters of the stored tiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileImageInfo {
    /// Raw `CacheTileFormat` value, e.g. `PNG`, `JPEG`, `MIXED`, `LERC`
    pub format: String,
    pub compression_quality: f64,
    pub band_count: u32,
    pub lerc_error: f64,
}

/// Aggregate metadata for one tile cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheDescriptor {
    /// Cache root directory (holds `conf.xml`, `conf.cdi` and `_alllayers`)
    pub root: PathBuf,

    /// Tile height in pixels
    pub tile_rows: u32,

    /// Tile width in pixels
    pub tile_cols: u32,

    pub dpi: u32,
    pub origin: TileOrigin,
    pub spatial_reference: SpatialReference,
    pub image: TileImageInfo,

    /// Storage format name, when the cache declares one
    pub storage_format: Option<String>,

    /// Every level the cache was designed with, ascending by level id
    pub levels: Vec<LevelMetadata>,

    pub extent: Extent,

    /// Lowest level present on disk
    pub min_level: u32,

    /// Highest level present on disk
    pub max_level: u32,

    /// Scale of `min_level`
    pub min_scale: f64,

    /// Scale of `max_level`
    pub max_scale: f64,
}

impl CacheDescriptor {
    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a level in the level table by id.
    pub fn level(&self, level: u32) -> Option<&LevelMetadata> {
        self.levels.iter().find(|l| l.level == level)
    }

    /// Lowest and highest level ids in the level table.
    pub fn level_table_range(&self) -> Option<(u32, u32)> {
        let min = self.levels.iter().map(|l| l.level).min()?;
        let max = self.levels.iter().map(|l| l.level).max()?;
        Some((min, max))
    }

    /// Parsed tile image format.
    pub fn tile_format(&self) -> TileFormat {
        TileFormat::from_cache_format(&self.image.format)
    }
}
