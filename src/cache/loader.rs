//! Loading cache metadata from disk.
//!
//! A cache root looks like:
//!
//! ```text
//! <root>/conf.xml          CacheInfo: grid, image format, level table
//! <root>/conf.cdi          EnvelopeN: full extent
//! <root>/_alllayers/L00/   one directory per level present on disk
//! <root>/_alllayers/L01/
//! ...
//! ```
//!
//! The level table in `conf.xml` lists every level the cache was designed
//! with; the level directories tell which of them were actually built.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::bundle::{BUNDLE_SIZE, TILE_DATA_DIR};
use crate::error::ConfigError;

use super::descriptor::{
    CacheDescriptor, Extent, LevelMetadata, SpatialReference, TileImageInfo, TileOrigin,
};

/// Cache configuration document name.
pub const CONF_XML: &str = "conf.xml";

/// Cache extent document name.
pub const CONF_CDI: &str = "conf.cdi";

/// Prefix of level directory names (`L00`, `L01`, ...).
const LEVEL_DIR_PREFIX: char = 'L';

// =============================================================================
// Document Schema
// =============================================================================

#[derive(Debug, Deserialize)]
struct CacheInfoXml {
    #[serde(rename = "TileCacheInfo")]
    tile_cache_info: TileCacheInfoXml,

    #[serde(rename = "TileImageInfo", default)]
    tile_image_info: TileImageInfoXml,

    #[serde(rename = "CacheStorageInfo", default)]
    cache_storage_info: Option<CacheStorageInfoXml>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TileCacheInfoXml {
    #[serde(rename = "SpatialReference")]
    spatial_reference: SpatialReferenceXml,

    #[serde(rename = "TileOrigin")]
    tile_origin: PointXml,

    #[serde(rename = "TileCols")]
    tile_cols: u32,

    #[serde(rename = "TileRows")]
    tile_rows: u32,

    #[serde(rename = "DPI")]
    dpi: u32,

    #[serde(rename = "LODInfos")]
    lod_infos: LodInfosXml,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PointXml {
    #[serde(rename = "X")]
    x: f64,

    #[serde(rename = "Y")]
    y: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LodInfosXml {
    #[serde(rename = "LODInfo")]
    lods: Vec<LodInfoXml>,
}

#[derive(Debug, Deserialize)]
struct LodInfoXml {
    #[serde(rename = "LevelID")]
    level: u32,

    #[serde(rename = "Scale")]
    scale: f64,

    #[serde(rename = "Resolution")]
    resolution: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TileImageInfoXml {
    #[serde(rename = "CacheTileFormat")]
    cache_tile_format: String,

    #[serde(rename = "CompressionQuality")]
    compression_quality: f64,

    #[serde(rename = "BandCount")]
    band_count: u32,

    #[serde(rename = "LERCError")]
    lerc_error: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheStorageInfoXml {
    #[serde(rename = "StorageFormat")]
    storage_format: Option<String>,

    #[serde(rename = "PacketSize")]
    packet_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpatialReferenceXml {
    #[serde(rename = "WKT")]
    wkt: Option<String>,

    #[serde(rename = "WKID")]
    wkid: Option<u32>,

    #[serde(rename = "LatestWKID")]
    latest_wkid: Option<u32>,

    #[serde(rename = "XYTolerance")]
    xy_tolerance: f64,

    #[serde(rename = "ZTolerance")]
    z_tolerance: f64,

    #[serde(rename = "MTolerance")]
    m_tolerance: f64,

    #[serde(rename = "XYScale")]
    xy_scale: f64,

    #[serde(rename = "ZScale")]
    z_scale: f64,

    #[serde(rename = "MScale")]
    m_scale: f64,

    #[serde(rename = "XOrigin")]
    x_origin: f64,

    #[serde(rename = "YOrigin")]
    y_origin: f64,

    #[serde(rename = "ZOrigin")]
    z_origin: f64,

    #[serde(rename = "MOrigin")]
    m_origin: f64,
}

#[derive(Debug, Deserialize)]
struct EnvelopeXml {
    #[serde(rename = "XMin")]
    xmin: f64,

    #[serde(rename = "YMin")]
    ymin: f64,

    #[serde(rename = "XMax")]
    xmax: f64,

    #[serde(rename = "YMax")]
    ymax: f64,

    #[serde(rename = "SpatialReference", default)]
    spatial_reference: SpatialReferenceXml,
}

impl From<SpatialReferenceXml> for SpatialReference {
    fn from(sr: SpatialReferenceXml) -> Self {
        Self {
            wkt: sr.wkt.filter(|w| !w.trim().is_empty()),
            wkid: sr.wkid.filter(|&id| id != 0),
            latest_wkid: sr.latest_wkid.filter(|&id| id != 0),
            xy_tolerance: sr.xy_tolerance,
            z_tolerance: sr.z_tolerance,
            m_tolerance: sr.m_tolerance,
            xy_units: sr.xy_scale,
            z_units: sr.z_scale,
            m_units: sr.m_scale,
            false_x: sr.x_origin,
            false_y: sr.y_origin,
            false_z: sr.z_origin,
            false_m: sr.m_origin,
        }
    }
}

// =============================================================================
// DescriptorLoader
// =============================================================================

/// Builds a [`CacheDescriptor`] from a cache root directory.
pub struct DescriptorLoader;

impl DescriptorLoader {
    /// Load the descriptor for the cache rooted at `root`.
    ///
    /// # Errors
    /// - `Open` if `conf.xml`, `conf.cdi` or `_alllayers` cannot be read
    /// - `Parse` if a document is malformed or declares no levels
    /// - `UnsupportedPacketSize` if bundles are not 128 tiles wide
    /// - `NoLevelDirectories` if no level has been built
    /// - `LevelNotInTable` if a level on disk is missing from the level table
    pub fn load(root: impl AsRef<Path>) -> Result<CacheDescriptor, ConfigError> {
        let root = root.as_ref();

        let conf_path = root.join(CONF_XML);
        let info: CacheInfoXml = read_document(&conf_path)?;
        let extent: EnvelopeXml = read_document(&root.join(CONF_CDI))?;

        let storage = info.cache_storage_info.unwrap_or_default();
        if let Some(packet_size) = storage.packet_size {
            if packet_size != BUNDLE_SIZE {
                return Err(ConfigError::UnsupportedPacketSize(packet_size));
            }
        }

        let tile_info = info.tile_cache_info;
        let mut levels: Vec<LevelMetadata> = tile_info
            .lod_infos
            .lods
            .into_iter()
            .map(|lod| LevelMetadata {
                level: lod.level,
                scale: lod.scale,
                resolution: lod.resolution,
            })
            .collect();
        if levels.is_empty() {
            return Err(ConfigError::Parse {
                path: conf_path.display().to_string(),
                message: "level table has no LODInfo entries".to_string(),
            });
        }
        levels.sort_by_key(|l| l.level);

        let (min_level, max_level) = discover_levels(&root.join(TILE_DATA_DIR))?;
        let min_scale = scale_of(&levels, min_level)?;
        let max_scale = scale_of(&levels, max_level)?;

        let image = info.tile_image_info;
        let descriptor = CacheDescriptor {
            root: root.to_path_buf(),
            tile_rows: tile_info.tile_rows,
            tile_cols: tile_info.tile_cols,
            dpi: tile_info.dpi,
            origin: TileOrigin {
                x: tile_info.tile_origin.x,
                y: tile_info.tile_origin.y,
            },
            spatial_reference: tile_info.spatial_reference.into(),
            image: TileImageInfo {
                format: image.cache_tile_format,
                compression_quality: image.compression_quality,
                band_count: image.band_count,
                lerc_error: image.lerc_error,
            },
            storage_format: storage.storage_format,
            levels,
            extent: Extent {
                xmin: extent.xmin,
                ymin: extent.ymin,
                xmax: extent.xmax,
                ymax: extent.ymax,
                spatial_reference: extent.spatial_reference.into(),
            },
            min_level,
            max_level,
            min_scale,
            max_scale,
        };

        info!(
            root = %root.display(),
            format = %descriptor.image.format,
            levels = descriptor.levels.len(),
            min_level,
            max_level,
            "Loaded cache descriptor"
        );

        Ok(descriptor)
    }
}

/// Find the lowest and highest level present under the tile-data directory.
///
/// Directory names are compared as strings, so the result is only correct
/// when every level directory has the same digit width. Mixed widths are
/// logged as a warning.
pub fn discover_levels(tile_data_dir: &Path) -> Result<(u32, u32), ConfigError> {
    let open_error = |e: std::io::Error| ConfigError::Open {
        path: tile_data_dir.display().to_string(),
        message: e.to_string(),
    };

    let mut names = Vec::new();
    for entry in std::fs::read_dir(tile_data_dir).map_err(open_error)? {
        let entry = entry.map_err(open_error)?;
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if parse_level_dir(&name).is_some() {
            names.push(name);
        } else {
            debug!(entry = %name, "Skipping non-level directory");
        }
    }
    names.sort();

    let (Some(first), Some(last)) = (names.first(), names.last()) else {
        return Err(ConfigError::NoLevelDirectories {
            path: tile_data_dir.display().to_string(),
        });
    };

    if names.iter().any(|n| n.len() != first.len()) {
        warn!(
            path = %tile_data_dir.display(),
            first = %first,
            last = %last,
            "Level directory names differ in width; min/max level may be wrong"
        );
    }

    let min = parse_level_dir(first).unwrap_or_default();
    let max = parse_level_dir(last).unwrap_or_default();
    Ok((min, max))
}

/// Level id encoded in a level directory name (`L07` → 7).
fn parse_level_dir(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(LEVEL_DIR_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn scale_of(levels: &[LevelMetadata], level: u32) -> Result<f64, ConfigError> {
    levels
        .iter()
        .find(|l| l.level == level)
        .map(|l| l.scale)
        .ok_or(ConfigError::LevelNotInTable { level })
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    quick_xml::de::from_str(text.trim_start_matches('\u{feff}')).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
