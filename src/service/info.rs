//! Service descriptor documents.
//!
//! Field names and fixed values follow the tile service REST schema that
//! map clients expect when they fetch `/rest/services/{name}/{kind}`.

use serde::Serialize;

use crate::cache::{CacheDescriptor, Extent, LevelMetadata, SpatialReference, TileOrigin};

use super::kind::ServiceKind;

/// REST API version reported by the descriptors.
pub const CURRENT_VERSION: f64 = 10.9;

/// Units of the supported projected caches.
pub const UNITS: &str = "esriMeters";

/// Export formats advertised by the descriptors.
pub const SUPPORTED_IMAGE_FORMAT_TYPES: &str =
    "PNG32,PNG24,PNG,JPG,DIB,TIFF,EMF,PS,PDF,GIF,SVG,SVGZ,BMP";

/// Query formats advertised by the descriptors.
pub const SUPPORTED_QUERY_FORMATS: &str = "JSON";

/// Tiling scheme block shared by both descriptor kinds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileInfo {
    pub rows: u32,
    pub cols: u32,
    pub dpi: u32,
    pub format: String,
    pub compression_quality: f64,
    pub origin: TileOrigin,
    pub spatial_reference: SpatialReference,
    pub lods: Vec<LevelMetadata>,
}

impl TileInfo {
    fn from_descriptor(descriptor: &CacheDescriptor) -> Self {
        Self {
            rows: descriptor.tile_rows,
            cols: descriptor.tile_cols,
            dpi: descriptor.dpi,
            format: descriptor.image.format.clone(),
            compression_quality: descriptor.image.compression_quality,
            origin: descriptor.origin,
            spatial_reference: descriptor.spatial_reference.clone(),
            lods: descriptor.levels.clone(),
        }
    }
}

/// Descriptor of a `MapServer` service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapServiceInfo {
    pub current_version: f64,
    pub service_description: String,
    pub map_name: String,
    pub description: String,
    pub copyright_text: String,
    pub supports_dynamic_layers: bool,
    pub spatial_reference: SpatialReference,
    pub capabilities: &'static str,
    pub layers: Vec<String>,
    pub tables: Vec<String>,
    pub single_fused_map_cache: bool,
    pub tile_info: TileInfo,
    #[serde(rename = "maxLOD")]
    pub max_lod: u32,
    #[serde(rename = "minLOD")]
    pub min_lod: u32,
    pub max_scale: f64,
    pub min_scale: f64,
    pub initial_extent: Extent,
    pub full_extent: Extent,
    pub units: &'static str,
    pub supported_image_format_types: &'static str,
    pub supported_query_formats: &'static str,
}

/// Descriptor of an `ImageServer` service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageServiceInfo {
    pub current_version: f64,
    pub service_description: String,
    pub map_name: String,
    pub description: String,
    pub copyright_text: String,
    pub spatial_reference: SpatialReference,
    pub capabilities: &'static str,
    pub cache_type: &'static str,
    pub service_data_type: &'static str,
    pub single_fused_map_cache: bool,
    pub tile_info: TileInfo,
    #[serde(rename = "maxLOD")]
    pub max_lod: u32,
    #[serde(rename = "minLOD")]
    pub min_lod: u32,
    pub max_scale: f64,
    pub min_scale: f64,
    pub extent: Extent,
    pub initial_extent: Extent,
    pub full_extent: Extent,
    pub units: &'static str,
    pub supported_image_format_types: &'static str,
    pub supported_query_formats: &'static str,
}

/// Descriptor of either kind; serializes as the inner document.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ServiceInfo {
    Map(MapServiceInfo),
    Image(ImageServiceInfo),
}

impl ServiceInfo {
    /// Build the descriptor a service of `kind` publishes for a cache.
    pub fn build(
        kind: ServiceKind,
        name: &str,
        description: &str,
        copyright_text: &str,
        descriptor: &CacheDescriptor,
    ) -> Self {
        let extent = descriptor.extent.clone();
        match kind {
            ServiceKind::MapServer => ServiceInfo::Map(MapServiceInfo {
                current_version: CURRENT_VERSION,
                service_description: description.to_string(),
                map_name: name.to_string(),
                description: description.to_string(),
                copyright_text: copyright_text.to_string(),
                supports_dynamic_layers: false,
                spatial_reference: descriptor.spatial_reference.clone(),
                capabilities: kind.capabilities(),
                layers: Vec::new(),
                tables: Vec::new(),
                single_fused_map_cache: true,
                tile_info: TileInfo::from_descriptor(descriptor),
                max_lod: descriptor.max_level,
                min_lod: descriptor.min_level,
                max_scale: descriptor.max_scale,
                min_scale: descriptor.min_scale,
                initial_extent: extent.clone(),
                full_extent: extent,
                units: UNITS,
                supported_image_format_types: SUPPORTED_IMAGE_FORMAT_TYPES,
                supported_query_formats: SUPPORTED_QUERY_FORMATS,
            }),
            ServiceKind::ImageServer => ServiceInfo::Image(ImageServiceInfo {
                current_version: CURRENT_VERSION,
                service_description: description.to_string(),
                map_name: name.to_string(),
                description: description.to_string(),
                copyright_text: copyright_text.to_string(),
                spatial_reference: descriptor.spatial_reference.clone(),
                capabilities: kind.capabilities(),
                cache_type: "Elevation",
                service_data_type: "esriImageServiceDataTypeElevation",
                single_fused_map_cache: true,
                tile_info: TileInfo::from_descriptor(descriptor),
                max_lod: descriptor.max_level,
                min_lod: descriptor.min_level,
                max_scale: descriptor.max_scale,
                min_scale: descriptor.min_scale,
                extent: extent.clone(),
                initial_extent: extent.clone(),
                full_extent: extent,
                units: UNITS,
                supported_image_format_types: SUPPORTED_IMAGE_FORMAT_TYPES,
                supported_query_formats: SUPPORTED_QUERY_FORMATS,
            }),
        }
    }
}
