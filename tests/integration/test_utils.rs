//! Test utilities for integration tests.
//!
//! Provides:
//! - A builder that writes complete compact caches (conf.xml, conf.cdi and
//!   bundle files) into a temporary directory
//! - Minimal PNG and JPEG payloads
//! - Router helpers for driving requests with `oneshot`

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use tower::ServiceExt;

use bundle_tiles::bundle::{
    bundle_base, locate, record_index, record_position, BundleIndexRecord, BUNDLE_HEADER_SIZE,
    INDEX_RECORD_SIZE, INDEX_TABLE_SIZE, TILE_DATA_DIR,
};
use bundle_tiles::cache::{CONF_CDI, CONF_XML};
use bundle_tiles::config::ServiceEntry;
use bundle_tiles::service::{ServiceKind, ServiceRegistry};
use bundle_tiles::{create_router, RouterConfig};

// =============================================================================
// Tile Payloads
// =============================================================================

/// Bytes that start with the PNG signature.
pub fn png_payload(tag: u8) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R', tag]);
    data
}

/// Bytes that start with a JPEG SOI marker.
pub fn jpeg_payload(tag: u8) -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', tag, 0xFF, 0xD9]
}

// =============================================================================
// Cache Builder
// =============================================================================

/// Extent written to conf.cdi.
pub const EXTENT: (f64, f64, f64, f64) = (-2000000.0, -1000000.0, 3000000.0, 4000000.0);

/// Builder for on-disk compact caches.
pub struct CacheBuilder {
    table_levels: u32,
    tile_format: String,
    packet_size: u32,
    level_dirs: BTreeSet<u32>,
    tiles: BTreeMap<(u32, u32, u32), Vec<u8>>,
}

impl CacheBuilder {
    /// A cache whose level table holds levels `0..table_levels`.
    pub fn new(table_levels: u32) -> Self {
        Self {
            table_levels,
            tile_format: "PNG".to_string(),
            packet_size: 128,
            level_dirs: BTreeSet::new(),
            tiles: BTreeMap::new(),
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.tile_format = format.to_string();
        self
    }

    pub fn with_packet_size(mut self, packet_size: u32) -> Self {
        self.packet_size = packet_size;
        self
    }

    /// Create an empty level directory.
    pub fn with_level_dir(mut self, level: u32) -> Self {
        self.level_dirs.insert(level);
        self
    }

    /// Store a tile; its level directory is created as well.
    pub fn with_tile(mut self, level: u32, row: u32, column: u32, data: Vec<u8>) -> Self {
        self.level_dirs.insert(level);
        self.tiles.insert((level, row, column), data);
        self
    }

    /// Write the cache under `root`.
    pub fn build(&self, root: &Path) {
        fs::create_dir_all(root).unwrap();
        fs::write(root.join(CONF_XML), self.conf_xml()).unwrap();
        fs::write(root.join(CONF_CDI), conf_cdi()).unwrap();

        for level in &self.level_dirs {
            fs::create_dir_all(root.join(TILE_DATA_DIR).join(format!("L{:02}", level))).unwrap();
        }

        // Group tiles by bundle
        let mut bundles: BTreeMap<(u32, u32, u32), Vec<(u32, u32, &[u8])>> = BTreeMap::new();
        for ((level, row, column), data) in &self.tiles {
            bundles
                .entry((*level, bundle_base(*row), bundle_base(*column)))
                .or_default()
                .push((*row, *column, data.as_slice()));
        }

        for ((level, base_row, base_column), tiles) in bundles {
            let bytes = bundle_bytes(&tiles);
            let address = locate(root, level, base_row, base_column);
            fs::write(&address.bundle_path, bytes).unwrap();
        }
    }

    fn conf_xml(&self) -> String {
        let lods: String = (0..self.table_levels)
            .map(|i| {
                format!(
                    "<LODInfo xsi:type='typens:LODInfo'><LevelID>{}</LevelID>\
                     <Scale>{}</Scale><Resolution>{}</Resolution></LODInfo>",
                    i,
                    1_000_000.0 / f64::from(1u32 << i),
                    100.0 / f64::from(1u32 << i)
                )
            })
            .collect();

        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<CacheInfo xsi:type='typens:CacheInfo' xmlns:xsi='http://www.w3.org/2001/XMLSchema-instance' xmlns:typens='http://www.esri.com/schemas/ArcGIS/10.1'>
  <TileCacheInfo xsi:type='typens:TileCacheInfo'>
    <SpatialReference xsi:type='typens:ProjectedCoordinateSystem'>
      <WKT>PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere"]</WKT>
      <XOrigin>-20037700</XOrigin><YOrigin>-30241100</YOrigin>
      <XYScale>10000</XYScale><ZOrigin>-100000</ZOrigin><ZScale>10000</ZScale>
      <MOrigin>-100000</MOrigin><MScale>10000</MScale>
      <XYTolerance>0.001</XYTolerance><ZTolerance>0.001</ZTolerance><MTolerance>0.001</MTolerance>
      <HighPrecision>true</HighPrecision>
      <WKID>102100</WKID><LatestWKID>3857</LatestWKID>
    </SpatialReference>
    <TileOrigin xsi:type='typens:PointN'><X>-20037508.342787</X><Y>20037508.342787</Y></TileOrigin>
    <TileCols>256</TileCols><TileRows>256</TileRows><DPI>96</DPI><PreciseDPI>96</PreciseDPI>
    <LODInfos xsi:type='typens:ArrayOfLODInfo'>{lods}</LODInfos>
  </TileCacheInfo>
  <TileImageInfo xsi:type='typens:TileImageInfo'>
    <CacheTileFormat>{format}</CacheTileFormat><CompressionQuality>75</CompressionQuality>
    <Antialiasing>false</Antialiasing><BandCount>1</BandCount><LERCError>0.5</LERCError>
  </TileImageInfo>
  <CacheStorageInfo xsi:type='typens:CacheStorageInfo'>
    <StorageFormat>esriMapCacheStorageModeCompactV2</StorageFormat><PacketSize>{packet_size}</PacketSize>
  </CacheStorageInfo>
</CacheInfo>"#,
            lods = lods,
            format = self.tile_format,
            packet_size = self.packet_size
        )
    }
}

fn conf_cdi() -> String {
    let (xmin, ymin, xmax, ymax) = EXTENT;
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<EnvelopeN xsi:type='typens:EnvelopeN' xmlns:xsi='http://www.w3.org/2001/XMLSchema-instance' xmlns:typens='http://www.esri.com/schemas/ArcGIS/10.1'>
  <XMin>{}</XMin><YMin>{}</YMin><XMax>{}</XMax><YMax>{}</YMax>
  <SpatialReference xsi:type='typens:ProjectedCoordinateSystem'><WKID>102100</WKID><LatestWKID>3857</LatestWKID></SpatialReference>
</EnvelopeN>"#,
        xmin, ymin, xmax, ymax
    )
}

/// Serialize one bundle: zeroed header, index table, then tile data.
pub fn bundle_bytes(tiles: &[(u32, u32, &[u8])]) -> Vec<u8> {
    let mut bytes = vec![0u8; BUNDLE_HEADER_SIZE as usize + INDEX_TABLE_SIZE];
    for (row, column, data) in tiles {
        let offset = bytes.len() as u64;
        let record = BundleIndexRecord::new(offset, data.len() as u32).unwrap();
        let position = record_position(record_index(*row, *column)) as usize;
        bytes[position..position + INDEX_RECORD_SIZE].copy_from_slice(&record.encode());
        bytes.extend_from_slice(data);
    }
    bytes
}

// =============================================================================
// Router Helpers
// =============================================================================

pub fn service_entry(name: &str, kind: ServiceKind, root: &Path) -> ServiceEntry {
    ServiceEntry {
        name: name.to_string(),
        kind,
        tile_root_path: root.to_path_buf(),
        description: format!("{} test cache", name),
        copyright_text: "(c) Test".to_string(),
    }
}

/// Build a router over the given services with tracing disabled.
pub fn router_for(entries: &[ServiceEntry]) -> Router {
    let registry = Arc::new(ServiceRegistry::from_entries(entries));
    create_router(
        registry,
        RouterConfig::new()
            .with_cache_max_age(600)
            .with_tracing(false),
    )
}

/// Issue a GET request and collect the response.
pub async fn get(router: Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

/// Issue a GET request and parse the JSON body.
pub async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = get(router, uri).await;
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}
