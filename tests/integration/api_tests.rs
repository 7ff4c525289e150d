//! API integration tests for the REST endpoints.
//!
//! Tests verify:
//! - Tile retrieval with content types and cache headers
//! - Tilemap documents
//! - Service catalog and descriptors
//! - Error cases (unknown service, missing tile, bad level, broken cache)

use axum::http::StatusCode;

use bundle_tiles::service::ServiceKind;

use super::test_utils::{
    get, get_json, jpeg_payload, png_payload, router_for, service_entry, CacheBuilder, EXTENT,
};

// =============================================================================
// Tile Retrieval
// =============================================================================

#[tokio::test]
async fn test_tile_retrieval_success() {
    let dir = tempfile::tempdir().unwrap();
    let tile = png_payload(1);
    CacheBuilder::new(8)
        .with_tile(3, 2, 5, tile.clone())
        .build(dir.path());
    let router = router_for(&[service_entry("World", ServiceKind::MapServer, dir.path())]);

    let (status, headers, body) = get(router, "/rest/services/World/MapServer/tile/3/2/5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/png");
    assert_eq!(headers.get("cache-control").unwrap(), "public, max-age=600");
    assert_eq!(body.as_ref(), tile.as_slice());
}

#[tokio::test]
async fn test_mixed_cache_sniffs_content_type() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(4)
        .with_format("MIXED")
        .with_tile(2, 0, 0, png_payload(1))
        .with_tile(2, 0, 1, jpeg_payload(2))
        .build(dir.path());
    let entries = [service_entry("Imagery", ServiceKind::MapServer, dir.path())];

    let (_, headers, _) = get(
        router_for(&entries),
        "/rest/services/Imagery/MapServer/tile/2/0/0",
    )
    .await;
    assert_eq!(headers.get("content-type").unwrap(), "image/png");

    let (_, headers, _) = get(
        router_for(&entries),
        "/rest/services/Imagery/MapServer/tile/2/0/1",
    )
    .await;
    assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
}

#[tokio::test]
async fn test_lerc_tiles_are_octet_stream() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(4)
        .with_format("LERC")
        .with_tile(1, 1, 1, b"CntZImage \x01\x02\x03".to_vec())
        .build(dir.path());
    let router = router_for(&[service_entry("Terrain", ServiceKind::ImageServer, dir.path())]);

    let (status, headers, _) = get(router, "/rest/services/Terrain/ImageServer/tile/1/1/1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("content-type").unwrap(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_tile_in_second_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let tile = jpeg_payload(7);
    CacheBuilder::new(10)
        .with_format("JPEG")
        .with_tile(7, 130, 5, tile.clone())
        .build(dir.path());
    let router = router_for(&[service_entry("World", ServiceKind::MapServer, dir.path())]);

    let (status, headers, body) =
        get(router, "/rest/services/World/MapServer/tile/7/130/5").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("content-type").unwrap(), "image/jpeg");
    assert_eq!(body.as_ref(), tile.as_slice());
}

// =============================================================================
// Tile Errors
// =============================================================================

#[tokio::test]
async fn test_missing_tile_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(8)
        .with_tile(3, 2, 5, png_payload(1))
        .build(dir.path());
    let entries = [service_entry("World", ServiceKind::MapServer, dir.path())];

    // Empty slot in an existing bundle
    let (status, json) = get_json(
        router_for(&entries),
        "/rest/services/World/MapServer/tile/3/2/6",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "tile_not_found");
    assert_eq!(json["status"], 404);

    // No bundle at all
    let (status, _) = get_json(
        router_for(&entries),
        "/rest/services/World/MapServer/tile/3/500/500",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_level_outside_table_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(4)
        .with_tile(1, 0, 0, png_payload(1))
        .build(dir.path());
    let router = router_for(&[service_entry("World", ServiceKind::MapServer, dir.path())]);

    let (status, json) = get_json(router, "/rest/services/World/MapServer/tile/30/0/0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_level");
}

#[tokio::test]
async fn test_malformed_coordinate_returns_400() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(4)
        .with_tile(1, 0, 0, png_payload(1))
        .build(dir.path());
    let router = router_for(&[service_entry("World", ServiceKind::MapServer, dir.path())]);

    let (status, json) = get_json(router, "/rest/services/World/MapServer/tile/1/abc/0").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "invalid_parameter");
    assert!(json["message"].as_str().unwrap().contains("row"));
}

#[tokio::test]
async fn test_unknown_service_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(4)
        .with_tile(1, 0, 0, png_payload(1))
        .build(dir.path());
    let entries = [service_entry("World", ServiceKind::MapServer, dir.path())];

    let (status, json) = get_json(
        router_for(&entries),
        "/rest/services/Nowhere/MapServer/tile/1/0/0",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "service_not_found");

    // Right name, wrong kind
    let (status, _) = get_json(router_for(&entries), "/rest/services/World/ImageServer").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unavailable_cache_returns_503() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken");
    std::fs::create_dir_all(&broken).unwrap();
    let router = router_for(&[service_entry("Broken", ServiceKind::MapServer, &broken)]);

    let (status, json) = get_json(router.clone(), "/rest/services/Broken/MapServer/tile/0/0/0").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "cache_unavailable");

    let (status, _) = get_json(router, "/rest/services/Broken/MapServer").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_truncated_bundle_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(4)
        .with_tile(1, 0, 0, png_payload(1))
        .build(dir.path());
    let bundle = dir.path().join("_alllayers/L01/R0000C0000.bundle");
    std::fs::write(&bundle, vec![0u8; 66]).unwrap();
    let router = router_for(&[service_entry("World", ServiceKind::MapServer, dir.path())]);

    let (status, json) = get_json(router, "/rest/services/World/MapServer/tile/1/0/0").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "read_fault");
}

// =============================================================================
// Tilemap
// =============================================================================

#[tokio::test]
async fn test_tilemap_document() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(6)
        .with_tile(4, 0, 0, png_payload(1))
        .with_tile(4, 1, 1, png_payload(2))
        .with_tile(4, 1, 2, png_payload(3))
        .build(dir.path());
    let router = router_for(&[service_entry("Terrain", ServiceKind::ImageServer, dir.path())]);

    let (status, json) = get_json(
        router,
        "/rest/services/Terrain/ImageServer/tilemap/4/0/0/3/2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["adjusted"], false);
    assert_eq!(json["location"], "0,0,3,2");
    assert_eq!(json["data"], serde_json::json!([1, 0, 0, 0, 1, 1]));
}

#[tokio::test]
async fn test_tilemap_clamped_at_bundle_edge() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(6)
        .with_tile(2, 127, 127, png_payload(1))
        .build(dir.path());
    let router = router_for(&[service_entry("Terrain", ServiceKind::ImageServer, dir.path())]);

    let (status, json) = get_json(
        router,
        "/rest/services/Terrain/ImageServer/tilemap/2/126/125/8/8",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["adjusted"], true);
    assert_eq!(json["location"], "125,126,3,2");
    assert_eq!(json["data"], serde_json::json!([0, 0, 0, 0, 0, 1]));
}

#[tokio::test]
async fn test_tilemap_without_bundle_is_all_zero() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(6).with_level_dir(3).build(dir.path());
    let router = router_for(&[service_entry("Terrain", ServiceKind::ImageServer, dir.path())]);

    let (status, json) = get_json(
        router,
        "/rest/services/Terrain/ImageServer/tilemap/3/0/0/2/2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], serde_json::json!([0, 0, 0, 0]));
}

#[tokio::test]
async fn test_tilemap_not_offered_by_map_server() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(6)
        .with_tile(4, 0, 0, png_payload(1))
        .build(dir.path());
    let router = router_for(&[service_entry("World", ServiceKind::MapServer, dir.path())]);

    let (status, json) =
        get_json(router, "/rest/services/World/MapServer/tilemap/4/0/0/2/2").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "unsupported_operation");
}

// =============================================================================
// Catalog and Descriptors
// =============================================================================

#[tokio::test]
async fn test_services_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let world = dir.path().join("world");
    let terrain = dir.path().join("terrain");
    CacheBuilder::new(4)
        .with_tile(0, 0, 0, png_payload(1))
        .build(&world);
    CacheBuilder::new(4)
        .with_format("LERC")
        .with_tile(0, 0, 0, vec![1, 2, 3])
        .build(&terrain);
    let router = router_for(&[
        service_entry("World", ServiceKind::MapServer, &world),
        service_entry("Terrain", ServiceKind::ImageServer, &terrain),
    ]);

    let (status, json) = get_json(router, "/rest/services").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["currentVersion"], 10.9);
    assert_eq!(json["folders"], serde_json::json!([]));
    let services = json["services"].as_array().unwrap();
    assert_eq!(services.len(), 2);
    // Name order
    assert_eq!(services[0]["name"], "Terrain");
    assert_eq!(services[0]["type"], "ImageServer");
    assert_eq!(services[0]["url"], "/rest/services/Terrain/ImageServer");
    assert_eq!(services[1]["name"], "World");
}

#[tokio::test]
async fn test_map_service_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(10)
        .with_level_dir(2)
        .with_tile(6, 0, 0, png_payload(1))
        .build(dir.path());
    let router = router_for(&[service_entry("World", ServiceKind::MapServer, dir.path())]);

    let (status, json) = get_json(router, "/rest/services/World/MapServer").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mapName"], "World");
    assert_eq!(json["capabilities"], "Map");
    assert_eq!(json["description"], "World test cache");
    assert_eq!(json["copyrightText"], "(c) Test");
    assert_eq!(json["minLOD"], 2);
    assert_eq!(json["maxLOD"], 6);
    assert_eq!(json["minScale"], 250000.0);
    assert_eq!(json["maxScale"], 15625.0);
    assert_eq!(json["tileInfo"]["rows"], 256);
    assert_eq!(json["tileInfo"]["format"], "PNG");
    assert_eq!(json["tileInfo"]["lods"].as_array().unwrap().len(), 10);
    assert_eq!(json["spatialReference"]["wkid"], 102100);
    assert_eq!(json["fullExtent"]["xmin"], EXTENT.0);
    assert_eq!(json["fullExtent"]["ymax"], EXTENT.3);
    assert_eq!(json["initialExtent"], json["fullExtent"]);
}

#[tokio::test]
async fn test_image_service_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    CacheBuilder::new(4)
        .with_format("LERC")
        .with_tile(0, 0, 0, vec![1])
        .build(dir.path());
    let router = router_for(&[service_entry("Terrain", ServiceKind::ImageServer, dir.path())]);

    let (status, json) = get_json(router, "/rest/services/Terrain/ImageServer").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["capabilities"], "Image,Tilemap");
    assert_eq!(json["cacheType"], "Elevation");
    assert_eq!(json["extent"], json["fullExtent"]);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_degraded_services() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good");
    CacheBuilder::new(2)
        .with_tile(0, 0, 0, png_payload(1))
        .build(&good);
    let missing = dir.path().join("missing");

    let healthy = router_for(&[service_entry("Good", ServiceKind::MapServer, &good)]);
    let (status, json) = get_json(healthy, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["services"], 1);

    let degraded = router_for(&[
        service_entry("Good", ServiceKind::MapServer, &good),
        service_entry("Missing", ServiceKind::MapServer, &missing),
    ]);
    let (status, json) = get_json(degraded, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["unavailable"], 1);
}
