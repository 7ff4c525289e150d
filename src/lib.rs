//! # Bundle Tiles
//!
//! A reader and tile server for compact tile caches.
//!
//! A compact cache stores map tiles in bundle files, each holding a
//! 128×128 block of tiles behind a fixed-size index. This library locates
//! the bundle for any `(level, row, column)` address, reads the index record
//! and returns the stored tile bytes, without ever unpacking the cache.
//!
//! ## Features
//!
//! - **Direct bundle reads**: One index lookup and one data read per tile
//! - **Tilemaps**: Existence bitmaps for blocks of tiles, read from the index alone
//! - **Cache metadata**: `conf.xml` / `conf.cdi` parsing and level discovery
//! - **REST surface**: MapServer and ImageServer style endpoints over axum
//!
//! ## Architecture
//!
//! - [`io`] - Positioned file reads
//! - [`bundle`] - Bundle addressing, index records and the bundle reader
//! - [`cache`] - Cache metadata loading and the `CompactCache` facade
//! - [`mod@format`] - Tile payload formats and content types
//! - [`service`] - Published services and their descriptors
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and services file
//!
//! ## Example
//!
//! ```rust,no_run
//! use bundle_tiles::load_cache;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = load_cache("/data/caches/World")?;
//!
//!     let descriptor = cache.descriptor();
//!     println!("levels {}-{}", descriptor.min_level, descriptor.max_level);
//!
//!     let tile = cache.get_tile(descriptor.min_level, 0, 0)?;
//!     println!("{} bytes", tile.len());
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod io;
pub mod server;
pub mod service;

// Re-export commonly used types
pub use bundle::{BundleAddress, BundleIndexRecord, BundleReader, Tilemap, BUNDLE_SIZE};
pub use cache::{
    load_cache, CacheDescriptor, CacheState, CompactCache, DescriptorLoader, LevelMetadata,
};
pub use config::{CheckConfig, Cli, Command, ServeConfig, ServiceEntry, ServicesFile};
pub use error::{ConfigError, IoError, TileError};
pub use format::TileFormat;
pub use io::{FileRangeReader, RangeReader};
pub use server::{create_router, AppState, ErrorResponse, RouterConfig};
pub use service::{ServiceInfo, ServiceKind, ServiceRegistry, TiledService};
