//! Cache metadata and the cache facade.
//!
//! - [`DescriptorLoader`] reads `conf.xml`, `conf.cdi` and the level
//!   directories once, when a cache is opened
//! - [`CacheDescriptor`] holds the result, read-only from then on
//! - [`CompactCache`] pairs a descriptor with a bundle reader and is what
//!   the service layer calls into
//!
//! # Usage
//!
//! ```ignore
//! use bundle_tiles::cache::load_cache;
//!
//! let cache = load_cache("/data/caches/World")?;
//! println!("levels {}-{}", cache.descriptor().min_level, cache.descriptor().max_level);
//!
//! let png = cache.get_tile(3, 2, 5)?;
//! let tilemap = cache.get_tilemap(3, 0, 0, 32, 32)?;
//! ```

mod compact;
mod descriptor;
mod loader;

pub use compact::{load_cache, CacheState, CompactCache};
pub use descriptor::{
    CacheDescriptor, Extent, LevelMetadata, SpatialReference, TileImageInfo, TileOrigin,
};
pub use loader::{discover_levels, DescriptorLoader, CONF_CDI, CONF_XML};
