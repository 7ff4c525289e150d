//! The public entry point to one compact cache.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         CompactCache                            │
//! │   load_cache()          get_tile()            get_tilemap()     │
//! │        │                    │                      │            │
//! │        ▼                    ▼                      ▼            │
//! │ ┌──────────────────┐  ┌──────────────────────────────────────┐  │
//! │ │ DescriptorLoader │  │   level check → BundleReader         │  │
//! │ └──────────────────┘  └──────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::bundle::{BundleReader, Tilemap};
use crate::error::{ConfigError, TileError};

use super::descriptor::CacheDescriptor;
use super::loader::DescriptorLoader;

/// Open a cache: load its descriptor and prepare a bundle reader.
pub fn load_cache(root: impl AsRef<Path>) -> Result<CompactCache, ConfigError> {
    CompactCache::open(root)
}

/// A loaded, read-only compact cache.
///
/// Cloning is cheap; clones share the same descriptor. Every read opens and
/// closes its own file handle, so a `CompactCache` can be used from any
/// number of threads at once.
#[derive(Debug, Clone)]
pub struct CompactCache {
    descriptor: Arc<CacheDescriptor>,
    reader: BundleReader,
}

impl CompactCache {
    /// Load the cache rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let descriptor = DescriptorLoader::load(root)?;
        Ok(Self::from_descriptor(descriptor))
    }

    /// Wrap an already loaded descriptor.
    pub fn from_descriptor(descriptor: CacheDescriptor) -> Self {
        let reader = BundleReader::new(descriptor.root.clone());
        Self {
            descriptor: Arc::new(descriptor),
            reader,
        }
    }

    /// Cache metadata.
    pub fn descriptor(&self) -> &CacheDescriptor {
        &self.descriptor
    }

    /// Shared handle on the cache metadata.
    pub fn descriptor_arc(&self) -> Arc<CacheDescriptor> {
        Arc::clone(&self.descriptor)
    }

    /// Read the raw bytes of one tile.
    ///
    /// # Errors
    /// - `AddressOutOfRange` if the level is not in the level table
    /// - `TileNotFound` if no tile is stored at the address
    /// - `ReadFault` if the bundle is unreadable or truncated
    pub fn get_tile(&self, level: u32, row: u32, column: u32) -> Result<Bytes, TileError> {
        self.check_level(level)?;
        self.reader.read_tile(level, row, column)
    }

    /// Build the existence bitmap for a block of tiles.
    ///
    /// # Errors
    /// - `AddressOutOfRange` if the level is not in the level table
    /// - `ReadFault` if the bundle is unreadable or truncated
    pub fn get_tilemap(
        &self,
        level: u32,
        row: u32,
        column: u32,
        width: u32,
        height: u32,
    ) -> Result<Tilemap, TileError> {
        self.check_level(level)?;
        self.reader.read_tilemap(level, row, column, width, height)
    }

    fn check_level(&self, level: u32) -> Result<(), TileError> {
        if self.descriptor.level(level).is_some() {
            return Ok(());
        }
        let (min_level, max_level) = self.descriptor.level_table_range().unwrap_or((0, 0));
        Err(TileError::AddressOutOfRange {
            level,
            min_level,
            max_level,
        })
    }
}

// =============================================================================
// Cache State
// =============================================================================

/// A cache that either loaded successfully or failed to.
///
/// A failed load does not stop the process; the cache is kept around in the
/// `Unavailable` state and every request against it is refused.
#[derive(Debug, Clone)]
pub enum CacheState {
    Ready(CompactCache),
    Unavailable { reason: String },
}

impl CacheState {
    /// Load a cache, recording a failure instead of returning it.
    pub fn load(root: impl AsRef<Path>) -> Self {
        Self::from(load_cache(root))
    }

    /// Whether the cache can serve requests.
    pub fn is_ready(&self) -> bool {
        matches!(self, CacheState::Ready(_))
    }

    /// The loaded cache, or `CacheUnavailable`.
    pub fn ready(&self) -> Result<&CompactCache, TileError> {
        match self {
            CacheState::Ready(cache) => Ok(cache),
            CacheState::Unavailable { reason } => Err(TileError::CacheUnavailable {
                reason: reason.clone(),
            }),
        }
    }
}

impl From<Result<CompactCache, ConfigError>> for CacheState {
    fn from(result: Result<CompactCache, ConfigError>) -> Self {
        match result {
            Ok(cache) => CacheState::Ready(cache),
            Err(e) => CacheState::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}
