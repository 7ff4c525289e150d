//! Service registry.
//!
//! The registry is built once at startup from the services file and shared
//! by reference with every request handler. It never changes afterwards, so
//! it needs no locking.
//!
//! # Example
//!
//! ```ignore
//! use bundle_tiles::config::ServicesFile;
//! use bundle_tiles::service::ServiceRegistry;
//!
//! let file = ServicesFile::load("conf.json")?;
//! let registry = ServiceRegistry::from_entries(&file.services);
//!
//! let service = registry.resolve("World", "MapServer")?;
//! let tile = service.get_tile(3, 2, 5)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info};

use crate::bundle::Tilemap;
use crate::cache::CacheState;
use crate::config::ServiceEntry;
use crate::error::TileError;

use super::info::ServiceInfo;
use super::kind::ServiceKind;

// =============================================================================
// TiledService
// =============================================================================

/// Raw tile bytes with the MIME type to serve them under.
#[derive(Debug, Clone)]
pub struct TilePayload {
    pub data: Bytes,
    pub content_type: &'static str,
}

/// One published cache.
#[derive(Debug, Clone)]
pub struct TiledService {
    pub name: String,
    pub kind: ServiceKind,
    pub description: String,
    pub copyright_text: String,
    pub cache: CacheState,
}

impl TiledService {
    /// Create a service with empty description and copyright.
    pub fn new(name: impl Into<String>, kind: ServiceKind, cache: CacheState) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            copyright_text: String::new(),
            cache,
        }
    }

    /// Load the cache of a configured service.
    ///
    /// A cache that fails to load is logged and kept as unavailable.
    pub fn open(entry: &ServiceEntry) -> Self {
        let cache = CacheState::load(&entry.tile_root_path);
        match &cache {
            CacheState::Ready(cache) => info!(
                "Service {}/{} ready: levels {}-{}, format {}",
                entry.name,
                entry.kind,
                cache.descriptor().min_level,
                cache.descriptor().max_level,
                cache.descriptor().image.format
            ),
            CacheState::Unavailable { reason } => error!(
                "Service {}/{} unavailable: {}",
                entry.name, entry.kind, reason
            ),
        }

        Self {
            name: entry.name.clone(),
            kind: entry.kind,
            description: entry.description.clone(),
            copyright_text: entry.copyright_text.clone(),
            cache,
        }
    }

    /// Relative URL of the service.
    pub fn url(&self) -> String {
        format!("/rest/services/{}/{}", self.name, self.kind)
    }

    /// Build the service descriptor document.
    pub fn info(&self) -> Result<ServiceInfo, TileError> {
        let cache = self.cache.ready()?;
        Ok(ServiceInfo::build(
            self.kind,
            &self.name,
            &self.description,
            &self.copyright_text,
            cache.descriptor(),
        ))
    }

    /// Read one tile and resolve its content type.
    pub fn get_tile(&self, level: u32, row: u32, column: u32) -> Result<TilePayload, TileError> {
        let cache = self.cache.ready()?;
        let data = cache.get_tile(level, row, column)?;
        let content_type = cache.descriptor().tile_format().content_type(&data);
        Ok(TilePayload { data, content_type })
    }

    /// Build a tilemap, if the service kind offers them.
    pub fn get_tilemap(
        &self,
        level: u32,
        row: u32,
        column: u32,
        width: u32,
        height: u32,
    ) -> Result<Tilemap, TileError> {
        if !self.kind.supports_tilemap() {
            return Err(TileError::UnsupportedOperation {
                kind: self.kind.as_str(),
                operation: "tilemap",
            });
        }
        self.cache
            .ready()?
            .get_tilemap(level, row, column, width, height)
    }
}

// =============================================================================
// ServiceRegistry
// =============================================================================

/// Name-ordered set of published services.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Arc<TiledService>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured service.
    pub fn from_entries(entries: &[ServiceEntry]) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            registry.insert(TiledService::open(entry));
        }
        info!(
            "Loaded {} service(s), {} ready",
            registry.len(),
            registry.ready_count()
        );
        registry
    }

    /// Add a service, replacing any service of the same name.
    pub fn insert(&mut self, service: TiledService) {
        self.services
            .insert(service.name.clone(), Arc::new(service));
    }

    /// Look up a service by name.
    pub fn get(&self, name: &str) -> Option<Arc<TiledService>> {
        self.services.get(name).cloned()
    }

    /// Look up a service by the name and kind segments of its URL.
    ///
    /// # Errors
    /// `ServiceNotFound` if no service has that name, or its kind differs.
    pub fn resolve(&self, name: &str, kind: &str) -> Result<Arc<TiledService>, TileError> {
        self.services
            .get(name)
            .filter(|service| ServiceKind::parse(kind) == Some(service.kind))
            .cloned()
            .ok_or_else(|| TileError::ServiceNotFound {
                name: format!("{}/{}", name, kind),
            })
    }

    /// Services in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TiledService>> {
        self.services.values()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Number of services whose cache loaded.
    pub fn ready_count(&self) -> usize {
        self.services
            .values()
            .filter(|service| service.cache.is_ready())
            .count()
    }
}
