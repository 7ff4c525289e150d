//! Router configuration for the tile server.
//!
//! # Route Structure
//!
//! ```text
//! /health                                                        - Health check
//! /rest/services                                                 - Service catalog
//! /rest/services/{name}/{kind}                                   - Service descriptor
//! /rest/services/{name}/{kind}/tile/{level}/{row}/{column}       - Tile
//! /rest/services/{name}/{kind}/tilemap/{level}/{row}/{column}/{width}/{height}
//!                                                                - Tilemap
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bundle_tiles::server::{create_router, RouterConfig};
//! use bundle_tiles::service::ServiceRegistry;
//!
//! let registry = Arc::new(ServiceRegistry::from_entries(&services));
//! let config = RouterConfig::new()
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(registry, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, service_info_handler, services_handler, tile_handler, tilemap_handler,
    AppState,
};
use crate::service::ServiceRegistry;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Cache-Control max-age in seconds
    pub cache_max_age: u32,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterConfig {
    /// Create a router configuration.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Cache max-age is 1 hour (3600 seconds)
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            cors_origins: None,
            cache_max_age: 3600,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    /// Set the Cache-Control max-age in seconds.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the application router.
///
/// # Arguments
///
/// * `registry` - Every published service
/// * `config` - Router configuration
pub fn create_router(registry: Arc<ServiceRegistry>, config: RouterConfig) -> Router {
    let app_state = AppState::with_cache_max_age(registry, config.cache_max_age);
    let cors = build_cors_layer(&config);

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/rest/services", get(services_handler))
        .route("/rest/services/{name}/{kind}", get(service_info_handler))
        .route(
            "/rest/services/{name}/{kind}/tile/{level}/{row}/{column}",
            get(tile_handler),
        )
        .route(
            "/rest/services/{name}/{kind}/tilemap/{level}/{row}/{column}/{width}/{height}",
            get(tilemap_handler),
        )
        .with_state(app_state)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400));

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        // No origins: cross-origin requests get no CORS headers
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
