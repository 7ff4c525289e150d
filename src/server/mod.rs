//! HTTP server layer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │     GET /rest/services/{name}/{kind}/tile/{level}/{row}/{col}   │
//! │                                                                 │
//! │  ┌──────────────────────────┐  ┌──────────────────────────────┐ │
//! │  │        handlers          │  │           routes             │ │
//! │  │ (requests, error bodies) │  │   (router config, CORS)      │ │
//! │  └──────────────────────────┘  └──────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//!                  ServiceRegistry → CompactCache
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, service_info_handler, services_handler, tile_handler, tilemap_handler,
    AppState, ErrorResponse, HandlerError, HealthResponse, ServiceSummary, ServicesResponse,
    TilePathParams, TilemapPathParams,
};
pub use routes::{create_router, RouterConfig};
