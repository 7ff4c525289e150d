//! HTTP request handlers for the tile service REST API.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /rest/services` - Service catalog
//! - `GET /rest/services/{name}/{kind}` - Service descriptor
//! - `GET /rest/services/{name}/{kind}/tile/{level}/{row}/{column}` - Raw tile
//! - `GET /rest/services/{name}/{kind}/tilemap/{level}/{row}/{column}/{width}/{height}` - Tilemap

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::bundle::Tilemap;
use crate::error::{IoError, TileError};
use crate::service::{ServiceInfo, ServiceRegistry, CURRENT_VERSION};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state passed to all handlers via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Every published service
    pub registry: Arc<ServiceRegistry>,

    /// Cache-Control max-age in seconds for tile responses
    pub cache_max_age: u32,
}

impl AppState {
    /// Create application state with the default 1 hour max-age.
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            cache_max_age: 3600,
        }
    }

    /// Create application state with a custom max-age.
    pub fn with_cache_max_age(registry: Arc<ServiceRegistry>, cache_max_age: u32) -> Self {
        Self {
            registry,
            cache_max_age,
        }
    }
}

// =============================================================================
// Request Parameters
// =============================================================================

/// Path parameters for tile requests.
///
/// Coordinates are kept as strings so a malformed value produces the same
/// JSON error body as every other failure.
#[derive(Debug, Deserialize)]
pub struct TilePathParams {
    pub name: String,
    pub kind: String,
    pub level: String,
    pub row: String,
    pub column: String,
}

impl TilePathParams {
    /// Parse `(level, row, column)`.
    pub fn address(&self) -> Result<(u32, u32, u32), TileError> {
        Ok((
            parse_coordinate("level", &self.level)?,
            parse_coordinate("row", &self.row)?,
            parse_coordinate("column", &self.column)?,
        ))
    }
}

/// Path parameters for tilemap requests.
#[derive(Debug, Deserialize)]
pub struct TilemapPathParams {
    pub name: String,
    pub kind: String,
    pub level: String,
    pub row: String,
    pub column: String,
    pub width: String,
    pub height: String,
}

impl TilemapPathParams {
    /// Parse `(level, row, column, width, height)`.
    pub fn block(&self) -> Result<(u32, u32, u32, u32, u32), TileError> {
        Ok((
            parse_coordinate("level", &self.level)?,
            parse_coordinate("row", &self.row)?,
            parse_coordinate("column", &self.column)?,
            parse_coordinate("width", &self.width)?,
            parse_coordinate("height", &self.height)?,
        ))
    }
}

fn parse_coordinate(name: &'static str, value: &str) -> Result<u32, TileError> {
    value.parse().map_err(|_| TileError::InvalidParameter {
        name,
        value: value.to_string(),
    })
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "invalid_parameter")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" when every cache loaded, "degraded" otherwise
    pub status: String,

    /// Service version
    pub version: String,

    /// Number of configured services
    pub services: usize,

    /// Number of services whose cache failed to load
    pub unavailable: usize,
}

/// One entry of the service catalog.
#[derive(Debug, Serialize)]
pub struct ServiceSummary {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub url: String,
}

/// Response from the service catalog endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesResponse {
    pub current_version: f64,
    pub folders: Vec<String>,
    pub services: Vec<ServiceSummary>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert TileError to HTTP response.
///
/// 5xx errors are logged at ERROR level, 404s at DEBUG and other client
/// errors at WARN.
impl IntoResponse for TileError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            TileError::ServiceNotFound { .. } => (StatusCode::NOT_FOUND, "service_not_found"),
            TileError::TileNotFound { .. } => (StatusCode::NOT_FOUND, "tile_not_found"),
            TileError::AddressOutOfRange { .. } => (StatusCode::BAD_REQUEST, "invalid_level"),
            TileError::InvalidParameter { .. } => (StatusCode::BAD_REQUEST, "invalid_parameter"),
            TileError::UnsupportedOperation { .. } => {
                (StatusCode::BAD_REQUEST, "unsupported_operation")
            }
            TileError::CacheUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "cache_unavailable")
            }
            TileError::ReadFault(_) => (StatusCode::INTERNAL_SERVER_ERROR, "read_fault"),
        };
        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);

        (status, Json(error_response)).into_response()
    }
}

/// Wrapper for handler errors to implement IntoResponse.
pub struct HandlerError(pub TileError);

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

impl From<TileError> for HandlerError {
    fn from(err: TileError) -> Self {
        HandlerError(err)
    }
}

/// Run synchronous cache work on the blocking pool.
async fn run_blocking<T, F>(task: F) -> Result<T, TileError>
where
    F: FnOnce() -> Result<T, TileError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        TileError::ReadFault(IoError::Io {
            path: "<blocking task>".to_string(),
            message: e.to_string(),
        })
    })?
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "services": 2,
///   "unavailable": 0
/// }
/// ```
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let services = state.registry.len();
    let unavailable = services - state.registry.ready_count();
    let status = if unavailable == 0 { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
        unavailable,
    })
}

/// Handle service catalog requests.
///
/// # Endpoint
///
/// `GET /rest/services`
///
/// # Response
///
/// ```json
/// {
///   "currentVersion": 10.9,
///   "folders": [],
///   "services": [{ "name": "World", "type": "MapServer", "url": "/rest/services/World/MapServer" }]
/// }
/// ```
pub async fn services_handler(State(state): State<AppState>) -> Json<ServicesResponse> {
    let services = state
        .registry
        .iter()
        .map(|service| ServiceSummary {
            name: service.name.clone(),
            kind: service.kind.as_str().to_string(),
            url: service.url(),
        })
        .collect();

    Json(ServicesResponse {
        current_version: CURRENT_VERSION,
        folders: Vec::new(),
        services,
    })
}

/// Handle service descriptor requests.
///
/// # Endpoint
///
/// `GET /rest/services/{name}/{kind}`
///
/// # Response
///
/// - `200 OK`: `MapServer` or `ImageServer` descriptor JSON
/// - `404 Not Found`: No service with that name and kind
/// - `503 Service Unavailable`: The cache failed to load
pub async fn service_info_handler(
    State(state): State<AppState>,
    Path((name, kind)): Path<(String, String)>,
) -> Result<Json<ServiceInfo>, HandlerError> {
    let service = state.registry.resolve(&name, &kind)?;
    debug!("Descriptor request for {}/{}", name, kind);
    Ok(Json(service.info()?))
}

/// Handle tile requests.
///
/// # Endpoint
///
/// `GET /rest/services/{name}/{kind}/tile/{level}/{row}/{column}`
///
/// # Response
///
/// - `200 OK`: Raw tile bytes, `Content-Type` from the cache tile format
/// - `400 Bad Request`: Malformed coordinate or level outside the cache
/// - `404 Not Found`: Unknown service or no tile at the address
/// - `500 Internal Server Error`: Unreadable bundle
/// - `503 Service Unavailable`: The cache failed to load
///
/// # Headers
///
/// - `Content-Type: image/png | image/jpeg | application/octet-stream`
/// - `Cache-Control: public, max-age={cache_max_age}`
pub async fn tile_handler(
    State(state): State<AppState>,
    Path(params): Path<TilePathParams>,
) -> Result<Response, HandlerError> {
    let service = state.registry.resolve(&params.name, &params.kind)?;
    let (level, row, column) = params.address()?;

    debug!(
        "Tile request {}/{} level={} row={} column={}",
        params.name, params.kind, level, row, column
    );

    let payload = run_blocking(move || service.get_tile(level, row, column)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, payload.content_type.to_string()),
            (
                header::CACHE_CONTROL,
                format!("public, max-age={}", state.cache_max_age),
            ),
        ],
        payload.data,
    )
        .into_response())
}

/// Handle tilemap requests.
///
/// # Endpoint
///
/// `GET /rest/services/{name}/{kind}/tilemap/{level}/{row}/{column}/{width}/{height}`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// { "adjusted": false, "location": "0,0,2,2", "data": [1, 0, 0, 1] }
/// ```
///
/// `data` is row-major: `height` rows of `width` entries.
pub async fn tilemap_handler(
    State(state): State<AppState>,
    Path(params): Path<TilemapPathParams>,
) -> Result<Json<Tilemap>, HandlerError> {
    let service = state.registry.resolve(&params.name, &params.kind)?;
    let (level, row, column, width, height) = params.block()?;

    debug!(
        "Tilemap request {}/{} level={} row={} column={} {}x{}",
        params.name, params.kind, level, row, column, width, height
    );

    let tilemap =
        run_blocking(move || service.get_tilemap(level, row, column, width, height)).await?;

    Ok(Json(tilemap))
}

// =============================================================================
// Tests
// =============================================================================
