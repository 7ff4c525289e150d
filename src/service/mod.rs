//! Published services.
//!
//! A service binds a name and a [`ServiceKind`] to one compact cache. The
//! [`ServiceRegistry`] holds every service configured at startup and the
//! HTTP layer resolves requests against it.

mod info;
mod kind;
mod registry;

pub use info::{
    ImageServiceInfo, MapServiceInfo, ServiceInfo, TileInfo, CURRENT_VERSION,
    SUPPORTED_IMAGE_FORMAT_TYPES, SUPPORTED_QUERY_FORMATS, UNITS,
};
pub use kind::ServiceKind;
pub use registry::{ServiceRegistry, TiledService, TilePayload};
