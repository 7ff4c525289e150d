use serde::{Deserialize, Serialize};

/// The kind of REST service a cache is published as.
///
/// Both kinds serve tiles from the same cache core; they differ only in the
/// descriptor they publish and in whether tilemaps are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    MapServer,
    ImageServer,
}

impl ServiceKind {
    /// URL segment and config `type` value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::MapServer => "MapServer",
            ServiceKind::ImageServer => "ImageServer",
        }
    }

    /// Parse a URL segment or config value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MapServer" => Some(ServiceKind::MapServer),
            "ImageServer" => Some(ServiceKind::ImageServer),
            _ => None,
        }
    }

    /// Value of the descriptor's `capabilities` field.
    pub const fn capabilities(&self) -> &'static str {
        match self {
            ServiceKind::MapServer => "Map",
            ServiceKind::ImageServer => "Image,Tilemap",
        }
    }

    /// Whether the kind publishes the tilemap operation.
    pub const fn supports_tilemap(&self) -> bool {
        matches!(self, ServiceKind::ImageServer)
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
