use thiserror::Error;

/// I/O errors that can occur when reading bundle files from disk
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// File does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// Any other failure to open, seek or read a file
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Requested range exceeds file bounds (truncated bundle)
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },
}

impl IoError {
    /// Build an `IoError` from a `std::io::Error`, keeping "not found" distinct.
    pub fn from_std(path: impl Into<String>, err: std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            IoError::NotFound(path)
        } else {
            IoError::Io {
                path,
                message: err.to_string(),
            }
        }
    }
}

/// Errors raised while opening a cache and loading its metadata documents.
///
/// Any of these leaves the cache unusable; requests against it report
/// [`TileError::CacheUnavailable`].
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A metadata document or directory could not be opened or read
    #[error("Cannot read {path}: {message}")]
    Open { path: String, message: String },

    /// A metadata document is malformed
    #[error("Malformed document {path}: {message}")]
    Parse { path: String, message: String },

    /// The tile-data directory holds no level directories
    #[error("No level directories found under {path}")]
    NoLevelDirectories { path: String },

    /// A level present on disk has no entry in the level table
    #[error("Level {level} found on disk but missing from the level table")]
    LevelNotInTable { level: u32 },

    /// Bundles with a side other than 128 tiles are not supported
    #[error("Unsupported bundle packet size: {0} (only 128 is supported)")]
    UnsupportedPacketSize(u32),

    /// The services file is invalid
    #[error("Invalid services configuration: {0}")]
    Services(String),
}

/// Errors that can occur when serving tiles and tilemaps
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// No tile is stored at this address (missing bundle or empty slot)
    #[error("Tile not found: level {level}, row {row}, column {column}")]
    TileNotFound { level: u32, row: u32, column: u32 },

    /// The bundle exists but could not be read as expected
    #[error("Cache read fault: {0}")]
    ReadFault(#[from] IoError),

    /// The cache failed to load at startup
    #[error("Cache unavailable: {reason}")]
    CacheUnavailable { reason: String },

    /// The address cannot be represented by the cache's level table
    #[error("Level {level} is out of range (valid levels: {min_level}-{max_level})")]
    AddressOutOfRange {
        level: u32,
        min_level: u32,
        max_level: u32,
    },

    /// No service registered under this name and kind
    #[error("Service not found: {name}")]
    ServiceNotFound { name: String },

    /// The service kind does not offer this operation
    #[error("{kind} does not support {operation}")]
    UnsupportedOperation {
        kind: &'static str,
        operation: &'static str,
    },

    /// A request parameter could not be parsed
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
}
