//! Configuration management for the bundle tile server.
//!
//! Two sources feed the server:
//! - Command-line arguments via clap, each with a `BUNDLE_TILES_` environment
//!   variable fallback
//! - A JSON services file listing the caches to publish
//!
//! # Example
//!
//! ```ignore
//! use bundle_tiles::config::{Cli, Command, ServicesFile};
//!
//! let cli = Cli::parse();
//! if let Command::Serve(config) = cli.into_command() {
//!     let services = ServicesFile::load(&config.services)?;
//!     println!("{} service(s) on {}", services.services.len(), config.bind_address());
//! }
//! ```
//!
//! # Services File
//!
//! ```json
//! {
//!   "services": [
//!     { "name": "World", "type": "MapServer", "tileRootPath": "/data/World",
//!       "description": "World basemap", "copyrightText": "(c) Example" },
//!     { "name": "Terrain", "type": "ImageServer", "tileRootPath": "/data/Terrain" }
//!   ]
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `BUNDLE_TILES_HOST` - Server bind address (default: 0.0.0.0)
//! - `BUNDLE_TILES_PORT` - Server port (default: 8080)
//! - `BUNDLE_TILES_SERVICES` - Services file (default: conf.json)
//! - `BUNDLE_TILES_CACHE_MAX_AGE` - HTTP cache max-age seconds (default: 3600)
//! - `BUNDLE_TILES_CORS_ORIGINS` - Allowed CORS origins, comma-separated

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::service::ServiceKind;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default services file.
pub const DEFAULT_SERVICES_FILE: &str = "conf.json";

/// Default HTTP cache max-age in seconds (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Bundle Tiles - serves map and elevation tiles straight from compact cache
/// bundle files.
#[derive(Parser, Debug, Clone)]
#[command(name = "bundle-tiles")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Consume the parsed arguments and return the selected subcommand.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the tile server.
    Serve(ServeConfig),

    /// Load one cache and report what it contains.
    Check(CheckConfig),
}

/// Options of the `serve` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ServeConfig {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "BUNDLE_TILES_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "BUNDLE_TILES_PORT")]
    pub port: u16,

    /// JSON file listing the services to publish.
    #[arg(
        short,
        long,
        default_value = DEFAULT_SERVICES_FILE,
        env = "BUNDLE_TILES_SERVICES"
    )]
    pub services: PathBuf,

    // =========================================================================
    // HTTP Configuration
    // =========================================================================
    /// HTTP Cache-Control max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "BUNDLE_TILES_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "BUNDLE_TILES_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl ServeConfig {
    /// Validate the server options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be greater than 0".to_string());
        }
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Options of the `check` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CheckConfig {
    /// Cache root directory (the one holding conf.xml).
    #[arg(long)]
    pub root: PathBuf,

    /// Tile to read as a probe, written as LEVEL/ROW/COLUMN.
    #[arg(long, value_parser = parse_tile_address)]
    pub tile: Option<TileAddress>,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// A `level/row/column` triple given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileAddress {
    pub level: u32,
    pub row: u32,
    pub column: u32,
}

/// Parse `LEVEL/ROW/COLUMN`.
pub fn parse_tile_address(value: &str) -> Result<TileAddress, String> {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != 3 {
        return Err(format!("expected LEVEL/ROW/COLUMN, got '{}'", value));
    }

    let parse = |name: &str, part: &str| -> Result<u32, String> {
        part.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid {} '{}'", name, part))
    };

    Ok(TileAddress {
        level: parse("level", parts[0])?,
        row: parse("row", parts[1])?,
        column: parse("column", parts[2])?,
    })
}

// =============================================================================
// Services File
// =============================================================================

/// One published service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// Name used in service URLs
    pub name: String,

    /// `MapServer` or `ImageServer`
    #[serde(rename = "type")]
    pub kind: ServiceKind,

    /// Cache root directory
    pub tile_root_path: PathBuf,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub copyright_text: String,
}

/// Contents of the services file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicesFile {
    #[serde(default)]
    pub services: Vec<ServiceEntry>,
}

impl ServicesFile {
    /// Read and validate a services file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file = Self::from_json(&text).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        Ok(file)
    }

    /// Parse and validate services file contents.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let file: ServicesFile = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: String::new(),
            message: e.to_string(),
        })?;
        file.validate().map_err(ConfigError::Services)?;
        Ok(file)
    }

    /// Reject an empty list and empty, duplicate or unroutable names.
    pub fn validate(&self) -> Result<(), String> {
        if self.services.is_empty() {
            return Err("no services configured".to_string());
        }

        let mut seen = HashSet::new();
        for entry in &self.services {
            if entry.name.trim().is_empty() {
                return Err("service name must not be empty".to_string());
            }
            if entry.name.contains('/') {
                return Err(format!("service name '{}' must not contain '/'", entry.name));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(format!("duplicate service name '{}'", entry.name));
            }
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
