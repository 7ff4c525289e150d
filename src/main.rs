//! Bundle Tiles - serves tiles straight from compact cache bundles.
//!
//! This binary starts the HTTP server or checks a single cache.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bundle_tiles::{
    cache::CacheDescriptor,
    config::{CheckConfig, Cli, Command, ServeConfig, ServicesFile},
    load_cache,
    server::{create_router, RouterConfig},
    service::ServiceRegistry,
    TileError,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let services = match ServicesFile::load(&config.services) {
        Ok(file) => file.services,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Bundle Tiles v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Services file: {}", config.services.display());
    info!("  Cache max-age: {}s", config.cache_max_age);
    match config.cors_origins {
        Some(ref origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    // Cache loading reads files synchronously
    let registry = match tokio::task::spawn_blocking(move || {
        ServiceRegistry::from_entries(&services)
    })
    .await
    {
        Ok(registry) => registry,
        Err(e) => {
            error!("Failed to load services: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for service in registry.iter() {
        if !service.cache.is_ready() {
            warn!(
                "  {} will answer 503 until its cache is fixed and the server restarted",
                service.url()
            );
        }
    }

    let router = create_router(Arc::new(registry), build_router_config(&config));
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!("    curl http://{}/rest/services", addr);
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "bundle_tiles=debug,tower_http=debug"
    } else {
        "bundle_tiles=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the serve options.
fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new()
        .with_cache_max_age(config.cache_max_age)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

// =============================================================================
// Check Command
// =============================================================================

fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    println!("Bundle Tiles Cache Check");
    println!("════════════════════════");
    println!();

    let cache = match load_cache(&config.root) {
        Ok(cache) => {
            println!("✓ Cache: {}", config.root.display());
            cache
        }
        Err(e) => {
            println!("✗ Cache: {}", config.root.display());
            println!();
            println!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    print_descriptor(cache.descriptor());

    if let Some(tile) = config.tile {
        println!();
        print!("Reading tile {}/{}/{}... ", tile.level, tile.row, tile.column);

        match cache.get_tile(tile.level, tile.row, tile.column) {
            Ok(data) => {
                println!("✓ found");
                println!("  Size: {} bytes", data.len());
                println!(
                    "  Content-Type: {}",
                    cache.descriptor().tile_format().content_type(&data)
                );
            }
            Err(TileError::TileNotFound { .. }) => {
                println!("✗ not found");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                println!("✗ failed");
                println!();
                println!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    println!();
    println!("════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}

fn print_descriptor(descriptor: &CacheDescriptor) {
    println!(
        "✓ Levels on disk: {}-{} (table has {})",
        descriptor.min_level,
        descriptor.max_level,
        descriptor.levels.len()
    );
    println!("✓ Scales: {} - {}", descriptor.min_scale, descriptor.max_scale);
    println!(
        "✓ Tiles: {}x{} px, {} dpi, format {}",
        descriptor.tile_cols, descriptor.tile_rows, descriptor.dpi, descriptor.image.format
    );
    println!(
        "✓ Extent: [{}, {}] - [{}, {}]",
        descriptor.extent.xmin,
        descriptor.extent.ymin,
        descriptor.extent.xmax,
        descriptor.extent.ymax
    );
    if let Some(wkid) = descriptor.spatial_reference.wkid {
        println!("✓ Spatial reference: {}", wkid);
    }
}
