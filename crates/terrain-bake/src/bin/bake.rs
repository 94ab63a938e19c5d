//! Bakes the default terrain lattice to a grayscale PNG.
//!
//! Run with:
//! ```text
//! HEIGHTMAP_PATH=./resources/heightmap.jpg cargo run -p terrain-bake --bin bake
//! ```
//!
//! Environment:
//! - `TERRAIN_CONFIG`: optional JSON config, defaults apply to missing fields
//! - `HEIGHTMAP_PATH`: optional heightmap image blended in around the origin
//! - `OUTPUT_PATH`: where to write the PNG (default `heightfield.png`)
//! - `OUTPUT_SIZE`: image edge length in pixels (default 512, 0 is rejected)

use std::env;
use std::path::PathBuf;

use terrain::config::TerrainConfig;
use terrain::manager::TerrainChunkManager;
use terrain_bake::{config_file, export, image_source};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match env::var("TERRAIN_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading terrain config from {}", path);
            config_file::load_config(path)?
        }
        Err(_) => TerrainConfig::default(),
    };

    // Start decoding before building the lattice; the image arrives once.
    let pending = env::var("HEIGHTMAP_PATH")
        .ok()
        .map(|path| tokio::spawn(image_source::load_raster_async(PathBuf::from(path))));

    let mut manager = TerrainChunkManager::with_lattice(config)?;

    if let Some(pending) = pending {
        let raster = pending.await??;
        manager.insert_heightmap_source(raster)?;
    }

    let output = env::var("OUTPUT_PATH").unwrap_or_else(|_| "heightfield.png".to_string());
    let size = export::parse_output_size(env::var("OUTPUT_SIZE").ok().as_deref())?;

    let range = export::write_png(&manager, size, &output)?;

    // Summary output
    tracing::info!("Bake completed!");
    tracing::info!("  Chunks: {}", manager.keys().len());
    tracing::info!("  Heightmap: {}", manager.has_heightmap());
    if let Some(range) = range {
        tracing::info!("  Height range: {:.2} .. {:.2}", range.min, range.max);
    }
    for key in manager.keys() {
        if let Some(chunk) = manager.chunk(key) {
            let mean = chunk.heights().iter().sum::<f64>() / chunk.heights().len() as f64;
            tracing::debug!(chunk = %key, mean, "Chunk summary");
        }
    }

    Ok(())
}
