//! Procedural terrain height fields.
//!
//! Heights come from composable [`HeightSource`](sources::HeightSource)s:
//! fractal noise, raster heightmaps and radial influence zones that fade a
//! source in and out. A [`TerrainChunkManager`](manager::TerrainChunkManager)
//! evaluates the weighted blend of all sources over a lattice of chunks and
//! exposes one dense height buffer per chunk for a mesh builder.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use terrain::prelude::*;
//!
//! let mut manager = TerrainChunkManager::with_lattice(TerrainConfig::default())?;
//!
//! // once the heightmap image has been decoded
//! manager.insert_heightmap_source(Raster::from_luma8(width, height, &pixels)?)?;
//!
//! // live tuning
//! let noise = NoiseParameters { octaves: 6, ..manager.noise_parameters() };
//! manager.apply_configuration_change(ConfigChange::Noise(noise))?;
//!
//! for chunk in manager.chunks() {
//!     build_mesh(chunk.offset(), chunk.resolution(), chunk.heights());
//! }
//! ```

pub mod chunk;
pub mod config;
pub mod errors;
pub mod fractal;
pub mod manager;
pub mod math;
pub mod sources;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::chunk::{ChunkKey, TerrainChunk, TintPass};
    pub use crate::config::{
        Footprint, HeightmapParameters, NoiseFamily, NoiseParameters, TerrainConfig,
    };
    pub use crate::errors::{ConfigError, TerrainError};
    pub use crate::fractal::{FractalNoiseField, NoisePrimitive};
    pub use crate::manager::{ConfigChange, TerrainChunkManager};
    pub use crate::sources::{
        BumpSource, ConstantSource, HeightSample, HeightSource, HeightmapSampler, InfluenceBand,
        RadialInfluence, Raster, Shared, blend, shared,
    };
}
