//! Chunk lattice ownership and configuration propagation.

use std::collections::HashMap;
use std::sync::Arc;

use geo::Coord;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::chunk::{ChunkKey, TerrainChunk, TintPass};
use crate::config::{HeightmapParameters, NoiseParameters, TerrainConfig};
use crate::errors::TerrainError;
use crate::fractal::FractalNoiseField;
use crate::sources::{
    HeightSource, HeightmapSampler, InfluenceBand, RadialInfluence, Raster, Shared, shared,
};

/// Band used for sources that should weigh 1 everywhere a chunk can sample.
const ALWAYS_ON_INNER_RADIUS: f64 = 100_000.0;
const ALWAYS_ON_OUTER_RADIUS: f64 = 100_001.0;

/// A live change to the terrain configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigChange {
    /// Replace every noise parameter at once.
    Noise(NoiseParameters),
    /// Rescale the heightmap intensities.
    HeightmapScale(f64),
    /// Move the region over which the heightmap fades into the noise.
    HeightmapBand { inner_radius: f64, outer_radius: f64 },
}

struct LatticeEntry {
    chunk: TerrainChunk,
    /// 8-connected neighbor keys. Recorded for future seam handling, not
    /// read by any algorithm yet.
    neighbors: Vec<ChunkKey>,
}

/// Owns the chunk lattice and the sources shared by every chunk.
///
/// All configuration mutation goes through
/// [`apply_configuration_change`](Self::apply_configuration_change), which
/// validates first and only then touches the shared sources and rebuilds.
pub struct TerrainChunkManager {
    config: TerrainConfig,
    noise: Shared<FractalNoiseField>,
    heightmap: Option<Shared<HeightmapSampler>>,
    heightmap_band: Option<Shared<InfluenceBand>>,
    heightmap_source: Option<Arc<dyn HeightSource>>,
    chunks: HashMap<ChunkKey, LatticeEntry>,
}

impl TerrainChunkManager {
    /// Creates a manager with no chunks.
    pub fn new(config: TerrainConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        let noise = shared(FractalNoiseField::new(config.noise.clone())?);
        Ok(Self {
            config,
            noise,
            heightmap: None,
            heightmap_band: None,
            heightmap_source: None,
            chunks: HashMap::new(),
        })
    }

    /// Creates a manager and fills the square lattice described by
    /// `config.lattice_radius`.
    pub fn with_lattice(config: TerrainConfig) -> Result<Self, TerrainError> {
        let radius = config.lattice_radius;
        let mut manager = Self::new(config)?;
        for x in -radius..=radius {
            for z in -radius..=radius {
                manager.add_chunk(x, z)?;
            }
        }
        info!(
            chunks = manager.chunks.len(),
            resolution = manager.config.resolution,
            chunk_size = manager.config.chunk_size,
            "Created terrain lattice"
        );
        Ok(manager)
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn chunk_size(&self) -> f64 {
        self.config.chunk_size
    }

    pub fn resolution(&self) -> usize {
        self.config.resolution
    }

    pub fn noise_parameters(&self) -> NoiseParameters {
        self.noise.read().params().clone()
    }

    pub fn has_heightmap(&self) -> bool {
        self.heightmap.is_some()
    }

    pub fn chunk(&self, key: ChunkKey) -> Option<&TerrainChunk> {
        self.chunks.get(&key).map(|entry| &entry.chunk)
    }

    /// All chunks, in no particular order.
    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.values().map(|entry| &entry.chunk)
    }

    /// Sorted lattice keys.
    pub fn keys(&self) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self.chunks.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn neighbors(&self, key: ChunkKey) -> Option<&[ChunkKey]> {
        self.chunks.get(&key).map(|entry| entry.neighbors.as_slice())
    }

    /// Adds (or replaces) the chunk at lattice key `(x, z)` and builds it.
    ///
    /// The chunk gets the shared noise field behind an effectively unbounded
    /// radial band, plus the heightmap in front if one is installed.
    pub fn add_chunk(&mut self, x: i32, z: i32) -> Result<&TerrainChunk, TerrainError> {
        let key = ChunkKey::new(x, z);
        let size = self.config.chunk_size;
        let offset = Coord {
            x: f64::from(x) * size,
            y: f64::from(z) * size,
        };

        let band = InfluenceBand::new(offset, ALWAYS_ON_INNER_RADIUS, ALWAYS_ON_OUTER_RADIUS)?;
        let mut sources: Vec<Arc<dyn HeightSource>> =
            vec![Arc::new(RadialInfluence::new(self.noise.clone(), band))];
        if let Some(heightmap) = &self.heightmap_source {
            sources.insert(0, heightmap.clone());
        }

        let mut chunk = TerrainChunk::new(key, size, self.config.resolution, sources)?;
        if self.config.origin_tint && key == ChunkKey::new(0, 0) {
            chunk.set_tint_pass(Some(TintPass::default()));
        }
        chunk.rebuild();

        let entry = LatticeEntry {
            chunk,
            neighbors: key.neighbors(),
        };
        self.chunks.insert(key, entry);
        Ok(&self.chunks[&key].chunk)
    }

    /// Installs a decoded heightmap as the first source of every chunk and
    /// rebuilds the lattice.
    ///
    /// The heightmap fades out between `heightmap.inner_radius` and
    /// `heightmap.outer_radius` from the origin. Only one heightmap can be
    /// installed; later calls fail without touching the lattice.
    pub fn insert_heightmap_source(&mut self, raster: Raster) -> Result<(), TerrainError> {
        if self.heightmap.is_some() {
            warn!("Ignoring duplicate heightmap insertion");
            return Err(TerrainError::HeightmapAlreadyInstalled);
        }

        let params: &HeightmapParameters = &self.config.heightmap;
        let (width, height) = (raster.width(), raster.height());
        let sampler = shared(HeightmapSampler::new(
            raster,
            params.footprint,
            params.height_scale,
        )?);
        let band = InfluenceBand::new((0.0, 0.0), params.inner_radius, params.outer_radius)?;
        let band_handle = shared(band);
        let source: Arc<dyn HeightSource> = Arc::new(RadialInfluence::with_shared_band(
            sampler.clone(),
            band_handle.clone(),
        ));

        for entry in self.chunks.values_mut() {
            entry.chunk.prepend_source(source.clone());
        }
        self.heightmap = Some(sampler);
        self.heightmap_band = Some(band_handle);
        self.heightmap_source = Some(source);

        info!(
            width,
            height,
            inner_radius = band.inner_radius(),
            outer_radius = band.outer_radius(),
            "Installed heightmap source"
        );
        self.rebuild_all();
        Ok(())
    }

    /// Validates and applies a configuration change, then rebuilds every
    /// chunk. A rejected change leaves sources and height buffers as they were.
    pub fn apply_configuration_change(&mut self, change: ConfigChange) -> Result<(), TerrainError> {
        if let Err(e) = self.apply(change) {
            warn!("Rejected configuration change: {e}");
            return Err(e);
        }
        self.on_configuration_changed();
        Ok(())
    }

    fn apply(&mut self, change: ConfigChange) -> Result<(), TerrainError> {
        match change {
            ConfigChange::Noise(params) => {
                self.noise.write().set_params(params.clone())?;
                info!(
                    family = %params.family,
                    octaves = params.octaves,
                    seed = params.seed,
                    "Updated noise parameters"
                );
                self.config.noise = params;
            }
            ConfigChange::HeightmapScale(height_scale) => {
                let heightmap = HeightmapParameters {
                    height_scale,
                    ..self.config.heightmap.clone()
                };
                heightmap.validate()?;
                if let Some(sampler) = &self.heightmap {
                    sampler.write().set_height_scale(height_scale)?;
                }
                info!(height_scale, "Updated heightmap scale");
                self.config.heightmap = heightmap;
            }
            ConfigChange::HeightmapBand {
                inner_radius,
                outer_radius,
            } => {
                let heightmap = HeightmapParameters {
                    inner_radius,
                    outer_radius,
                    ..self.config.heightmap.clone()
                };
                heightmap.validate()?;
                if let Some(band) = &self.heightmap_band {
                    band.write().set_radii(inner_radius, outer_radius)?;
                }
                info!(inner_radius, outer_radius, "Updated heightmap band");
                self.config.heightmap = heightmap;
            }
        }
        Ok(())
    }

    /// Rebuilds every chunk. Called after any configuration change; there is
    /// no partial invalidation.
    pub fn on_configuration_changed(&mut self) {
        self.rebuild_all();
    }

    /// Rebuilds all chunks in parallel.
    pub fn rebuild_all(&mut self) {
        self.chunks
            .par_iter_mut()
            .for_each(|(_, entry)| entry.chunk.rebuild());
    }

    /// Blended height at any world point covered by the lattice.
    pub fn height_at(&self, x: f64, y: f64) -> Option<f64> {
        let key = ChunkKey::from_world(x, y, self.config.chunk_size)?;
        self.chunk(key).map(|chunk| chunk.evaluate(x, y))
    }
}
