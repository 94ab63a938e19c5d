//! Terrain chunks.

use std::fmt;
use std::sync::Arc;

use geo::Coord;
use tracing::debug;

use crate::errors::{ConfigError, ensure_finite};
use crate::math::{lerp, sat};
use crate::sources::{HeightSource, blend};

/// Integer lattice coordinate of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Key of the chunk whose square contains the world point. Chunks are
    /// centered on their offset, so this rounds rather than floors.
    ///
    /// Returns `None` when the point has no representable key.
    pub fn from_world(x: f64, y: f64, chunk_size: f64) -> Option<Self> {
        let keys = f64::from(i32::MIN)..=f64::from(i32::MAX);
        let kx = (x / chunk_size).round();
        let kz = (y / chunk_size).round();
        (keys.contains(&kx) && keys.contains(&kz)).then(|| Self::new(kx as i32, kz as i32))
    }

    /// The surrounding keys, up to eight. Keys past the `i32` range are
    /// skipped.
    pub fn neighbors(&self) -> Vec<ChunkKey> {
        let mut keys = Vec::with_capacity(8);
        for dx in -1..=1 {
            for dz in -1..=1 {
                if dx == 0 && dz == 0 {
                    continue;
                }
                if let (Some(x), Some(z)) = (self.x.checked_add(dx), self.z.checked_add(dz)) {
                    keys.push(ChunkKey::new(x, z));
                }
            }
        }
        keys
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.x, self.z)
    }
}

impl From<(i32, i32)> for ChunkKey {
    fn from((x, z): (i32, i32)) -> Self {
        Self::new(x, z)
    }
}

/// Cosmetic vertex coloring driven by a single source's raw height.
///
/// Kept outside the blend so the height buffer never depends on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TintPass {
    max_height: f64,
}

impl Default for TintPass {
    fn default() -> Self {
        Self { max_height: 16.0 }
    }
}

impl TintPass {
    /// Neutral intensity given to untinted vertices.
    pub const NEUTRAL: f64 = 0.0;

    const WHITE: [f64; 3] = [1.0, 1.0, 1.0];
    // 0x46b00c
    const GREEN: [f64; 3] = [70.0 / 255.0, 176.0 / 255.0, 12.0 / 255.0];

    /// Intensity in `[0, 1]` at a world point.
    pub fn intensity(&self, primary: &dyn HeightSource, x: f64, y: f64) -> f64 {
        sat(primary.evaluate(x, y).height / self.max_height)
    }

    /// RGB color for an intensity: white at 0, grass green at 1.
    pub fn color(intensity: f64) -> [f32; 3] {
        let t = sat(intensity);
        let mut rgb = [0.0; 3];
        for (channel, out) in rgb.iter_mut().enumerate() {
            *out = lerp(t, Self::WHITE[channel], Self::GREEN[channel]) as f32;
        }
        rgb
    }
}

/// A square grid of vertices centered on a world offset.
///
/// `rebuild` fills a dense `resolution * resolution` height buffer, row by
/// row along +y, for an external mesh builder to consume.
pub struct TerrainChunk {
    key: ChunkKey,
    offset: Coord<f64>,
    world_size: f64,
    resolution: usize,
    sources: Vec<Arc<dyn HeightSource>>,
    heights: Vec<f64>,
    tint: Vec<f64>,
    tint_pass: Option<TintPass>,
}

impl fmt::Debug for TerrainChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerrainChunk")
            .field("key", &self.key)
            .field("offset", &self.offset)
            .field("world_size", &self.world_size)
            .field("resolution", &self.resolution)
            .field("sources", &self.sources.len())
            .finish_non_exhaustive()
    }
}

impl TerrainChunk {
    /// Creates a chunk at `key * world_size`. Heights stay zero until the
    /// first [`rebuild`](Self::rebuild).
    pub fn new(
        key: ChunkKey,
        world_size: f64,
        resolution: usize,
        sources: Vec<Arc<dyn HeightSource>>,
    ) -> Result<Self, ConfigError> {
        ensure_finite("chunk_size", world_size)?;
        if world_size <= 0.0 {
            return Err(ConfigError::invalid(
                "chunk_size",
                format!("must be positive, got {world_size}"),
            ));
        }
        if resolution < 2 {
            return Err(ConfigError::invalid(
                "resolution",
                format!("needs at least 2 vertices per side, got {resolution}"),
            ));
        }

        let vertices = resolution * resolution;
        Ok(Self {
            key,
            offset: Coord {
                x: f64::from(key.x) * world_size,
                y: f64::from(key.z) * world_size,
            },
            world_size,
            resolution,
            sources,
            heights: vec![0.0; vertices],
            tint: vec![TintPass::NEUTRAL; vertices],
            tint_pass: None,
        })
    }

    pub fn key(&self) -> ChunkKey {
        self.key
    }

    pub fn offset(&self) -> Coord<f64> {
        self.offset
    }

    pub fn world_size(&self) -> f64 {
        self.world_size
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn sources(&self) -> &[Arc<dyn HeightSource>] {
        &self.sources
    }

    /// Heights indexed by `j * resolution + i`.
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Tint intensities, same layout as [`heights`](Self::heights).
    pub fn tint(&self) -> &[f64] {
        &self.tint
    }

    pub fn height(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.resolution || j >= self.resolution {
            return None;
        }
        self.heights.get(j * self.resolution + i).copied()
    }

    /// Enables or disables the cosmetic tint pass. Takes effect on the next
    /// rebuild.
    pub fn set_tint_pass(&mut self, tint_pass: Option<TintPass>) {
        self.tint_pass = tint_pass;
    }

    /// Adds a source in front of the existing ones.
    pub fn prepend_source(&mut self, source: Arc<dyn HeightSource>) {
        self.sources.insert(0, source);
    }

    /// World position of vertex `(i, j)`.
    pub fn vertex_position(&self, i: usize, j: usize) -> Coord<f64> {
        let step = self.world_size / (self.resolution - 1) as f64;
        let half = self.world_size * 0.5;
        Coord {
            x: self.offset.x - half + i as f64 * step,
            y: self.offset.y - half + j as f64 * step,
        }
    }

    /// Blended height of this chunk's sources at an arbitrary world point.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        blend(&self.sources, x, y)
    }

    /// Recomputes every vertex. The buffers are built aside and swapped in
    /// whole.
    pub fn rebuild(&mut self) {
        let n = self.resolution;
        let mut heights = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                let p = self.vertex_position(i, j);
                heights.push(self.evaluate(p.x, p.y));
            }
        }

        let tint = self.compute_tint();

        let (min, max) = heights
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            });
        debug!(chunk = %self.key, sources = self.sources.len(), min, max, "Rebuilt chunk");

        self.heights = heights;
        self.tint = tint;
    }

    // Only a chunk with a primary source layered over something else gets
    // tinted; the rest stay neutral.
    fn compute_tint(&self) -> Vec<f64> {
        let n = self.resolution;
        match (&self.tint_pass, self.sources.as_slice()) {
            (Some(pass), [primary, _, ..]) => {
                let mut tint = Vec::with_capacity(n * n);
                for j in 0..n {
                    for i in 0..n {
                        let p = self.vertex_position(i, j);
                        tint.push(pass.intensity(primary.as_ref(), p.x, p.y));
                    }
                }
                tint
            }
            _ => vec![TintPass::NEUTRAL; n * n],
        }
    }
}
