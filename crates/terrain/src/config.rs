//! Configuration types for terrain generation.
//!
//! Every struct here deserializes with defaults for missing fields, so a
//! partial JSON document is a valid configuration.

use std::fmt;
use std::str::FromStr;

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, ensure_finite};

/// Continuous noise algorithm behind a [`FractalNoiseField`](crate::fractal::FractalNoiseField).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum NoiseFamily {
    #[default]
    Simplex,
    Perlin,
}

impl FromStr for NoiseFamily {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simplex" => Ok(Self::Simplex),
            "perlin" => Ok(Self::Perlin),
            _ => Err(ConfigError::UnknownNoiseFamily(s.to_string())),
        }
    }
}

impl TryFrom<String> for NoiseFamily {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl fmt::Display for NoiseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simplex => f.write_str("simplex"),
            Self::Perlin => f.write_str("perlin"),
        }
    }
}

/// Fractal noise tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Number of octaves summed.
    pub octaves: u32,
    /// Amplitude multiplier applied after each octave.
    pub persistence: f64,
    /// Frequency multiplier applied after each octave.
    pub lacunarity: f64,
    /// Power applied to the normalized sum.
    pub exponentiation: f64,
    /// Final height multiplier.
    pub height_scale: f64,
    /// World units per noise unit. Coordinates are divided by this.
    pub base_scale: f64,
    pub family: NoiseFamily,
    pub seed: u32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            octaves: 10,
            persistence: 0.5,
            lacunarity: 2.0,
            exponentiation: 3.9,
            height_scale: 64.0,
            base_scale: 256.0,
            family: NoiseFamily::Simplex,
            seed: 1,
        }
    }
}

impl NoiseParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.octaves < 1 {
            return Err(ConfigError::NoOctaves);
        }
        ensure_finite("base_scale", self.base_scale)?;
        if self.base_scale <= 0.0 {
            return Err(ConfigError::NonPositiveBaseScale(self.base_scale));
        }
        ensure_finite("persistence", self.persistence)?;
        if !(0.0..=1.0).contains(&self.persistence) {
            return Err(ConfigError::invalid(
                "persistence",
                format!("must lie in [0, 1], got {}", self.persistence),
            ));
        }
        ensure_finite("lacunarity", self.lacunarity)?;
        if self.lacunarity <= 0.0 {
            return Err(ConfigError::invalid(
                "lacunarity",
                format!("must be positive, got {}", self.lacunarity),
            ));
        }
        ensure_finite("exponentiation", self.exponentiation)?;
        if self.exponentiation <= 0.0 {
            return Err(ConfigError::invalid(
                "exponentiation",
                format!("must be positive, got {}", self.exponentiation),
            ));
        }
        ensure_non_negative("height_scale", self.height_scale)
    }
}

/// World-space rectangle covered by a heightmap raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Footprint {
    /// Minimum corner.
    pub offset: Coord<f64>,
    /// Extent along each axis.
    pub size: Coord<f64>,
    /// Mirror the horizontal axis so the image reads the right way round
    /// when the terrain is viewed from above.
    pub mirror_x: bool,
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            offset: Coord {
                x: -250.0,
                y: -250.0,
            },
            size: Coord { x: 500.0, y: 500.0 },
            mirror_x: true,
        }
    }
}

impl Footprint {
    pub fn new(offset: Coord<f64>, size: Coord<f64>) -> Self {
        Self {
            offset,
            size,
            mirror_x: false,
        }
    }

    /// Sets horizontal mirroring.
    pub fn with_mirror_x(mut self, mirror: bool) -> Self {
        self.mirror_x = mirror;
        self
    }

    pub fn rect(&self) -> Rect<f64> {
        Rect::new(self.offset, self.offset + self.size)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("footprint offset", self.offset.x),
            ("footprint offset", self.offset.y),
        ] {
            ensure_finite(name, value)?;
        }
        for value in [self.size.x, self.size.y] {
            ensure_finite("footprint size", value)?;
            if value <= 0.0 {
                return Err(ConfigError::invalid(
                    "footprint size",
                    format!("must be positive, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Heightmap placement and blending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapParameters {
    /// Height of a full-intensity pixel.
    pub height_scale: f64,
    pub footprint: Footprint,
    /// Distance from the origin inside which the heightmap fully wins.
    pub inner_radius: f64,
    /// Distance from the origin beyond which the heightmap has no weight.
    pub outer_radius: f64,
}

impl Default for HeightmapParameters {
    fn default() -> Self {
        Self {
            height_scale: 16.0,
            footprint: Footprint::default(),
            inner_radius: 250.0,
            outer_radius: 300.0,
        }
    }
}

impl HeightmapParameters {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("heightmap height_scale", self.height_scale)?;
        self.footprint.validate()?;
        validate_band(self.inner_radius, self.outer_radius)
    }
}

/// Top-level terrain configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World-space edge length of one chunk.
    pub chunk_size: f64,
    /// Vertices per chunk side.
    pub resolution: usize,
    /// Chunks are created for keys in `-lattice_radius..=lattice_radius` on both axes.
    pub lattice_radius: i32,
    pub noise: NoiseParameters,
    pub heightmap: HeightmapParameters,
    /// Color the origin chunk by the primary source's height.
    pub origin_tint: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500.0,
            resolution: 129,
            lattice_radius: 1,
            noise: NoiseParameters::default(),
            heightmap: HeightmapParameters::default(),
            origin_tint: false,
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("chunk_size", self.chunk_size)?;
        if self.chunk_size <= 0.0 {
            return Err(ConfigError::invalid(
                "chunk_size",
                format!("must be positive, got {}", self.chunk_size),
            ));
        }
        if self.resolution < 2 {
            return Err(ConfigError::invalid(
                "resolution",
                format!("needs at least 2 vertices per side, got {}", self.resolution),
            ));
        }
        if self.lattice_radius < 0 {
            return Err(ConfigError::invalid(
                "lattice_radius",
                format!("must not be negative, got {}", self.lattice_radius),
            ));
        }
        self.noise.validate()?;
        self.heightmap.validate()
    }
}

/// Checks `inner < outer` with both radii finite and non-negative.
pub fn validate_band(inner: f64, outer: f64) -> Result<(), ConfigError> {
    ensure_finite("inner_radius", inner)?;
    ensure_finite("outer_radius", outer)?;
    if inner < 0.0 {
        return Err(ConfigError::invalid(
            "inner_radius",
            format!("must not be negative, got {inner}"),
        ));
    }
    if outer <= inner {
        return Err(ConfigError::InvalidBand { inner, outer });
    }
    Ok(())
}

fn ensure_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::invalid(
            name,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(())
}
