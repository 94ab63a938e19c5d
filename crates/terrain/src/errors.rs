use thiserror::Error;

/// Rejected configuration. Raised before any evaluation happens, so a
/// failing change never reaches the chunk buffers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Octave count must be at least 1")]
    NoOctaves,

    #[error("Base scale must be positive, got {0}")]
    NonPositiveBaseScale(f64),

    #[error("Influence band outer radius {outer} must exceed inner radius {inner}")]
    InvalidBand { inner: f64, outer: f64 },

    #[error("Unknown noise family: {0}")]
    UnknownNoiseFamily(String),

    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Raster is {width}x{height} but holds {samples} samples")]
    RasterShape {
        width: usize,
        height: usize,
        samples: usize,
    },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum TerrainError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("A heightmap source is already installed")]
    HeightmapAlreadyInstalled,
}

/// Fails with [`ConfigError::InvalidParameter`] unless `value` is finite.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("must be finite, got {value}")))
    }
}
