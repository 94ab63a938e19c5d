//! Raster heightmap source.

use crate::config::Footprint;
use crate::errors::{ConfigError, ensure_finite};
use crate::math::{lerp, sat};

use super::{HeightSample, HeightSource};

/// Row-major grid of intensities in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    samples: Vec<f64>,
}

impl Raster {
    /// Fails if either dimension is zero or `samples` does not hold exactly
    /// `width * height` values.
    pub fn new(width: usize, height: usize, samples: Vec<f64>) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || samples.len() != width * height {
            return Err(ConfigError::RasterShape {
                width,
                height,
                samples: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Builds a raster from 8-bit intensities, mapping 255 to 1.0.
    pub fn from_luma8(width: usize, height: usize, pixels: &[u8]) -> Result<Self, ConfigError> {
        let samples = pixels.iter().map(|&p| f64::from(p) / 255.0).collect();
        Self::new(width, height, samples)
    }

    /// Builds a raster from rows of equal length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, ConfigError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != width) {
            return Err(ConfigError::RasterShape {
                width,
                height,
                samples: rows.iter().map(Vec::len).sum(),
            });
        }
        Self::new(width, height, rows.concat())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Sample at integer pixel coordinates; callers keep them in bounds.
    #[inline]
    fn pixel(&self, x: usize, y: usize) -> f64 {
        self.samples[y * self.width + x]
    }
}

/// Samples a [`Raster`] spread over a world-space [`Footprint`].
///
/// Queries outside the footprint clamp to the nearest edge pixel, so the
/// sampler is defined over the whole plane.
#[derive(Debug, Clone)]
pub struct HeightmapSampler {
    raster: Raster,
    footprint: Footprint,
    height_scale: f64,
}

impl HeightmapSampler {
    pub fn new(raster: Raster, footprint: Footprint, height_scale: f64) -> Result<Self, ConfigError> {
        footprint.validate()?;
        validate_height_scale(height_scale)?;
        Ok(Self {
            raster,
            footprint,
            height_scale,
        })
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    pub fn set_height_scale(&mut self, height_scale: f64) -> Result<(), ConfigError> {
        validate_height_scale(height_scale)?;
        self.height_scale = height_scale;
        Ok(())
    }

    /// Bilinearly filtered height at a world coordinate.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let rect = self.footprint.rect();
        let mut u = sat((x - rect.min().x) / rect.width());
        let v = sat((y - rect.min().y) / rect.height());
        if self.footprint.mirror_x {
            u = 1.0 - u;
        }

        let w = self.raster.width - 1;
        let h = self.raster.height - 1;
        let fx = u * w as f64;
        let fy = v * h as f64;

        // u, v are in [0, 1], so the floors are already within bounds
        let x1 = (fx.floor() as usize).min(w);
        let y1 = (fy.floor() as usize).min(h);
        let x2 = (x1 + 1).min(w);
        let y2 = (y1 + 1).min(h);

        let xp = fx - x1 as f64;
        let yp = fy - y1 as f64;

        let p11 = self.raster.pixel(x1, y1);
        let p21 = self.raster.pixel(x2, y1);
        let p12 = self.raster.pixel(x1, y2);
        let p22 = self.raster.pixel(x2, y2);

        let top = lerp(xp, p11, p21);
        let bottom = lerp(xp, p12, p22);

        lerp(yp, top, bottom) * self.height_scale
    }
}

impl HeightSource for HeightmapSampler {
    fn evaluate(&self, x: f64, y: f64) -> HeightSample {
        HeightSample::full(self.sample(x, y))
    }
}

fn validate_height_scale(height_scale: f64) -> Result<(), ConfigError> {
    ensure_finite("heightmap height_scale", height_scale)?;
    if height_scale < 0.0 {
        return Err(ConfigError::invalid(
            "heightmap height_scale",
            format!("must not be negative, got {height_scale}"),
        ));
    }
    Ok(())
}
