use geo::{Distance as _, Euclidean, Point};

use crate::errors::{ConfigError, ensure_finite};
use crate::math::{sat, smootherstep};

use super::{HeightSample, HeightSource};

/// A smooth hill centered on a point, flat beyond `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BumpSource {
    center: Point<f64>,
    radius: f64,
    peak: f64,
}

impl Default for BumpSource {
    fn default() -> Self {
        Self {
            center: Point::new(0.0, 0.0),
            radius: 250.0,
            peak: 128.0,
        }
    }
}

impl BumpSource {
    pub fn new(center: impl Into<Point<f64>>, radius: f64, peak: f64) -> Result<Self, ConfigError> {
        ensure_finite("bump radius", radius)?;
        ensure_finite("bump peak", peak)?;
        if radius <= 0.0 {
            return Err(ConfigError::invalid(
                "bump radius",
                format!("must be positive, got {radius}"),
            ));
        }
        Ok(Self {
            center: center.into(),
            radius,
            peak,
        })
    }
}

impl HeightSource for BumpSource {
    fn evaluate(&self, x: f64, y: f64) -> HeightSample {
        let distance = Euclidean.distance(self.center, Point::new(x, y));
        let h = smootherstep(1.0 - sat(distance / self.radius));
        HeightSample::full(h * self.peak)
    }
}
