//! Radially bounded influence.

use geo::{Distance as _, Euclidean, Point};

use crate::config::validate_band;
use crate::errors::ConfigError;
use crate::math::{sat, smoothstep};

use super::{HeightSample, HeightSource, Shared, shared};

/// Annulus over which an influence fades from full to none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceBand {
    center: Point<f64>,
    inner_radius: f64,
    outer_radius: f64,
}

impl InfluenceBand {
    /// Fails unless `inner_radius < outer_radius`.
    pub fn new(
        center: impl Into<Point<f64>>,
        inner_radius: f64,
        outer_radius: f64,
    ) -> Result<Self, ConfigError> {
        validate_band(inner_radius, outer_radius)?;
        Ok(Self {
            center: center.into(),
            inner_radius,
            outer_radius,
        })
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    /// Moves the fade region. Invalid radii leave the band unchanged.
    pub fn set_radii(&mut self, inner_radius: f64, outer_radius: f64) -> Result<(), ConfigError> {
        validate_band(inner_radius, outer_radius)?;
        self.inner_radius = inner_radius;
        self.outer_radius = outer_radius;
        Ok(())
    }

    /// Smoothstep weight at `(x, y)`: 1 within the inner radius, 0 at or
    /// beyond the outer radius.
    pub fn weight_at(&self, x: f64, y: f64) -> f64 {
        let distance = Euclidean.distance(self.center, Point::new(x, y));
        let t = 1.0 - sat((distance - self.inner_radius) / (self.outer_radius - self.inner_radius));
        smoothstep(t)
    }
}

/// Gives an inner source a weight that falls off with distance from a center.
///
/// Only the inner source's height is used; its own weight is replaced by the
/// band's. The band sits behind a [`Shared`] handle so its radii can be tuned
/// while chunks hold the source.
#[derive(Debug, Clone)]
pub struct RadialInfluence<S> {
    source: S,
    band: Shared<InfluenceBand>,
}

impl<S: HeightSource> RadialInfluence<S> {
    pub fn new(source: S, band: InfluenceBand) -> Self {
        Self::with_shared_band(source, shared(band))
    }

    pub fn with_shared_band(source: S, band: Shared<InfluenceBand>) -> Self {
        Self { source, band }
    }
}

impl<S: HeightSource> HeightSource for RadialInfluence<S> {
    fn evaluate(&self, x: f64, y: f64) -> HeightSample {
        let weight = self.band.read().weight_at(x, y);
        HeightSample::new(self.source.evaluate(x, y).height, weight)
    }
}
