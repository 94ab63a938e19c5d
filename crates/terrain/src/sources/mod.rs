//! Height sources.
//!
//! Everything that contributes to the terrain implements [`HeightSource`]:
//! it reports a height and a blend weight for any world coordinate. Sources
//! compose by wrapping, e.g. a [`HeightmapSampler`] inside a
//! [`RadialInfluence`] to fade it out away from its center.

mod bump;
mod heightmap;
mod radial;

pub use bump::BumpSource;
pub use heightmap::{HeightmapSampler, Raster};
pub use radial::{InfluenceBand, RadialInfluence};

use std::sync::Arc;

use parking_lot::RwLock;

/// Height and blend weight reported by a source at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightSample {
    pub height: f64,
    /// Blend weight in `[0, 1]`.
    pub weight: f64,
}

impl HeightSample {
    pub const fn new(height: f64, weight: f64) -> Self {
        Self { height, weight }
    }

    /// A sample with weight 1.
    pub const fn full(height: f64) -> Self {
        Self { height, weight: 1.0 }
    }
}

/// Anything that produces a height at a world coordinate.
///
/// Sources must be shareable across threads so chunks can rebuild in parallel.
pub trait HeightSource: Send + Sync {
    fn evaluate(&self, x: f64, y: f64) -> HeightSample;
}

/// A source owned by the manager and live-tunable through the lock.
pub type Shared<T> = Arc<RwLock<T>>;

/// Wraps a value in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(RwLock::new(value))
}

impl<T: HeightSource + ?Sized> HeightSource for Arc<T> {
    fn evaluate(&self, x: f64, y: f64) -> HeightSample {
        (**self).evaluate(x, y)
    }
}

impl<T: HeightSource> HeightSource for RwLock<T> {
    fn evaluate(&self, x: f64, y: f64) -> HeightSample {
        self.read().evaluate(x, y)
    }
}

/// Fixed height and weight everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSource {
    pub height: f64,
    pub weight: f64,
}

impl ConstantSource {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl HeightSource for ConstantSource {
    fn evaluate(&self, _x: f64, _y: f64) -> HeightSample {
        HeightSample::new(self.height, self.weight)
    }
}

/// Weighted average of every source at `(x, y)`.
///
/// Returns 0 when no source has any weight at the point.
pub fn blend<'a, I, S>(sources: I, x: f64, y: f64) -> f64
where
    I: IntoIterator<Item = &'a S>,
    S: HeightSource + ?Sized + 'a,
{
    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for source in sources {
        let sample = source.evaluate(x, y);
        weighted += sample.height * sample.weight;
        weight_sum += sample.weight;
    }

    if weight_sum > 0.0 {
        weighted / weight_sum
    } else {
        0.0
    }
}
