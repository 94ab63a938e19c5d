//! Fractal noise height field.

use std::fmt;

use noise::{NoiseFn, Perlin, Simplex};

use crate::config::{NoiseFamily, NoiseParameters};
use crate::errors::ConfigError;
use crate::sources::{HeightSample, HeightSource};

/// A continuous 2D noise function with output in `[-1, 1]`.
pub trait NoisePrimitive: Send + Sync {
    fn sample_2d(&self, x: f64, y: f64) -> f64;
}

// Library outputs can overshoot the nominal range by a hair; clamping keeps
// the remapped octave values inside [0, 1].
impl NoisePrimitive for Simplex {
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.get([x, y]).clamp(-1.0, 1.0)
    }
}

impl NoisePrimitive for Perlin {
    fn sample_2d(&self, x: f64, y: f64) -> f64 {
        self.get([x, y]).clamp(-1.0, 1.0)
    }
}

fn primitive_for(family: NoiseFamily, seed: u32) -> Box<dyn NoisePrimitive> {
    match family {
        NoiseFamily::Simplex => Box::new(Simplex::new(seed)),
        NoiseFamily::Perlin => Box::new(Perlin::new(seed)),
    }
}

/// Sums octaves of a noise primitive into a height value.
///
/// Each octave samples the primitive at a higher frequency and lower
/// amplitude. The weighted sum is normalized by the total amplitude, raised
/// to `exponentiation` (values above 1 flatten valleys and sharpen peaks) and
/// scaled by `height_scale`.
pub struct FractalNoiseField {
    params: NoiseParameters,
    primitive: Box<dyn NoisePrimitive>,
}

impl fmt::Debug for FractalNoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FractalNoiseField")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl FractalNoiseField {
    /// Creates a field using the primitive selected by `params.family`.
    pub fn new(params: NoiseParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        let primitive = primitive_for(params.family, params.seed);
        Ok(Self { params, primitive })
    }

    /// Creates a field around a caller-supplied primitive. `params.family`
    /// and `params.seed` are kept for reporting only.
    pub fn with_primitive(
        params: NoiseParameters,
        primitive: Box<dyn NoisePrimitive>,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        Ok(Self { params, primitive })
    }

    pub fn params(&self) -> &NoiseParameters {
        &self.params
    }

    /// Replaces the parameters, rebuilding the primitive only when the family
    /// or seed changed. Invalid parameters leave the field untouched.
    pub fn set_params(&mut self, params: NoiseParameters) -> Result<(), ConfigError> {
        params.validate()?;
        if params.family != self.params.family || params.seed != self.params.seed {
            self.primitive = primitive_for(params.family, params.seed);
        }
        self.params = params;
        Ok(())
    }

    /// Gets the noise height at a world coordinate.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let p = &self.params;
        let xs = x / p.base_scale;
        let ys = y / p.base_scale;

        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut normalization = 0.0;
        let mut total = 0.0;

        for _ in 0..p.octaves {
            let value = self.primitive.sample_2d(xs * frequency, ys * frequency) * 0.5 + 0.5;
            total += value * amplitude;
            normalization += amplitude;
            amplitude *= p.persistence;
            frequency *= p.lacunarity;
        }

        // normalization >= 1: the first octave always contributes amplitude 1
        (total / normalization).powf(p.exponentiation) * p.height_scale
    }
}

impl HeightSource for FractalNoiseField {
    fn evaluate(&self, x: f64, y: f64) -> HeightSample {
        HeightSample::full(FractalNoiseField::evaluate(self, x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat(f64);

    impl NoisePrimitive for Flat {
        fn sample_2d(&self, _x: f64, _y: f64) -> f64 {
            self.0
        }
    }

    fn params(octaves: u32, persistence: f64) -> NoiseParameters {
        NoiseParameters {
            octaves,
            persistence,
            base_scale: 100.0,
            height_scale: 64.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_noise_repeatable() {
        for family in [NoiseFamily::Simplex, NoiseFamily::Perlin] {
            let field = FractalNoiseField::new(NoiseParameters {
                family,
                ..Default::default()
            })
            .unwrap();
            for (x, y) in [(0.0, 0.0), (10.5, -3.25), (1234.0, 987.0)] {
                assert_eq!(
                    field.evaluate(x, y).to_bits(),
                    field.evaluate(x, y).to_bits()
                );
            }
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = FractalNoiseField::new(NoiseParameters::default()).unwrap();
        let b = FractalNoiseField::new(NoiseParameters::default()).unwrap();
        assert_eq!(a.evaluate(77.0, 13.0).to_bits(), b.evaluate(77.0, 13.0).to_bits());
    }

    #[test]
    fn test_zero_persistence_matches_single_octave() {
        for family in [NoiseFamily::Simplex, NoiseFamily::Perlin] {
            let many = FractalNoiseField::new(NoiseParameters {
                family,
                ..params(5, 0.0)
            })
            .unwrap();
            let one = FractalNoiseField::new(NoiseParameters {
                family,
                ..params(1, 0.0)
            })
            .unwrap();
            assert_eq!(many.evaluate(10.0, 10.0), one.evaluate(10.0, 10.0));
        }
    }

    #[test]
    fn test_output_within_height_scale() {
        let field = FractalNoiseField::new(NoiseParameters::default()).unwrap();
        for i in 0..200 {
            let h = field.evaluate(i as f64 * 17.3, i as f64 * -5.1);
            assert!((0.0..=64.0).contains(&h), "height {h} out of range");
        }
    }

    #[test]
    fn test_flat_primitive_normalizes() {
        // primitive 0 remaps to 0.5 in every octave
        let field = FractalNoiseField::with_primitive(
            NoiseParameters {
                exponentiation: 1.0,
                ..params(4, 0.5)
            },
            Box::new(Flat(0.0)),
        )
        .unwrap();
        assert!((field.evaluate(3.0, 4.0) - 32.0).abs() < 1e-12);

        let field = FractalNoiseField::with_primitive(
            NoiseParameters {
                exponentiation: 2.0,
                ..params(4, 0.5)
            },
            Box::new(Flat(1.0)),
        )
        .unwrap();
        assert!((field.evaluate(3.0, 4.0) - 64.0).abs() < 1e-12);
    }

    #[test]
    fn test_set_params_rejects_invalid() {
        let mut field = FractalNoiseField::new(NoiseParameters::default()).unwrap();
        let before = field.evaluate(5.0, 5.0);
        let bad = NoiseParameters {
            base_scale: -1.0,
            ..Default::default()
        };
        assert!(field.set_params(bad).is_err());
        assert_eq!(field.params(), &NoiseParameters::default());
        assert_eq!(field.evaluate(5.0, 5.0), before);
    }

    #[test]
    fn test_set_params_switches_family() {
        let mut field = FractalNoiseField::new(NoiseParameters::default()).unwrap();
        let perlin = NoiseParameters {
            family: NoiseFamily::Perlin,
            ..Default::default()
        };
        field.set_params(perlin.clone()).unwrap();
        let fresh = FractalNoiseField::new(perlin).unwrap();
        assert_eq!(field.evaluate(40.0, 90.0), fresh.evaluate(40.0, 90.0));
    }
}
