//! Scalar helpers shared by the height sources.

/// Clamps to `[0, 1]`.
#[inline]
pub fn sat(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Linear interpolation from `a` (at `t = 0`) to `b` (at `t = 1`).
///
/// Written as `t * (b - a) + a` so that `t == 0` returns `a` exactly.
#[inline]
pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    t * (b - a) + a
}

/// Cubic Hermite easing, `t²(3 - 2t)`.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Quintic easing, `t³(t(6t - 15) + 10)`.
#[inline]
pub fn smootherstep(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}
