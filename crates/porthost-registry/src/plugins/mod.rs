//! Built-in plugin implementations.
//!
//! Each module exposes its `URI`, a static `MANIFEST` and an `instantiate`
//! factory matching the world's factory signature.

pub mod amp;
pub mod meter;
pub mod noise;
pub mod pan;
pub mod sine;

/// Convert decibels to linear gain.
///
/// ```rust
/// use porthost_registry::plugins::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    (db * FACTOR).exp()
}

/// Clamp a control value into its declared range, treating NaN as `fallback`.
#[inline]
pub(crate) fn clamp_control(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
