use std::f32::consts::TAU;

use rand::Rng;

use crate::config::{AiParams, JitterBands};

/// Uniform sample from `[base * (1 - band), base * (1 + band)]`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, base: f32, band: f32) -> f32 {
    let band = band.abs();
    let a = base * (1.0 - band);
    let b = base * (1.0 + band);
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    uniform_or(rng, low, high, base)
}

pub fn jitter_params<R: Rng + ?Sized>(rng: &mut R, base: &AiParams, bands: &JitterBands) -> AiParams {
    AiParams {
        detection_range: jitter(rng, base.detection_range, bands.detection_range),
        attack_range: jitter(rng, base.attack_range, bands.attack_range),
        fire_rate: jitter(rng, base.fire_rate, bands.fire_rate),
        patrol_radius: jitter(rng, base.patrol_radius, bands.patrol_radius),
        move_speed: jitter(rng, base.move_speed, bands.move_speed),
    }
}

/// Point uniformly distributed over the unit disc, as `(x, z)`.
pub fn unit_disc<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    let angle = rng.gen_range(0.0..TAU);
    let radius = rng.gen_range(0.0f32..=1.0).sqrt();
    (radius * angle.sin(), radius * angle.cos())
}

pub fn heading<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(0.0..TAU)
}

/// Uniform sample from `[center - half_width, center + half_width]`.
pub fn symmetric<R: Rng + ?Sized>(rng: &mut R, center: f32, half_width: f32) -> f32 {
    let half_width = half_width.abs();
    uniform_or(rng, center - half_width, center + half_width, center)
}

/// Uniform sample from `[low, high]`, or `fallback` when the range is empty,
/// NaN, or wider than half of `f32::MAX`.
fn uniform_or<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32, fallback: f32) -> f32 {
    if !(low < high && high - low <= f32::MAX / 2.0) {
        return fallback;
    }
    rng.gen_range(low..=high)
}
