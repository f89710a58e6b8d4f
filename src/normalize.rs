//! Maps raw noise into the usable `[0, 1)` height range.

use rayon::prelude::*;

use crate::height_field::HeightField;
use crate::noise::WORK_CHUNK;

const NOISE_MIN: f32 = -1.0;
const NOISE_MAX: f32 = 1.0;

/// Value written in place of anything that ends up above `1.0`.
pub const CLAMPED_HEIGHT: f32 = 0.99;

/// Normalizes a single raw sample.
///
/// Only the top end is clamped: results `> 1.0` become [`CLAMPED_HEIGHT`],
/// results below zero pass through unchanged.
#[inline]
pub fn normalize_value(raw: f32, bias: f32) -> f32 {
    let n = (raw - NOISE_MIN) / (NOISE_MAX - NOISE_MIN) * bias;
    if n > 1.0 { CLAMPED_HEIGHT } else { n }
}

/// Normalizes every cell of `field` in place.
pub fn normalize(field: &mut HeightField, bias: f32) {
    field
        .as_mut_slice()
        .par_chunks_mut(WORK_CHUNK)
        .for_each(|cells| {
            for cell in cells {
                *cell = normalize_value(*cell, bias);
            }
        });
}
