//! Fractal Brownian motion over classic (gradient-table) Perlin noise.
//!
//! [`NoiseSession`] owns everything that is fixed for one generation pass: the
//! seeded [`PermutationTable`] and the sub-cell jitter offsets. Evaluation is a
//! pure function of the session, the parameters and the cell coordinate, so
//! [`NoiseSession::evaluate`] fans the grid out over rayon with no locking.

use bevy::math::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::height_field::HeightField;
use crate::permutation::{PERM_SIZE, PermutationTable};

/// Cells handed to a worker at a time.
pub const WORK_CHUNK: usize = 64;

/// Empirical range correction applied to every raw Perlin sample.
const RANGE_CORRECTION: f32 = 1.5;

/// Added to each coordinate before truncation so the integer part stays
/// positive for any reasonable input.
const LATTICE_BIAS: f32 = 10000.0;

/// fBm layering parameters for one generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Frequency of the first octave.
    pub frequency: f32,
    /// Amplitude of the first octave.
    pub amplitude: f32,
    /// Number of layered octaves.
    pub octaves: u32,
    /// Frequency multiplier between octaves.
    pub lacunarity: f32,
    /// Amplitude multiplier between octaves.
    pub gain: f32,
    /// Grid-to-noise-space scale.
    pub scale: f32,
    /// Multiplier applied after mapping `[-1, 1]` to `[0, 1]`.
    pub normalize_bias: f32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            amplitude: 0.5,
            octaves: 8,
            lacunarity: 2.0,
            gain: 0.5,
            scale: 0.01,
            normalize_bias: 1.0,
        }
    }
}

/// Seed-derived state shared read-only by every chunk of a pass.
#[derive(Clone, Debug)]
pub struct NoiseSession {
    table: PermutationTable,
    x_offset: f32,
    z_offset: f32,
}

impl NoiseSession {
    /// Seeds a generator, draws the two jitter offsets, then builds the
    /// permutation table from the same stream.
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let x_offset = rng.random_range(0.0_f32..0.9999);
        let z_offset = rng.random_range(0.0_f32..0.9999);
        let table = PermutationTable::from_rng(&mut rng);
        Self {
            table,
            x_offset,
            z_offset,
        }
    }

    /// Uses an already-built table with explicit jitter offsets.
    pub fn with_table(table: PermutationTable, x_offset: f32, z_offset: f32) -> Self {
        Self {
            table,
            x_offset,
            z_offset,
        }
    }

    /// The session's permutation and gradient table.
    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    /// Jitter added to the X and Z sample coordinates.
    pub fn offsets(&self) -> (f32, f32) {
        (self.x_offset, self.z_offset)
    }

    /// Samples raw fBm noise for every cell of a `width × depth` grid whose
    /// first cell sits at grid position `(origin_x, origin_z)`.
    ///
    /// Output is not normalized; see [`crate::normalize`].
    pub fn evaluate(
        &self,
        width: usize,
        depth: usize,
        origin_x: f32,
        origin_z: f32,
        params: &NoiseParameters,
    ) -> Result<HeightField, TerrainError> {
        let mut field = HeightField::new(width, depth)?;

        field
            .as_mut_slice()
            .par_chunks_mut(WORK_CHUNK)
            .enumerate()
            .for_each(|(chunk, cells)| {
                for (offset, cell) in cells.iter_mut().enumerate() {
                    let index = chunk * WORK_CHUNK + offset;
                    let x = (index / depth) as f32;
                    let z = (index % depth) as f32;
                    *cell = fbm(
                        &self.table,
                        (origin_x + x) * params.scale + self.x_offset,
                        (origin_z + z) * params.scale + self.z_offset,
                        params,
                    );
                }
            });

        Ok(field)
    }
}

/// Sums `params.octaves` layers of Perlin noise at `(x, y)` on the `z = 0` plane.
pub fn fbm(table: &PermutationTable, x: f32, y: f32, params: &NoiseParameters) -> f32 {
    let mut freq = params.frequency;
    let mut amp = params.amplitude;
    let mut sum = 0.0;
    for _ in 0..params.octaves {
        sum += perlin3(table, x * freq, y * freq, 0.0) * amp;
        freq *= params.lacunarity;
        amp *= params.gain;
    }
    sum
}

/// Lattice cell of one axis: both corner indices and both corner offsets.
struct Axis {
    b0: usize,
    b1: usize,
    r0: f32,
    r1: f32,
}

impl Axis {
    #[inline]
    fn new(v: f32) -> Self {
        let t = v + LATTICE_BIAS;
        let whole = t as i32;
        let b0 = (whole as usize) & (PERM_SIZE - 1);
        let b1 = (b0 + 1) & (PERM_SIZE - 1);
        let r0 = t - whole as f32;
        Self {
            b0,
            b1,
            r0,
            r1: r0 - 1.0,
        }
    }
}

/// Cubic S-curve `t²(3 − 2t)`.
#[inline]
pub fn s_curve(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(t: f32, a: f32, b: f32) -> f32 {
    a + t * (b - a)
}

/// Classic 3D Perlin noise, scaled by the range correction factor.
pub fn perlin3(table: &PermutationTable, x: f32, y: f32, z: f32) -> f32 {
    let ax = Axis::new(x);
    let ay = Axis::new(y);
    let az = Axis::new(z);

    let i = table.perm(ax.b0);
    let j = table.perm(ax.b1);

    let b00 = table.perm(i + ay.b0);
    let b10 = table.perm(j + ay.b0);
    let b01 = table.perm(i + ay.b1);
    let b11 = table.perm(j + ay.b1);

    let sx = s_curve(ax.r0);
    let sy = s_curve(ay.r0);
    let sz = s_curve(az.r0);

    let corner = |b: usize, rx: f32, ry: f32, rz: f32| {
        table.gradient(b).dot(Vec3::new(rx, ry, rz))
    };

    let a = lerp(
        sx,
        corner(b00 + az.b0, ax.r0, ay.r0, az.r0),
        corner(b10 + az.b0, ax.r1, ay.r0, az.r0),
    );
    let b = lerp(
        sx,
        corner(b01 + az.b0, ax.r0, ay.r1, az.r0),
        corner(b11 + az.b0, ax.r1, ay.r1, az.r0),
    );
    let c = lerp(sy, a, b);

    let a = lerp(
        sx,
        corner(b00 + az.b1, ax.r0, ay.r0, az.r1),
        corner(b10 + az.b1, ax.r1, ay.r0, az.r1),
    );
    let b = lerp(
        sx,
        corner(b01 + az.b1, ax.r0, ay.r1, az.r1),
        corner(b11 + az.b1, ax.r1, ay.r1, az.r1),
    );
    let d = lerp(sy, a, b);

    RANGE_CORRECTION * lerp(sz, c, d)
}
