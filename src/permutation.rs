//! Seeded gradient and permutation tables for classic Perlin noise.
//!
//! A [`PermutationTable`] is built once per seed and only read afterwards, so a
//! single table can be shared by reference across any number of worker threads.

use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of distinct lattice entries (`P`). Must stay a power of two: lattice
/// indices are masked with `PERM_SIZE - 1`.
pub const PERM_SIZE: usize = 256;

/// Length of both tables after extension (`2·P + 2`).
pub const TABLE_LEN: usize = PERM_SIZE * 2 + 2;

/// Gradient vectors on the unit sphere plus an index permutation of `[0, P)`.
///
/// Both arrays are extended by repeating their first `P + 2` entries at offset
/// `P`, so lookups of the form `perm[i + b]` with `i, b < P + 1` never wrap.
#[derive(Clone, Debug)]
pub struct PermutationTable {
    permutation: Vec<usize>,
    gradients: Vec<Vec3>,
}

impl PermutationTable {
    /// Builds the tables from a fresh generator seeded with `seed`.
    pub fn build(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self::from_rng(&mut rng)
    }

    /// Builds the tables by drawing from an existing generator.
    ///
    /// Gradients are drawn first, then the permutation is shuffled, so the
    /// result depends only on the generator's state on entry.
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut gradients = vec![Vec3::ZERO; TABLE_LEN];
        for gradient in gradients.iter_mut().take(PERM_SIZE) {
            *gradient = sample_unit_gradient(rng);
        }

        let mut permutation: Vec<usize> = (0..PERM_SIZE).collect();
        permutation.shuffle(rng);
        permutation.resize(TABLE_LEN, 0);

        for i in 0..PERM_SIZE + 2 {
            permutation[PERM_SIZE + i] = permutation[i];
            gradients[PERM_SIZE + i] = gradients[i];
        }

        Self {
            permutation,
            gradients,
        }
    }

    /// The full extended permutation (`2·P + 2` entries).
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// The first `P` permutation entries, a bijection on `[0, P)`.
    pub fn base_permutation(&self) -> &[usize] {
        &self.permutation[..PERM_SIZE]
    }

    /// The full extended gradient table (`2·P + 2` unit vectors).
    pub fn gradients(&self) -> &[Vec3] {
        &self.gradients
    }

    #[inline]
    pub(crate) fn perm(&self, i: usize) -> usize {
        self.permutation[i]
    }

    #[inline]
    pub(crate) fn gradient(&self, i: usize) -> Vec3 {
        self.gradients[i]
    }
}

/// Rejection-samples a direction inside the unit ball, then projects it onto
/// the sphere. Points at (or numerically near) the origin are redrawn.
fn sample_unit_gradient<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    const P: i32 = PERM_SIZE as i32;
    let mut coord = || ((rng.random_range(0..i32::MAX) % (P + P)) - P) as f32 / P as f32;

    loop {
        let v = Vec3::new(coord(), coord(), coord());
        let s = v.dot(v);
        if s <= 1.0 && s > f32::EPSILON {
            return v / s.sqrt();
        }
    }
}
