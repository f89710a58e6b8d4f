//! Avian3D physics collider generation for terrain chunks.
//!
//! Provides [`build_chunk_collider`] which converts a chunk's normalized
//! [`HeightField`] into an Avian3D `Collider::heightfield`, far cheaper than a
//! `trimesh` for ray-casting and contact queries on static terrain.

use avian3d::prelude::Collider;
use bevy::prelude::*;

use crate::error::TerrainError;
use crate::height_field::HeightField;
use crate::striation::{StriationBand, apply_striations};

/// Builds a heightfield collider matching the surface of a chunk's mesh.
///
/// Heights are converted to world units the same way the mesh builder does
/// (`h * max_height - max_height / 2`, then striated). Striation depends only
/// on a vertex's height, so every quad sharing a grid point agrees on it and a
/// single heightfield reproduces the mesh exactly.
///
/// The collider is centred on its local origin, spanning
/// `[-(width-1)/2, (width-1)/2] × [-(depth-1)/2, (depth-1)/2]`; offset the
/// entity by half the chunk extent to line it up with the mesh.
///
/// # Errors
///
/// Returns [`TerrainError::InvalidConfiguration`] if the field is narrower
/// than two points on either axis, since a heightfield needs at least one cell.
pub fn build_chunk_collider(
    heights: &HeightField,
    max_height: f32,
    striations: &[StriationBand],
) -> Result<Collider, TerrainError> {
    let w = heights.width();
    let d = heights.depth();
    if w < 2 || d < 2 {
        return Err(TerrainError::config(format!(
            "collider needs at least 2×2 height samples (got {w}×{d})"
        )));
    }
    let half = max_height / 2.0;

    // Avian's rows run along X and columns along Z, which is already the
    // field's layout.
    let rows: Vec<Vec<f32>> = (0..w)
        .map(|x| {
            (0..d)
                .map(|z| apply_striations(striations, heights.get(x, z) * max_height - half))
                .collect()
        })
        .collect();

    let scale = Vec3::new((w - 1) as f32, 1.0, (d - 1) as f32);

    Ok(Collider::heightfield(rows, scale))
}
