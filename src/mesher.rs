//! Mesh generation from a normalized [`HeightField`].
//!
//! Every grid cell becomes its own quad of four unshared vertices so that each
//! quad can map an independent atlas tile. Per quad the builder:
//! - scales heights by `max_height` and re-centres them around zero
//! - classifies the quad into a texture zone by its *average* height
//! - rolls for prop spawns in each matching zone
//! - applies the snow override from the quad's face normal
//! - remaps each corner through the striation bands
//!
//! Vertex normals and bounds are computed once, after all quads are emitted.

use bevy::asset::RenderAssetUsages;
use bevy::math::bounding::Aabb3d;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use rand::Rng;

use crate::error::TerrainError;
use crate::height_field::HeightField;
use crate::striation::{StriationBand, apply_striations};
use crate::zones::{PropId, SnowSettings, TextureUvTable, TextureZone};

/// A request for the host to place a prop. The core never instantiates it.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    pub prop: PropId,
    /// World-space anchor (the quad's first vertex plus the chunk origin).
    pub position: Vec3,
    /// Rotation about +Y in whole degrees, `[0, 360)`.
    pub yaw_degrees: f32,
}

/// Output of [`TerrainMeshBuilder::build`]: raw buffers plus spawn requests.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// Resolved texture index of each quad, in emission order.
    pub quad_textures: Vec<usize>,
    pub bounds: Aabb3d,
    pub spawns: Vec<SpawnRequest>,
}

impl TerrainMesh {
    /// One quad per grid cell, so `(width - 1) * (depth - 1)`.
    pub fn quad_count(&self) -> usize {
        self.quad_textures.len()
    }

    /// Copies the buffers into a `TriangleList` Bevy [`Mesh`].
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.normals.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs.clone());
        mesh.insert_indices(Indices::U32(self.indices.clone()));
        mesh
    }
}

/// Converts a normalized [`HeightField`] into a textured terrain mesh.
///
/// # Example
///
/// ```ignore
/// use bevy_strata_terrain::{HeightField, TerrainMeshBuilder, TextureUvTable, TextureZone};
/// use rand::SeedableRng;
///
/// let heights = HeightField::new(9, 9)?;
/// let atlas = TextureUvTable::packed_grid(4, 32, 32);
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
/// let terrain = TerrainMeshBuilder::new(20.0)
///     .with_zones(vec![TextureZone::new(-10.0, 0.0, 1)])
///     .build(&heights, &atlas, &mut rng)?;
/// let mesh = terrain.to_mesh();
/// ```
#[derive(Clone, Debug)]
pub struct TerrainMeshBuilder {
    max_height: f32,
    zones: Vec<TextureZone>,
    striations: Vec<StriationBand>,
    snow: Option<SnowSettings>,
    world_offset: Vec2,
}

impl TerrainMeshBuilder {
    /// Creates a builder with no zones, striations or snow. Quads default to
    /// texture index `0`.
    pub fn new(max_height: f32) -> Self {
        Self {
            max_height,
            zones: Vec::new(),
            striations: Vec::new(),
            snow: None,
            world_offset: Vec2::ZERO,
        }
    }

    /// Zones are tested in order; the last one containing a quad's average
    /// height wins.
    pub fn with_zones(mut self, zones: Vec<TextureZone>) -> Self {
        self.zones = zones;
        self
    }

    /// Bands are applied to every vertex in order, each seeing the previous
    /// band's output.
    pub fn with_striations(mut self, striations: Vec<StriationBand>) -> Self {
        self.striations = striations;
        self
    }

    pub fn with_snow(mut self, snow: SnowSettings) -> Self {
        self.snow = Some(snow);
        self
    }

    /// World X/Z of the field's `(0, 0)` cell; only affects spawn positions.
    pub fn with_world_offset(mut self, offset: Vec2) -> Self {
        self.world_offset = offset;
        self
    }

    /// Builds the mesh. Random draws (spawn rolls and yaw) come from `rng`, so
    /// a chunk seeded the same way always produces the same props.
    ///
    /// Fails if classification picks a texture index that `atlas` does not
    /// contain. A field with a single row or column produces an empty mesh.
    pub fn build<R: Rng + ?Sized>(
        &self,
        heights: &HeightField,
        atlas: &TextureUvTable,
        rng: &mut R,
    ) -> Result<TerrainMesh, TerrainError> {
        let w = heights.width();
        let d = heights.depth();
        // A single row or column has no interior cells and yields an empty mesh.
        let quad_count = (w - 1) * (d - 1);
        let mut positions: Vec<[f32; 3]> = Vec::with_capacity(quad_count * 4);
        let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(quad_count * 4);
        let mut indices: Vec<u32> = Vec::with_capacity(quad_count * 6);
        let mut quad_textures: Vec<usize> = Vec::with_capacity(quad_count);
        let mut spawns = Vec::new();

        let half = self.max_height / 2.0;
        let world_y = |x: usize, z: usize| heights.get(x, z) * self.max_height - half;

        for x in 0..(w - 1) {
            for z in 0..(d - 1) {
                let (fx, fz) = (x as f32, z as f32);
                //  v1(x,z)───v3(x+1,z)
                //   │            │
                //  v2(x,z+1)──v4(x+1,z+1)
                let mut v1 = Vec3::new(fx, world_y(x, z), fz);
                let mut v2 = Vec3::new(fx, world_y(x, z + 1), fz + 1.0);
                let mut v3 = Vec3::new(fx + 1.0, world_y(x + 1, z), fz);
                let mut v4 = Vec3::new(fx + 1.0, world_y(x + 1, z + 1), fz + 1.0);

                // Classification uses the surface before striation.
                let face_normal = (v1 - v2).normalize().cross((v1 - v3).normalize());
                let h = (v1.y + v2.y + v3.y + v4.y) / 4.0;

                for v in [&mut v1, &mut v2, &mut v3, &mut v4] {
                    v.y = apply_striations(&self.striations, v.y);
                }

                let base = positions.len() as u32;
                positions.extend([v1, v2, v3, v4].map(<[f32; 3]>::from));

                let mut texture = 0;
                for zone in &self.zones {
                    if !zone.contains(h) {
                        continue;
                    }
                    texture = zone.texture_index;
                    if rng.random::<f32>() * 100.0 < zone.spawn_chance
                        && let Some(prop) = &zone.spawn
                    {
                        spawns.push(SpawnRequest {
                            prop: prop.clone(),
                            position: v1 + Vec3::new(self.world_offset.x, 0.0, self.world_offset.y),
                            yaw_degrees: rng.random_range(0..360) as f32,
                        });
                    }
                }

                if let Some(snow) = &self.snow
                    && face_normal.y > snow.normal_threshold
                    && h > snow.min_height
                {
                    texture = snow.texture_index;
                }

                uvs.extend(atlas.get(texture)?.quad_uvs());
                quad_textures.push(texture);

                // Triangle 1: v1, v2, v3. Triangle 2: v4, v3, v2. Both CCW
                // seen from +Y.
                indices.extend([base, base + 1, base + 2, base + 3, base + 2, base + 1]);
            }
        }

        let normals = area_weighted_normals(&positions, &indices);
        let bounds = bounding_box(&positions);

        Ok(TerrainMesh {
            positions,
            normals,
            uvs,
            indices,
            quad_textures,
            bounds,
            spawns,
        })
    }
}

/// Accumulates each triangle's unnormalized cross product (proportional to its
/// area) at its three vertices, then normalizes.
fn area_weighted_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals: Vec<Vec3> = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = Vec3::from(positions[i0]);
        let p1 = Vec3::from(positions[i1]);
        let p2 = Vec3::from(positions[i2]);
        let face_normal = (p1 - p0).cross(p2 - p0);
        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }

    normals
        .iter()
        .map(|n| {
            let len = n.length();
            // Degenerate vertex (zero contributions): default to +Y.
            if len > f32::EPSILON { (*n / len).into() } else { [0.0, 1.0, 0.0] }
        })
        .collect()
}

/// Zero-sized box at the origin when there are no vertices.
fn bounding_box(positions: &[[f32; 3]]) -> Aabb3d {
    if positions.is_empty() {
        return Aabb3d::new(Vec3::ZERO, Vec3::ZERO);
    }
    let (min, max) = positions.iter().map(|p| Vec3::from(*p)).fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), p| (min.min(p), max.max(p)),
    );
    Aabb3d::new((min + max) / 2.0, (max - min) / 2.0)
}
