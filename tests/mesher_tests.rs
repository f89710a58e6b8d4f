use bevy::prelude::*;
use bevy_strata_terrain::{
    HeightCurve, HeightField, SnowSettings, StriationBand, TerrainError, TerrainMeshBuilder,
    TextureUv, TextureUvTable, TextureZone,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const MAX_HEIGHT: f32 = 20.0;

fn flat_field(w: usize, d: usize, value: f32) -> HeightField {
    HeightField::from_vec(w, d, vec![value; w * d]).unwrap()
}

fn ramp_field(w: usize, d: usize) -> HeightField {
    let mut field = HeightField::new(w, d).unwrap();
    for x in 0..w {
        for z in 0..d {
            field.set(x, z, x as f32 / w as f32);
        }
    }
    field
}

fn atlas() -> TextureUvTable {
    TextureUvTable::packed_grid(4, 32, 32)
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(7)
}

#[test]
fn vertex_count_is_four_per_quad() {
    let field = flat_field(5, 7, 0.5);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert_eq!(mesh.positions.len(), 4 * 6 * 4);
    assert_eq!(mesh.normals.len(), 4 * 6 * 4);
    assert_eq!(mesh.uvs.len(), 4 * 6 * 4);
    assert_eq!(mesh.quad_count(), 4 * 6);
}

#[test]
fn index_count_is_six_per_quad() {
    let field = flat_field(5, 7, 0.5);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert_eq!(mesh.indices.len(), (5 - 1) * (7 - 1) * 6);
}

#[test]
fn quad_winding_matches_vertex_order() {
    let field = flat_field(3, 3, 0.5);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert_eq!(&mesh.indices[..6], &[0, 1, 2, 3, 2, 1]);
    assert_eq!(&mesh.indices[6..12], &[4, 5, 6, 7, 6, 5]);
}

#[test]
fn positions_are_scaled_and_recentred() {
    let mut field = flat_field(3, 3, 0.5);
    field.set(1, 1, 0.75);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap();

    // First quad is cell (0,0); its fourth vertex is grid point (1,1).
    assert_eq!(mesh.positions[0], [0.0, 0.0, 0.0]);
    assert_eq!(mesh.positions[1], [0.0, 0.0, 1.0]);
    assert_eq!(mesh.positions[2], [1.0, 0.0, 0.0]);
    assert_eq!(mesh.positions[3], [1.0, 5.0, 1.0]);
}

#[test]
fn quads_do_not_share_vertices() {
    let field = flat_field(3, 3, 0.5);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    // Quad (0,0) ends at (1,_,1); quad (0,1) starts again at (0,_,1).
    assert_eq!(mesh.positions[1], mesh.positions[4]);
    assert_eq!(mesh.positions[4], [0.0, 0.0, 1.0]);
}

#[test]
fn flat_normals_point_up() {
    let field = flat_field(4, 4, 0.3);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    for n in &mesh.normals {
        assert!(n[1] > 0.99, "flat terrain normal y should be ~1.0, got {n:?}");
    }
}

#[test]
fn ramp_normals_have_x_component() {
    let field = ramp_field(8, 8);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    for n in &mesh.normals {
        assert!(n[0].abs() > 0.01, "ramp normal should tilt along X, got {n:?}");
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-5);
    }
}

#[test]
fn bounds_cover_all_vertices() {
    let field = ramp_field(6, 4);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    for p in &mesh.positions {
        for axis in 0..3 {
            assert!(p[axis] >= mesh.bounds.min[axis] - 1e-5);
            assert!(p[axis] <= mesh.bounds.max[axis] + 1e-5);
        }
    }
    assert_eq!(mesh.bounds.min.x, 0.0);
    assert_eq!(mesh.bounds.max.x, 5.0);
    assert_eq!(mesh.bounds.max.z, 3.0);
}

#[test]
fn converts_to_bevy_mesh_with_all_attributes() {
    let field = flat_field(4, 4, 0.5);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &atlas(), &mut rng())
        .unwrap()
        .to_mesh();
    assert!(mesh.attribute(Mesh::ATTRIBUTE_POSITION).is_some());
    assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
    assert_eq!(mesh.count_vertices(), 9 * 4);
    assert_eq!(mesh.indices().expect("mesh must have indices").len(), 9 * 6);
}

#[test]
fn uvs_follow_corner_order() {
    let tile = TextureUv {
        name_id: 0,
        pixel_start_x: 0.1,
        pixel_start_y: 0.2,
        pixel_start_x2: 0.3,
        pixel_end_y: 0.4,
        pixel_end_x: 0.5,
        pixel_start_y2: 0.6,
        pixel_end_x2: 0.7,
        pixel_end_y2: 0.8,
    };
    let table = TextureUvTable::new(32, 32, vec![tile]);
    let field = flat_field(2, 2, 0.5);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &table, &mut rng())
        .unwrap();
    assert_eq!(
        mesh.uvs,
        vec![[0.1, 0.2], [0.7, 0.6], [0.3, 0.4], [0.5, 0.8]]
    );
}

#[test]
fn overlapping_zones_last_match_wins() {
    // 0.85 * 20 - 10 = 7
    let field = flat_field(3, 3, 0.85);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![
            TextureZone::new(0.0, 10.0, 1),
            TextureZone::new(5.0, 15.0, 2),
        ])
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert!(mesh.quad_textures.iter().all(|&t| t == 2));
    let expected = atlas().get(2).unwrap().quad_uvs();
    assert_eq!(&mesh.uvs[..4], &expected);
}

#[test]
fn unmatched_quads_use_texture_zero() {
    let field = flat_field(3, 3, 0.85);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![TextureZone::new(8.0, 10.0, 1)])
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert!(mesh.quad_textures.iter().all(|&t| t == 0));
}

#[test]
fn zone_bounds_are_exclusive() {
    // 0.5 * 20 - 10 = 0, exactly on the zone's start.
    let field = flat_field(3, 3, 0.5);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![TextureZone::new(0.0, 10.0, 1)])
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert!(mesh.quad_textures.iter().all(|&t| t == 0));
}

#[test]
fn snow_overrides_zone_on_flat_high_ground() {
    let field = flat_field(3, 3, 0.85);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![TextureZone::new(0.0, 10.0, 1)])
        .with_snow(SnowSettings {
            normal_threshold: 0.9,
            min_height: 5.0,
            texture_index: 3,
        })
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert!(mesh.quad_textures.iter().all(|&t| t == 3));
}

#[test]
fn snow_needs_minimum_height() {
    let field = flat_field(3, 3, 0.85);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![TextureZone::new(0.0, 10.0, 1)])
        .with_snow(SnowSettings {
            normal_threshold: 0.9,
            min_height: 8.0,
            texture_index: 3,
        })
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert!(mesh.quad_textures.iter().all(|&t| t == 1));
}

#[test]
fn snow_skips_steep_quads() {
    let mut field = HeightField::new(3, 3).unwrap();
    for x in 0..3 {
        for z in 0..3 {
            field.set(x, z, 0.6 + x as f32 * 0.2);
        }
    }
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_snow(SnowSettings {
            normal_threshold: 0.9,
            min_height: -100.0,
            texture_index: 3,
        })
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    // A rise of 4 per unit gives a face normal y of about 0.24.
    assert!(mesh.quad_textures.iter().all(|&t| t == 0));
}

#[test]
fn missing_texture_index_is_an_error() {
    let field = flat_field(3, 3, 0.85);
    let result = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![TextureZone::new(0.0, 10.0, 9)])
        .build(&field, &atlas(), &mut rng());
    assert_eq!(
        result.unwrap_err(),
        TerrainError::MissingTexture {
            index: 9,
            available: 4
        }
    );
}

#[test]
fn single_row_field_builds_empty_mesh() {
    let field = flat_field(1, 5, 0.5);
    let table = TextureUvTable::packed_grid(1, 32, 32);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .build(&field, &table, &mut rng())
        .expect("a 1×5 field is valid and has no quads");
    assert!(mesh.positions.is_empty());
    assert!(mesh.indices.is_empty());
    assert!(mesh.uvs.is_empty());
    assert_eq!(mesh.quad_count(), 0);
    assert_eq!(mesh.bounds.min, mesh.bounds.max);
    assert!(mesh.bounds.min.is_finite());
}

#[test]
fn certain_spawns_fire_once_per_matching_quad() {
    let field = flat_field(4, 3, 0.85);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![TextureZone::new(0.0, 10.0, 1).with_spawn("pine", 100.0)])
        .with_world_offset(Vec2::new(100.0, -50.0))
        .build(&field, &atlas(), &mut rng())
        .unwrap();

    assert_eq!(mesh.spawns.len(), 3 * 2);
    for (quad, spawn) in mesh.spawns.iter().enumerate() {
        assert_eq!(spawn.prop.0, "pine");
        let v1 = Vec3::from(mesh.positions[quad * 4]);
        assert_eq!(spawn.position, v1 + Vec3::new(100.0, 0.0, -50.0));
        assert!((0.0..360.0).contains(&spawn.yaw_degrees));
        assert_eq!(spawn.yaw_degrees.fract(), 0.0);
    }
}

#[test]
fn zero_chance_never_spawns() {
    let field = flat_field(4, 4, 0.85);
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![TextureZone::new(0.0, 10.0, 1).with_spawn("rock", 0.0)])
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert!(mesh.spawns.is_empty());
}

#[test]
fn spawns_are_deterministic_per_seed() {
    let field = flat_field(8, 8, 0.85);
    let builder = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_zones(vec![TextureZone::new(0.0, 10.0, 1).with_spawn("bush", 30.0)]);
    let a = builder.build(&field, &atlas(), &mut rng()).unwrap();
    let b = builder.build(&field, &atlas(), &mut rng()).unwrap();
    assert_eq!(a.spawns, b.spawns);
}

#[test]
fn striation_remaps_vertex_heights() {
    // Every vertex sits at y = 0, inside (-20, 20), and is flattened to the
    // band's floor.
    let field = flat_field(3, 3, 0.5);
    let band = StriationBand::new(-20.0, 20.0, HeightCurve::from_fn(|_| 0.0)).unwrap();
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_striations(vec![band])
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert!(mesh.positions.iter().all(|p| p[1] == -20.0));
}

#[test]
fn classification_uses_height_before_striation() {
    let field = flat_field(3, 3, 0.85);
    // Pushes y = 7 down to 1, outside the zone below.
    let band = StriationBand::new(0.0, 10.0, HeightCurve::from_fn(|_| 0.1)).unwrap();
    let mesh = TerrainMeshBuilder::new(MAX_HEIGHT)
        .with_striations(vec![band])
        .with_zones(vec![TextureZone::new(5.0, 10.0, 2)])
        .build(&field, &atlas(), &mut rng())
        .unwrap();
    assert!(mesh.quad_textures.iter().all(|&t| t == 2));
    assert!(mesh.positions.iter().all(|p| (p[1] - 1.0).abs() < 1e-5));
}
