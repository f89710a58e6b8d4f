//! Seeded procedural terrain for Bevy.
//!
//! Generates a deterministic height field from fractal Brownian motion over
//! classic Perlin noise, then turns it into a mesh of independently textured
//! quads whose heights are reshaped by elevation-band "striation" curves and
//! whose textures are picked from height zones of an atlas.
//!
//! # Pipeline
//!
//! - [`NoiseSession`]: seed → [`PermutationTable`] + jitter offsets
//! - [`NoiseSession::evaluate`]: fBm samples for a grid (parallel)
//! - [`normalize`]: raw noise → `[0, 1)` heights (parallel)
//! - [`TerrainMeshBuilder`]: heights + zones + striations → [`TerrainMesh`]
//!   and prop [`SpawnRequest`]s
//! - [`generate_scene`]: all of the above over a grid of chunks
//!
//! # Feature Flags
//!
//! - `physics`: Enables [`collider`] and [`collider::build_chunk_collider`]
//!   for Avian3D integration.
//!
//! # Example
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_strata_terrain::{StrataTerrainPlugin, TerrainConfig, TerrainSettings, TextureUvTable};
//!
//! App::new()
//!     .add_plugins(DefaultPlugins)
//!     .insert_resource(TerrainSettings {
//!         config: TerrainConfig::new(42, 64, 64, 20.0),
//!         atlas: TextureUvTable::packed_grid(4, 32, 32),
//!     })
//!     .add_plugins(StrataTerrainPlugin)
//!     .run();
//! ```

pub mod error;
pub mod generator;
pub mod height_field;
pub mod mesher;
pub mod noise;
pub mod normalize;
pub mod permutation;
pub mod plugin;
pub mod striation;
pub mod zones;

#[cfg(feature = "physics")]
pub mod collider;

pub use error::TerrainError;
pub use generator::{
    ChunkFailure, TerrainChunkData, TerrainConfig, TerrainScene, build_chunk, chunk_heights,
    chunk_rng, derive_chunk_seed, generate_scene,
};
pub use height_field::HeightField;
pub use mesher::{SpawnRequest, TerrainMesh, TerrainMeshBuilder};
pub use noise::{NoiseParameters, NoiseSession, fbm, perlin3};
pub use normalize::{CLAMPED_HEIGHT, normalize, normalize_value};
pub use permutation::{PERM_SIZE, PermutationTable};
pub use plugin::{
    ChunkHook, PendingPropSpawns, StrataTerrainPlugin, TerrainChunk, TerrainMaterial,
    TerrainRenderHooks, TerrainSettings, TerrainSystems,
};
pub use striation::{CurveShape, HeightCurve, StriationBand, apply_striations};
pub use zones::{PropId, SnowSettings, TextureUv, TextureUvTable, TextureZone};

#[cfg(feature = "physics")]
pub use collider::build_chunk_collider;
