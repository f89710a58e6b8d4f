//! Whole-scene generation: a grid of independently seeded chunks.
//!
//! One [`NoiseSession`] is built per scene and shared read-only. Each chunk
//! then samples its own height field, normalizes it, and meshes it with a
//! generator derived from `(seed, chunk_x, chunk_z)`, so the result of a chunk
//! does not depend on which thread ran it or in what order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::TerrainError;
use crate::height_field::HeightField;
use crate::mesher::{TerrainMesh, TerrainMeshBuilder};
use crate::noise::{NoiseParameters, NoiseSession};
use crate::normalize::normalize;
use crate::striation::StriationBand;
use crate::zones::{SnowSettings, TextureUvTable, TextureZone};

/// Everything needed to generate a terrain scene.
#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    pub seed: u64,
    /// Number of chunks along X.
    #[serde(default = "one")]
    pub chunks_x: u32,
    /// Number of chunks along Z.
    #[serde(default = "one")]
    pub chunks_z: u32,
    /// Quads per chunk along X. The sampled grid is one point wider.
    pub chunk_width: usize,
    /// Quads per chunk along Z. The sampled grid is one point deeper.
    pub chunk_depth: usize,
    pub max_height: f32,
    #[serde(default)]
    pub noise: NoiseParameters,
    #[serde(default)]
    pub zones: Vec<TextureZone>,
    #[serde(default)]
    pub striations: Vec<StriationBand>,
    #[serde(default)]
    pub snow: Option<SnowSettings>,
}

fn one() -> u32 {
    1
}

impl TerrainConfig {
    /// A single `chunk_width × chunk_depth` chunk with default noise and no
    /// zones, striations or snow.
    pub fn new(seed: u64, chunk_width: usize, chunk_depth: usize, max_height: f32) -> Self {
        Self {
            seed,
            chunks_x: 1,
            chunks_z: 1,
            chunk_width,
            chunk_depth,
            max_height,
            noise: NoiseParameters::default(),
            zones: Vec::new(),
            striations: Vec::new(),
            snow: None,
        }
    }

    /// Checks the parts of the configuration that would otherwise fail late.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.chunk_width == 0 || self.chunk_depth == 0 {
            return Err(TerrainError::config(format!(
                "chunk size must be positive (got {}×{})",
                self.chunk_width, self.chunk_depth
            )));
        }
        if self.chunks_x == 0 || self.chunks_z == 0 {
            return Err(TerrainError::config(format!(
                "chunk grid must be positive (got {}×{})",
                self.chunks_x, self.chunks_z
            )));
        }
        if !(self.max_height.is_finite() && self.max_height > 0.0) {
            return Err(TerrainError::config(format!(
                "max height must be positive (got {})",
                self.max_height
            )));
        }
        Ok(())
    }

    /// World X/Z of chunk `coord`'s first grid point. The grid is centred on
    /// the origin.
    pub fn chunk_origin(&self, coord: UVec2) -> IVec2 {
        let ox = (coord.x as f32 - 0.5 * self.chunks_x as f32) as i32;
        let oz = (coord.y as f32 - 0.5 * self.chunks_z as f32) as i32;
        IVec2::new(ox * self.chunk_width as i32, oz * self.chunk_depth as i32)
    }

    fn mesh_builder(&self, origin: IVec2) -> TerrainMeshBuilder {
        let builder = TerrainMeshBuilder::new(self.max_height)
            .with_zones(self.zones.clone())
            .with_striations(self.striations.clone())
            .with_world_offset(origin.as_vec2());
        match self.snow {
            Some(snow) => builder.with_snow(snow),
            None => builder,
        }
    }
}

/// Derives a chunk's seed from the scene seed and its grid coordinate.
pub fn derive_chunk_seed(seed: u64, coord: UVec2) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    coord.x.hash(&mut hasher);
    coord.y.hash(&mut hasher);
    hasher.finish()
}

/// The generator a chunk draws its spawn rolls from.
pub fn chunk_rng(seed: u64, coord: UVec2) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_chunk_seed(seed, coord))
}

/// Samples and normalizes the `(chunk_width + 1) × (chunk_depth + 1)` height
/// field of one chunk.
pub fn chunk_heights(
    config: &TerrainConfig,
    session: &NoiseSession,
    origin: IVec2,
) -> Result<HeightField, TerrainError> {
    let mut field = session.evaluate(
        config.chunk_width + 1,
        config.chunk_depth + 1,
        origin.x as f32,
        origin.y as f32,
        &config.noise,
    )?;
    normalize(&mut field, config.noise.normalize_bias);
    Ok(field)
}

/// A successfully built chunk.
#[derive(Clone, Debug)]
pub struct TerrainChunkData {
    pub coord: UVec2,
    pub origin: IVec2,
    pub mesh: TerrainMesh,
}

/// A chunk that failed; it is left out of the scene.
#[derive(Clone, Debug)]
pub struct ChunkFailure {
    pub coord: UVec2,
    pub error: TerrainError,
}

/// The result of [`generate_scene`].
#[derive(Clone, Debug, Default)]
pub struct TerrainScene {
    pub chunks: Vec<TerrainChunkData>,
    pub failures: Vec<ChunkFailure>,
}

/// Builds one chunk end to end.
pub fn build_chunk(
    config: &TerrainConfig,
    session: &NoiseSession,
    atlas: &TextureUvTable,
    coord: UVec2,
) -> Result<TerrainChunkData, TerrainError> {
    let origin = config.chunk_origin(coord);
    let heights = chunk_heights(config, session, origin)?;
    let mut rng = chunk_rng(config.seed, coord);
    let mesh = config.mesh_builder(origin).build(&heights, atlas, &mut rng)?;
    debug!(
        "built terrain chunk {coord} at {origin}: {} quads, {} spawns",
        mesh.quad_count(),
        mesh.spawns.len()
    );
    Ok(TerrainChunkData {
        coord,
        origin,
        mesh,
    })
}

/// Builds every chunk of the configured grid in parallel.
///
/// Configuration errors abort before any work starts. Errors inside a chunk
/// are logged and collected in [`TerrainScene::failures`]; the other chunks
/// are unaffected.
pub fn generate_scene(
    config: &TerrainConfig,
    atlas: &TextureUvTable,
) -> Result<TerrainScene, TerrainError> {
    config.validate()?;
    let session = NoiseSession::new(config.seed);

    let coords: Vec<UVec2> = (0..config.chunks_x)
        .flat_map(|x| (0..config.chunks_z).map(move |z| UVec2::new(x, z)))
        .collect();

    let results: Vec<_> = coords
        .into_par_iter()
        .map(|coord| (coord, build_chunk(config, &session, atlas, coord)))
        .collect();

    let mut scene = TerrainScene::default();
    for (coord, result) in results {
        match result {
            Ok(chunk) => scene.chunks.push(chunk),
            Err(error) => {
                warn!("terrain chunk {coord} failed: {error}");
                scene.failures.push(ChunkFailure { coord, error });
            }
        }
    }

    info!(
        "generated terrain scene (seed {}): {} chunks, {} failed",
        config.seed,
        scene.chunks.len(),
        scene.failures.len()
    );
    Ok(scene)
}
