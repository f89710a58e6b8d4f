//! Bevy glue: spawn a generated scene as mesh entities.

use std::sync::Arc;

use bevy::ecs::system::EntityCommands;
use bevy::log::error;
use bevy::prelude::*;

use crate::generator::{TerrainConfig, generate_scene};
use crate::mesher::SpawnRequest;
use crate::zones::TextureUvTable;

/// Generates the terrain described by [`TerrainSettings`] at startup.
///
/// Insert [`TerrainSettings`] before adding the plugin. Prop spawn requests
/// are queued in [`PendingPropSpawns`] for the application to drain.
///
/// Rendering concerns such as fog or per-chunk materials stay with the host:
/// order camera systems against [`TerrainSystems::Spawn`], or register a
/// [`TerrainRenderHooks`] callback to decorate each chunk entity.
pub struct StrataTerrainPlugin;

impl Plugin for StrataTerrainPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingPropSpawns>()
            .add_systems(Startup, spawn_terrain.in_set(TerrainSystems::Spawn));
    }
}

/// System sets the plugin runs in.
#[derive(SystemSet, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerrainSystems {
    /// Generates the scene and spawns chunk entities (`Startup`).
    Spawn,
}

/// Callback run on every spawned chunk entity.
pub type ChunkHook = Arc<dyn Fn(&mut EntityCommands<'_>, TerrainChunk) + Send + Sync>;

/// Optional host callbacks invoked while chunks are spawned.
#[derive(Resource, Clone, Default)]
pub struct TerrainRenderHooks {
    pub on_chunk_spawned: Option<ChunkHook>,
}

impl TerrainRenderHooks {
    /// Hooks with only a per-chunk spawn callback.
    pub fn new(
        hook: impl Fn(&mut EntityCommands<'_>, TerrainChunk) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_chunk_spawned: Some(Arc::new(hook)),
        }
    }
}

/// Scene configuration and the atlas UV table it is textured with.
#[derive(Resource, Clone, Debug)]
pub struct TerrainSettings {
    pub config: TerrainConfig,
    pub atlas: TextureUvTable,
}

/// Optional material applied to every chunk.
#[derive(Resource, Clone, Debug)]
pub struct TerrainMaterial {
    pub handle: Handle<StandardMaterial>,
}

/// Spawn requests produced by terrain generation, not yet instantiated.
#[derive(Resource, Default, Debug)]
pub struct PendingPropSpawns {
    pub requests: Vec<SpawnRequest>,
}

/// Marks a terrain chunk entity with its grid coordinate.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainChunk {
    pub coord: UVec2,
}

/// Startup system that builds the scene and spawns one entity per chunk.
pub fn spawn_terrain(
    mut commands: Commands,
    settings: Res<TerrainSettings>,
    material: Option<Res<TerrainMaterial>>,
    hooks: Option<Res<TerrainRenderHooks>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut pending: ResMut<PendingPropSpawns>,
) {
    let scene = match generate_scene(&settings.config, &settings.atlas) {
        Ok(scene) => scene,
        Err(e) => {
            error!("terrain generation aborted: {e}");
            return;
        }
    };

    let on_spawned = hooks.and_then(|h| h.on_chunk_spawned.clone());

    for chunk in scene.chunks {
        let marker = TerrainChunk { coord: chunk.coord };
        let mut entity = commands.spawn((
            Mesh3d(meshes.add(chunk.mesh.to_mesh())),
            Transform::from_xyz(chunk.origin.x as f32, 0.0, chunk.origin.y as f32),
            marker,
        ));
        if let Some(material) = &material {
            entity.insert(MeshMaterial3d(material.handle.clone()));
        }
        if let Some(hook) = &on_spawned {
            hook(&mut entity, marker);
        }
        pending.requests.extend(chunk.mesh.spawns);
    }
}
