//! Texture-zone classification inputs: height zones, snow rules and the atlas
//! UV lookup table.

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// Identifier of a decorative prop, resolved by whoever instantiates it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropId(pub String);

impl From<&str> for PropId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A height range mapped to an atlas texture, optionally seeding props.
///
/// Zones may overlap. They are tested in declaration order and the last one
/// containing the quad's average height decides its texture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureZone {
    pub start_height: f32,
    pub end_height: f32,
    pub texture_index: usize,
    #[serde(default)]
    pub spawn: Option<PropId>,
    /// Percent chance (`0..100`) per matching quad of emitting a spawn request.
    #[serde(default)]
    pub spawn_chance: f32,
}

impl TextureZone {
    /// A zone covering `(start_height, end_height)` in world units that spawns nothing.
    pub fn new(start_height: f32, end_height: f32, texture_index: usize) -> Self {
        Self {
            start_height,
            end_height,
            texture_index,
            spawn: None,
            spawn_chance: 0.0,
        }
    }

    /// Emits `prop` on `chance_percent` percent of the quads in this zone.
    pub fn with_spawn(mut self, prop: impl Into<PropId>, chance_percent: f32) -> Self {
        self.spawn = Some(prop.into());
        self.spawn_chance = chance_percent;
        self
    }

    /// Both bounds are exclusive.
    #[inline]
    pub fn contains(&self, h: f32) -> bool {
        h > self.start_height && h < self.end_height
    }
}

/// Flat, high-altitude quads get the snow texture no matter which zone matched.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnowSettings {
    /// Minimum face-normal Y (exclusive); `1.0` is perfectly flat.
    pub normal_threshold: f32,
    /// Minimum average quad height (exclusive).
    pub min_height: f32,
    pub texture_index: usize,
}

/// UV corners of one atlas tile.
///
/// The duplicated `*2` corners let an atlas packer skew individual corners;
/// the mesh builder reads them in the order
/// `(start_x, start_y)`, `(end_x2, start_y2)`, `(start_x2, end_y)`, `(end_x, end_y2)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureUv {
    #[serde(rename = "nameID")]
    pub name_id: usize,
    pub pixel_start_x: f32,
    pub pixel_start_y: f32,
    pub pixel_start_x2: f32,
    pub pixel_end_y: f32,
    pub pixel_end_x: f32,
    pub pixel_start_y2: f32,
    pub pixel_end_x2: f32,
    pub pixel_end_y2: f32,
}

impl TextureUv {
    /// A tile with no skew: both copies of each corner coincide.
    pub fn rect(name_id: usize, start_x: f32, start_y: f32, end_x: f32, end_y: f32) -> Self {
        Self {
            name_id,
            pixel_start_x: start_x,
            pixel_start_y: start_y,
            pixel_start_x2: start_x,
            pixel_end_y: end_y,
            pixel_end_x: end_x,
            pixel_start_y2: start_y,
            pixel_end_x2: end_x,
            pixel_end_y2: end_y,
        }
    }

    /// The four per-vertex UVs of a quad, matching its vertex order.
    pub fn quad_uvs(&self) -> [[f32; 2]; 4] {
        [
            [self.pixel_start_x, self.pixel_start_y],
            [self.pixel_end_x2, self.pixel_start_y2],
            [self.pixel_start_x2, self.pixel_end_y],
            [self.pixel_end_x, self.pixel_end_y2],
        ]
    }
}

/// Read-only texture index → UV lookup, as produced by an atlas packer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureUvTable {
    pub atlas_width: u32,
    pub atlas_height: u32,
    #[serde(rename = "textureUVs")]
    pub texture_uvs: Vec<TextureUv>,
}

impl TextureUvTable {
    /// Wraps UVs produced by an external atlas packer. Entry `i` is texture index `i`.
    pub fn new(atlas_width: u32, atlas_height: u32, texture_uvs: Vec<TextureUv>) -> Self {
        Self {
            atlas_width,
            atlas_height,
            texture_uvs,
        }
    }

    /// Lays `count` tiles of `tile_width × tile_height` pixels out row by row
    /// in a near-square grid, insetting each tile's UVs by one pixel to avoid
    /// bleeding from its neighbours.
    pub fn packed_grid(count: usize, tile_width: u32, tile_height: u32) -> Self {
        let columns = (count as f32).sqrt().ceil() as u32;
        // A full row can be dropped when the tiles fit in one fewer.
        let rows = if (columns * columns.saturating_sub(1)) as usize > count {
            columns - 1
        } else {
            columns
        };
        let atlas_width = columns * tile_width;
        let atlas_height = rows * tile_height;

        let (aw, ah) = (atlas_width as f32, atlas_height as f32);
        let (tw, th) = (tile_width as f32, tile_height as f32);
        let texture_uvs = (0..count)
            .map(|i| {
                let col = (i as u32 % columns.max(1)) as f32;
                let row = (i as u32 / columns.max(1)) as f32;
                TextureUv::rect(
                    i,
                    (col * tw + 1.0) / aw,
                    (row * th + 1.0) / ah,
                    ((col + 1.0) * tw - 1.0) / aw,
                    ((row + 1.0) * th - 1.0) / ah,
                )
            })
            .collect();

        Self {
            atlas_width,
            atlas_height,
            texture_uvs,
        }
    }

    /// Number of texture indices the table can resolve.
    pub fn len(&self) -> usize {
        self.texture_uvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texture_uvs.is_empty()
    }

    /// Looks up a texture index, failing rather than falling back.
    pub fn get(&self, index: usize) -> Result<&TextureUv, TerrainError> {
        self.texture_uvs
            .get(index)
            .ok_or(TerrainError::MissingTexture {
                index,
                available: self.texture_uvs.len(),
            })
    }
}
