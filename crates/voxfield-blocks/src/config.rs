//! Serde mirror of `blocks.toml`.

use std::collections::HashMap;

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlocksConfig {
    /// Render layer name -> material key.
    #[serde(default)]
    pub layers: HashMap<String, String>,
    #[serde(default)]
    pub liquids: LiquidsConfig,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LiquidsConfig {
    #[serde(default)]
    pub water_texture: u16,
    #[serde(default)]
    pub lava_texture: u16,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlockDef {
    pub name: String,
    /// `cube` (default), `slab`, `cross`, `liquid`, `custom`.
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub texture: Option<u16>,
    #[serde(default)]
    pub textures: Option<FaceTexturesDef>,
    #[serde(default)]
    pub rotations: Option<Vec<u16>>,
    /// Tinted faces take the block color.
    #[serde(default)]
    pub tint: Option<bool>,
    #[serde(default)]
    pub color: Option<ColorDef>,
    #[serde(default)]
    pub full_solid: Option<bool>,
    #[serde(default)]
    pub collidable: Option<bool>,
    #[serde(default)]
    pub ao_solid: Option<bool>,
    #[serde(default)]
    pub liquid: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub cull_group: Option<String>,
    #[serde(default)]
    pub light_blockage: Option<u8>,
    #[serde(default)]
    pub light_emission: Option<u8>,
    #[serde(default)]
    pub uv_anim: Option<[f32; 4]>,
    #[serde(default)]
    pub faces: Vec<FaceDef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FaceTexturesDef {
    pub all: Option<u16>,
    pub top: Option<u16>,
    pub bottom: Option<u16>,
    pub side: Option<u16>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ColorDef {
    // color = "biome" | "white"
    Named(String),
    // color = [0.4, 0.8, 0.3]
    Rgb([f32; 3]),
}

/// Explicit quad for `shape = "custom"`.
#[derive(Clone, Debug, Deserialize)]
pub struct FaceDef {
    /// Face name that culls this quad, or `none`.
    #[serde(default = "default_cull")]
    pub cull: String,
    pub pos: [[f32; 3]; 4],
    #[serde(default = "default_face_uv")]
    pub uv: [[f32; 2]; 4],
    #[serde(default)]
    pub texture: u16,
    #[serde(default = "default_tint_index")]
    pub tint: i32,
}

fn default_cull() -> String {
    "none".to_string()
}

fn default_face_uv() -> [[f32; 2]; 4] {
    [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]]
}

fn default_tint_index() -> i32 {
    -1
}
