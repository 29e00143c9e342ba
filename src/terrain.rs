//! Demo terrain: rolling hills over stone, sand shores and shallow seas, with ferns,
//! grass tufts and the odd torch and lava pocket.

use std::error::Error;

use voxfield_blocks::{BlockRegistry, BlockState};
use voxfield_world::{CHUNK_SIZE, CHUNK_SIZE_I32, ChunkColumn, World};

use crate::config::WorldConfig;

/// Block states the generator places.
pub struct Palette<'a> {
    pub stone: &'a BlockState,
    pub dirt: &'a BlockState,
    pub grass: &'a BlockState,
    pub sand: &'a BlockState,
    pub water: &'a BlockState,
    pub lava: &'a BlockState,
    pub fern: &'a BlockState,
    pub tall_grass: &'a BlockState,
    pub torch: &'a BlockState,
}

impl<'a> Palette<'a> {
    pub fn resolve(reg: &'a BlockRegistry) -> Result<Self, Box<dyn Error>> {
        let get = |name: &str| -> Result<&'a BlockState, Box<dyn Error>> {
            reg.id_by_name(name)
                .and_then(|id| reg.get(id))
                .ok_or_else(|| format!("terrain needs block '{name}'").into())
        };
        Ok(Self {
            stone: get("stone")?,
            dirt: get("dirt")?,
            grass: get("grass")?,
            sand: get("sand")?,
            water: get("water")?,
            lava: get("lava")?,
            fern: get("fern")?,
            tall_grass: get("tall_grass")?,
            torch: get("torch")?,
        })
    }
}

#[inline]
fn hash2(seed: u32, x: i32, z: i32) -> u32 {
    let mut h = seed ^ (x as u32).wrapping_mul(0x27d4_eb2d) ^ (z as u32).wrapping_mul(0x1656_67b1);
    h ^= h >> 15;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^ (h >> 16)
}

/// Surface height of the column at world `(x, z)`.
pub fn surface_height(cfg: &WorldConfig, x: i32, z: i32) -> i32 {
    let (fx, fz) = (x as f32, z as f32);
    let phase = (cfg.seed % 1024) as f32 * 0.37;
    let hills = (fx * 0.045 + phase).sin() * 6.0 + (fz * 0.038 - phase).cos() * 5.0;
    let ripples = ((fx + fz) * 0.11).sin() * 1.5;
    let max_y = (cfg.height_chunks * CHUNK_SIZE) as i32 - 2;
    (cfg.sea_level + hills as i32 + ripples as i32).clamp(1, max_y.max(1))
}

/// Biome tint drifting slowly across the map.
pub fn biome_color(x: i32, z: i32) -> [f32; 3] {
    let t = ((x as f32 * 0.01).sin() + (z as f32 * 0.013).cos()) * 0.25 + 0.5;
    [0.45 + 0.2 * t, 0.72 - 0.1 * t, 0.3 + 0.05 * t]
}

/// Fills one column of block data.
pub fn generate_column(
    world: &World,
    cfg: &WorldConfig,
    palette: &Palette,
    cx: i32,
    cz: i32,
) -> ChunkColumn {
    let mut col = world.new_column();
    let max_y = world.max_y();
    for lz in 0..CHUNK_SIZE {
        for lx in 0..CHUNK_SIZE {
            let x = cx * CHUNK_SIZE_I32 + lx as i32;
            let z = cz * CHUNK_SIZE_I32 + lz as i32;
            col.set_biome(lx, lz, biome_color(x, z));
            let h = surface_height(cfg, x, z);
            let shore = h <= cfg.sea_level + 1;
            for y in 0..h {
                let b = if y < h - 3 {
                    palette.stone
                } else if shore {
                    palette.sand
                } else if y == h - 1 {
                    palette.grass
                } else {
                    palette.dirt
                };
                let _ = col.set_block(lx, y, lz, b);
            }
            for y in h..=cfg.sea_level.min(max_y - 1) {
                let _ = col.set_block(lx, y, lz, palette.water);
            }
            if shore || h >= max_y {
                continue;
            }
            let r = hash2(cfg.seed, x, z);
            let decor = match r % 97 {
                0 => Some(palette.torch),
                1..=6 => Some(palette.fern),
                7..=14 => Some(palette.tall_grass),
                _ => None,
            };
            if let Some(b) = decor {
                let _ = col.set_block(lx, h, lz, b);
            }
            // rare lava pocket under the hills
            if r % 1009 == 3 && h > 8 {
                let _ = col.set_block(lx, h - 6, lz, palette.lava);
            }
        }
    }
    col
}
