//! Sparse block store: chunk columns keyed by `(x, z)`, block states, biome colors and
//! block light.
#![forbid(unsafe_code)]

mod chunk;
mod column;
mod coords;
mod world;

pub use chunk::{CellSummary, Chunk};
pub use column::ChunkColumn;
pub use coords::{BlockPos, ChunkCoord};
pub use world::{SetBlockOutcome, World};

pub const CHUNK_SIZE: usize = 16;
pub const CHUNK_SIZE_I32: i32 = CHUNK_SIZE as i32;
pub const CHUNK_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;

/// Biome color reported for unloaded columns.
pub const DEFAULT_BIOME_COLOR: [f32; 3] = [0.57, 0.74, 0.35];
