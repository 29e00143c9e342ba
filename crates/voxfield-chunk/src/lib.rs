//! Owned snapshot of one chunk plus a one-block halo, handed to mesh workers.
#![forbid(unsafe_code)]

use std::sync::Arc;

use voxfield_blocks::{BlockRegistry, BlockState, BlockStateId};
use voxfield_world::{BlockPos, CHUNK_SIZE, ChunkCoord, World};

/// Edge length of the padded grid: the chunk and one cell on every side.
pub const PADDED: usize = CHUNK_SIZE + 2;
pub const PADDED_VOLUME: usize = PADDED * PADDED * PADDED;

/// Padded 18³ copy of block states and light, plus 18×18 biome colors.
///
/// Padded coordinate `p` on any axis maps to chunk-local `p - 1`, so `1..=16` is the
/// chunk interior and `0` / `17` are the halo.
#[derive(Clone, Debug)]
pub struct ChunkBuildData {
    pub coord: ChunkCoord,
    registry: Arc<BlockRegistry>,
    states: Vec<BlockStateId>,
    light: Vec<u8>,
    biomes: Vec<[f32; 3]>,
}

impl ChunkBuildData {
    #[inline]
    pub fn idx(x: usize, y: usize, z: usize) -> usize {
        (y * PADDED + z) * PADDED + x
    }

    /// Assembles a snapshot from raw padded arrays. Short or long inputs are resized
    /// (air, dark, default biome) to the padded volume.
    pub fn from_parts(
        coord: ChunkCoord,
        registry: Arc<BlockRegistry>,
        mut states: Vec<BlockStateId>,
        mut light: Vec<u8>,
        mut biomes: Vec<[f32; 3]>,
    ) -> Self {
        states.resize(PADDED_VOLUME, BlockStateId::AIR);
        light.resize(PADDED_VOLUME, 0);
        biomes.resize(PADDED * PADDED, voxfield_world::DEFAULT_BIOME_COLOR);
        Self {
            coord,
            registry,
            states,
            light,
            biomes,
        }
    }

    /// Copies the chunk at `coord` and its halo out of `world`.
    /// Returns `None` when the chunk is absent or holds only air.
    pub fn gather(world: &World, coord: ChunkCoord) -> Option<Self> {
        let chunk = world.chunk(coord)?;
        if !chunk.has_blocks() {
            return None;
        }
        let origin = coord.origin();
        let mut states = vec![BlockStateId::AIR; PADDED_VOLUME];
        let mut light = vec![0u8; PADDED_VOLUME];
        let mut biomes = vec![voxfield_world::DEFAULT_BIOME_COLOR; PADDED * PADDED];
        for pz in 0..PADDED {
            for px in 0..PADDED {
                let wx = origin.x + px as i32 - 1;
                let wz = origin.z + pz as i32 - 1;
                let probe = BlockPos::new(wx, origin.y, wz);
                biomes[pz * PADDED + px] = world.get_biome(probe);
                let (cx, cz) = probe.column();
                let Some(column) = world.column(cx, cz) else {
                    continue;
                };
                let (lx, _, lz) = probe.local();
                for py in 0..PADDED {
                    let wy = origin.y + py as i32 - 1;
                    let i = Self::idx(px, py, pz);
                    states[i] = column.get_block(lx, wy, lz);
                    light[i] = column.light(lx, wy, lz);
                }
            }
        }
        Some(Self {
            coord,
            registry: Arc::clone(world.registry()),
            states,
            light,
            biomes,
        })
    }

    #[inline]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    #[inline]
    pub fn state(&self, x: usize, y: usize, z: usize) -> BlockStateId {
        self.states[Self::idx(x, y, z)]
    }

    /// Registry entry at a padded position; unknown ids read as air.
    #[inline]
    pub fn block(&self, x: usize, y: usize, z: usize) -> &BlockState {
        self.registry.state_or_air(self.state(x, y, z))
    }

    #[inline]
    pub fn light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.light[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn biome(&self, x: usize, z: usize) -> [f32; 3] {
        self.biomes[z * PADDED + x]
    }

    /// World position of a padded cell.
    #[inline]
    pub fn world_pos(&self, x: usize, y: usize, z: usize) -> BlockPos {
        self.coord
            .origin()
            .offset(x as i32 - 1, y as i32 - 1, z as i32 - 1)
    }

    pub fn has_non_air(&self) -> bool {
        (1..=CHUNK_SIZE).any(|y| {
            (1..=CHUNK_SIZE)
                .any(|z| (1..=CHUNK_SIZE).any(|x| !self.state(x, y, z).is_air()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let reg = BlockRegistry::from_toml_str(
            r#"
            [[blocks]]
            name = "stone"
        "#,
        )
        .unwrap();
        let mut w = World::new(Arc::new(reg), 2);
        for cx in -1..=1 {
            for cz in -1..=1 {
                let col = w.new_column();
                w.insert_column(cx, cz, col);
            }
        }
        w
    }

    #[test]
    fn empty_or_missing_chunks_are_not_gathered() {
        let mut w = world();
        assert!(ChunkBuildData::gather(&w, ChunkCoord::new(0, 0, 0)).is_none());
        w.set_block_light(BlockPos::new(1, 1, 1), 5);
        // a lit but empty chunk still has nothing to mesh
        assert!(ChunkBuildData::gather(&w, ChunkCoord::new(0, 0, 0)).is_none());
        assert!(ChunkBuildData::gather(&w, ChunkCoord::new(5, 0, 5)).is_none());
    }

    #[test]
    fn halo_reads_neighbor_columns() {
        let mut w = world();
        w.set_block(BlockPos::new(0, 0, 0), BlockStateId(1)).unwrap();
        w.set_block(BlockPos::new(-1, 3, 16), BlockStateId(1)).unwrap();
        w.set_block(BlockPos::new(16, 16, 5), BlockStateId(1)).unwrap();
        w.set_block_light(BlockPos::new(4, 4, -1), 12);
        let d = ChunkBuildData::gather(&w, ChunkCoord::new(0, 0, 0)).unwrap();
        assert_eq!(d.state(1, 1, 1), BlockStateId(1));
        assert_eq!(d.state(0, 4, 17), BlockStateId(1));
        assert_eq!(d.state(17, 17, 6), BlockStateId(1));
        assert_eq!(d.light(5, 5, 0), 12);
        assert_eq!(d.world_pos(0, 4, 17), BlockPos::new(-1, 3, 16));
        assert!(d.has_non_air());
    }

    #[test]
    fn below_world_reads_as_air() {
        let mut w = world();
        w.set_block(BlockPos::new(3, 0, 3), BlockStateId(1)).unwrap();
        let d = ChunkBuildData::gather(&w, ChunkCoord::new(0, 0, 0)).unwrap();
        for z in 0..PADDED {
            for x in 0..PADDED {
                assert!(d.state(x, 0, z).is_air());
            }
        }
    }
}
