use voxfield_blocks::{BlockRegistry, BlockState, BlockStateId};

use crate::chunk::{CellSummary, Chunk};
use crate::{CHUNK_SIZE, DEFAULT_BIOME_COLOR};

/// Vertical stack of optional chunks for one `(x, z)` column plus its biome colors.
#[derive(Clone, Debug)]
pub struct ChunkColumn {
    chunks: Vec<Option<Box<Chunk>>>,
    biomes: Vec<[f32; 3]>,
}

impl ChunkColumn {
    pub fn new(height_chunks: usize) -> Self {
        Self {
            chunks: (0..height_chunks).map(|_| None).collect(),
            biomes: vec![DEFAULT_BIOME_COLOR; CHUNK_SIZE * CHUNK_SIZE],
        }
    }

    #[inline]
    pub fn height_chunks(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn chunk(&self, cy: i32) -> Option<&Chunk> {
        let i = usize::try_from(cy).ok()?;
        self.chunks.get(i)?.as_deref()
    }

    /// Indices of chunks that contain at least one non-air block.
    pub fn non_empty_chunks(&self) -> impl Iterator<Item = i32> + '_ {
        self.chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_ref().is_some_and(|c| c.has_blocks()))
            .map(|(i, _)| i as i32)
    }

    #[inline]
    pub fn biome(&self, lx: usize, lz: usize) -> [f32; 3] {
        self.biomes[lz * CHUNK_SIZE + lx]
    }

    pub fn set_biome(&mut self, lx: usize, lz: usize, rgb: [f32; 3]) {
        self.biomes[lz * CHUNK_SIZE + lx] = rgb;
    }

    pub fn get_block(&self, lx: usize, y: i32, lz: usize) -> BlockStateId {
        let cy = y.div_euclid(CHUNK_SIZE as i32);
        let ly = y.rem_euclid(CHUNK_SIZE as i32) as usize;
        self.chunk(cy)
            .map(|c| c.get(lx, ly, lz))
            .unwrap_or(BlockStateId::AIR)
    }

    /// Stores a block, creating or dropping the owning chunk as needed.
    /// Returns the previous state and whether light must be recalculated, or `None`
    /// when `y` is outside the column.
    pub fn set_block(
        &mut self,
        lx: usize,
        y: i32,
        lz: usize,
        state: &BlockState,
    ) -> Option<(BlockStateId, bool)> {
        let cy = usize::try_from(y.div_euclid(CHUNK_SIZE as i32)).ok()?;
        let ly = y.rem_euclid(CHUNK_SIZE as i32) as usize;
        let slot = self.chunks.get_mut(cy)?;
        if slot.is_none() {
            if state.id.is_air() {
                return Some((BlockStateId::AIR, false));
            }
            *slot = Some(Box::new(Chunk::new()));
        }
        let chunk = slot.as_deref_mut()?;
        let prev = chunk.set(lx, ly, lz, state.id);
        let relight = Self::update_cached_block_data(chunk, lx, ly, lz, state);
        if chunk.is_vacant() {
            *slot = None;
        }
        Some((prev, relight))
    }

    /// Refreshes the cached summary of one cell. Returns true when the change in light
    /// blockage or emission requires a light recalculation around the cell.
    pub fn update_cached_block_data(
        chunk: &mut Chunk,
        lx: usize,
        ly: usize,
        lz: usize,
        state: &BlockState,
    ) -> bool {
        let before = chunk.summary(lx, ly, lz);
        let after = CellSummary::of(state);
        chunk.set_summary(lx, ly, lz, after);
        before.blockage != after.blockage || before.emission != after.emission
    }

    pub fn light(&self, lx: usize, y: i32, lz: usize) -> u8 {
        let cy = y.div_euclid(CHUNK_SIZE as i32);
        let ly = y.rem_euclid(CHUNK_SIZE as i32) as usize;
        self.chunk(cy).map(|c| c.light(lx, ly, lz)).unwrap_or(0)
    }

    pub fn set_light(&mut self, lx: usize, y: i32, lz: usize, value: u8) {
        let Ok(cy) = usize::try_from(y.div_euclid(CHUNK_SIZE as i32)) else {
            return;
        };
        let ly = y.rem_euclid(CHUNK_SIZE as i32) as usize;
        let Some(slot) = self.chunks.get_mut(cy) else {
            return;
        };
        if slot.is_none() {
            if value == 0 {
                return;
            }
            *slot = Some(Box::new(Chunk::new()));
        }
        if let Some(chunk) = slot.as_deref_mut() {
            chunk.set_light(lx, ly, lz, value);
            if chunk.is_vacant() {
                *slot = None;
            }
        }
    }

    pub fn summary(&self, lx: usize, y: i32, lz: usize) -> CellSummary {
        let cy = y.div_euclid(CHUNK_SIZE as i32);
        let ly = y.rem_euclid(CHUNK_SIZE as i32) as usize;
        self.chunk(cy)
            .map(|c| c.summary(lx, ly, lz))
            .unwrap_or_default()
    }

    /// Rebuilds every cached summary against `registry`.
    pub fn recompute_summaries(&mut self, registry: &BlockRegistry) {
        for chunk in self.chunks.iter_mut().flatten() {
            for y in 0..CHUNK_SIZE {
                for z in 0..CHUNK_SIZE {
                    for x in 0..CHUNK_SIZE {
                        let state = registry.state_or_air(chunk.get(x, y, z));
                        chunk.set_summary(x, y, z, CellSummary::of(state));
                    }
                }
            }
        }
    }
}
