use std::sync::Arc;

use hashbrown::HashMap;
use voxfield_blocks::{BlockRegistry, BlockState, BlockStateId};

use crate::chunk::{CellSummary, Chunk};
use crate::column::ChunkColumn;
use crate::coords::{BlockPos, ChunkCoord};
use crate::{CHUNK_SIZE, DEFAULT_BIOME_COLOR};

/// Result of a block write that landed inside a loaded column.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SetBlockOutcome {
    pub previous: BlockStateId,
    /// Light blockage or emission changed; the surrounding light must be recalculated.
    pub relight: bool,
}

/// Sparse world of loaded chunk columns. Mutated only from the owning context.
pub struct World {
    columns: HashMap<(i32, i32), ChunkColumn>,
    height_chunks: usize,
    registry: Arc<BlockRegistry>,
}

impl World {
    pub fn new(registry: Arc<BlockRegistry>, height_chunks: usize) -> Self {
        Self {
            columns: HashMap::new(),
            height_chunks,
            registry,
        }
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    /// Swaps the block registry and refreshes every cached cell summary.
    pub fn set_registry(&mut self, registry: Arc<BlockRegistry>) {
        for col in self.columns.values_mut() {
            col.recompute_summaries(&registry);
        }
        self.registry = registry;
    }

    #[inline]
    pub fn height_chunks(&self) -> usize {
        self.height_chunks
    }

    /// Exclusive upper bound of block y.
    #[inline]
    pub fn max_y(&self) -> i32 {
        (self.height_chunks * CHUNK_SIZE) as i32
    }

    #[inline]
    pub fn new_column(&self) -> ChunkColumn {
        ChunkColumn::new(self.height_chunks)
    }

    /// Installs a column, replacing any previous data at `(cx, cz)`.
    pub fn insert_column(&mut self, cx: i32, cz: i32, mut column: ChunkColumn) {
        column.recompute_summaries(&self.registry);
        self.columns.insert((cx, cz), column);
    }

    pub fn remove_column(&mut self, cx: i32, cz: i32) -> Option<ChunkColumn> {
        self.columns.remove(&(cx, cz))
    }

    #[inline]
    pub fn is_column_loaded(&self, cx: i32, cz: i32) -> bool {
        self.columns.contains_key(&(cx, cz))
    }

    #[inline]
    pub fn column(&self, cx: i32, cz: i32) -> Option<&ChunkColumn> {
        self.columns.get(&(cx, cz))
    }

    pub fn column_keys(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.columns.keys().copied()
    }

    #[inline]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.column(coord.cx, coord.cz)?.chunk(coord.cy)
    }

    fn column_at(&self, pos: BlockPos) -> Option<(&ChunkColumn, usize, usize)> {
        let (cx, cz) = pos.column();
        let (lx, _, lz) = pos.local();
        self.column(cx, cz).map(|c| (c, lx, lz))
    }

    #[inline]
    pub fn get_block(&self, pos: BlockPos) -> BlockStateId {
        self.column_at(pos)
            .map(|(c, lx, lz)| c.get_block(lx, pos.y, lz))
            .unwrap_or(BlockStateId::AIR)
    }

    /// Registry entry for the block at `pos`; unknown ids read as air.
    #[inline]
    pub fn block_state(&self, pos: BlockPos) -> &BlockState {
        self.registry.state_or_air(self.get_block(pos))
    }

    /// Writes a block. Returns `None` when the column is not loaded or `y` is out of range.
    pub fn set_block(&mut self, pos: BlockPos, state: BlockStateId) -> Option<SetBlockOutcome> {
        let (cx, cz) = pos.column();
        let (lx, _, lz) = pos.local();
        let registry = Arc::clone(&self.registry);
        let def = registry.state_or_air(state);
        let column = self.columns.get_mut(&(cx, cz))?;
        let (previous, relight) = column.set_block(lx, pos.y, lz, def)?;
        Some(SetBlockOutcome { previous, relight })
    }

    pub fn get_biome(&self, pos: BlockPos) -> [f32; 3] {
        self.column_at(pos)
            .map(|(c, lx, lz)| c.biome(lx, lz))
            .unwrap_or(DEFAULT_BIOME_COLOR)
    }

    /// Sets the biome color of the `(x, z)` column cell. Returns false when unloaded.
    pub fn set_biome(&mut self, pos: BlockPos, rgb: [f32; 3]) -> bool {
        let (cx, cz) = pos.column();
        let (lx, _, lz) = pos.local();
        match self.columns.get_mut(&(cx, cz)) {
            Some(col) => {
                col.set_biome(lx, lz, rgb);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn get_block_light(&self, pos: BlockPos) -> u8 {
        self.column_at(pos)
            .map(|(c, lx, lz)| c.light(lx, pos.y, lz))
            .unwrap_or(0)
    }

    pub fn set_block_light(&mut self, pos: BlockPos, value: u8) {
        let (cx, cz) = pos.column();
        let (lx, _, lz) = pos.local();
        if let Some(col) = self.columns.get_mut(&(cx, cz)) {
            col.set_light(lx, pos.y, lz, value);
        }
    }

    #[inline]
    pub fn summary_at(&self, pos: BlockPos) -> CellSummary {
        self.column_at(pos)
            .map(|(c, lx, lz)| c.summary(lx, pos.y, lz))
            .unwrap_or_default()
    }

    #[inline]
    pub fn light_blockage_at(&self, pos: BlockPos) -> u8 {
        self.summary_at(pos).blockage
    }

    #[inline]
    pub fn light_emission_at(&self, pos: BlockPos) -> u8 {
        self.summary_at(pos).emission
    }

    /// True when the column of `coord` and all eight horizontal neighbors are loaded.
    pub fn neighbors_loaded(&self, coord: ChunkCoord) -> bool {
        (-1..=1).all(|dx| (-1..=1).all(|dz| self.is_column_loaded(coord.cx + dx, coord.cz + dz)))
    }
}
