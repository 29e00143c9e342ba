use voxfield_blocks::{BlockState, BlockStateId};

use crate::{CHUNK_SIZE, CHUNK_VOLUME};

/// Cached per-cell facts the lighting solver and AO sampler read without a registry lookup.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CellSummary {
    pub blockage: u8,
    pub emission: u8,
    pub ao_solid: bool,
}

impl CellSummary {
    pub fn of(state: &BlockState) -> Self {
        Self {
            blockage: state.light_blockage,
            emission: state.light_emission,
            ao_solid: state.ao_solid,
        }
    }
}

/// Dense 16³ block storage with block light and cached summaries.
#[derive(Clone, Debug)]
pub struct Chunk {
    states: Vec<BlockStateId>,
    light: Vec<u8>,
    summary: Vec<CellSummary>,
    non_air: u16,
    lit: u16,
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            states: vec![BlockStateId::AIR; CHUNK_VOLUME],
            light: vec![0; CHUNK_VOLUME],
            summary: vec![CellSummary::default(); CHUNK_VOLUME],
            non_air: 0,
            lit: 0,
        }
    }

    #[inline]
    pub fn idx(x: usize, y: usize, z: usize) -> usize {
        (y * CHUNK_SIZE + z) * CHUNK_SIZE + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockStateId {
        self.states[Self::idx(x, y, z)]
    }

    /// Stores `state` and returns the previous one. Summaries are left to the caller.
    pub fn set(&mut self, x: usize, y: usize, z: usize, state: BlockStateId) -> BlockStateId {
        let i = Self::idx(x, y, z);
        let prev = std::mem::replace(&mut self.states[i], state);
        match (prev.is_air(), state.is_air()) {
            (true, false) => self.non_air += 1,
            (false, true) => self.non_air -= 1,
            _ => {}
        }
        prev
    }

    #[inline]
    pub fn light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.light[Self::idx(x, y, z)]
    }

    pub fn set_light(&mut self, x: usize, y: usize, z: usize, value: u8) {
        let i = Self::idx(x, y, z);
        let prev = std::mem::replace(&mut self.light[i], value);
        match (prev == 0, value == 0) {
            (true, false) => self.lit += 1,
            (false, true) => self.lit -= 1,
            _ => {}
        }
    }

    #[inline]
    pub fn summary(&self, x: usize, y: usize, z: usize) -> CellSummary {
        self.summary[Self::idx(x, y, z)]
    }

    #[inline]
    pub(crate) fn set_summary(&mut self, x: usize, y: usize, z: usize, s: CellSummary) {
        self.summary[Self::idx(x, y, z)] = s;
    }

    #[inline]
    pub fn non_air_count(&self) -> usize {
        self.non_air as usize
    }

    #[inline]
    pub fn has_blocks(&self) -> bool {
        self.non_air > 0
    }

    /// True when the chunk holds neither blocks nor light and can be dropped.
    #[inline]
    pub fn is_vacant(&self) -> bool {
        self.non_air == 0 && self.lit == 0
    }

    #[inline]
    pub fn has_light(&self) -> bool {
        self.lit > 0
    }

    /// True when any cell emits light.
    pub fn has_emitters(&self) -> bool {
        self.non_air > 0 && self.summary.iter().any(|s| s.emission > 0)
    }

    pub fn states(&self) -> &[BlockStateId] {
        &self.states
    }
}
