use voxfield_blocks::{BlockState, Face, LiquidKind};
use voxfield_chunk::ChunkBuildData;

/// Rule deciding whether a face shows against the neighbor it touches.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NeighborCheck {
    /// Visible unless the neighbor is a full solid block.
    NonFullSolid,
    /// Like `NonFullSolid`, and also hidden against blocks of the same group (glass, ice).
    Group(u16),
    /// Liquid surface: hidden against the same liquid or a full solid block.
    Liquid(LiquidKind),
}

impl NeighborCheck {
    /// Rule for the solid geometry of `state`.
    #[inline]
    pub fn for_block(state: &BlockState) -> Self {
        match state.cull_group {
            Some(g) => NeighborCheck::Group(g),
            None => NeighborCheck::NonFullSolid,
        }
    }

    #[inline]
    pub fn shows_against(self, neighbor: &BlockState) -> bool {
        if neighbor.full_solid {
            return false;
        }
        match self {
            NeighborCheck::NonFullSolid => true,
            NeighborCheck::Group(g) => neighbor.cull_group != Some(g),
            NeighborCheck::Liquid(kind) => neighbor.liquid != Some(kind),
        }
    }
}

/// Visible-face flags (bits of [`Face::bit`]) for the cell at padded `(x, y, z)`.
pub fn cull_flags(data: &ChunkBuildData, x: usize, y: usize, z: usize, check: NeighborCheck) -> u8 {
    let mut flags = 0u8;
    for face in Face::ALL {
        let (dx, dy, dz) = face.delta();
        let nb = data.block(
            (x as i32 + dx) as usize,
            (y as i32 + dy) as usize,
            (z as i32 + dz) as usize,
        );
        if check.shows_against(nb) {
            flags |= face.bit();
        }
    }
    flags
}
