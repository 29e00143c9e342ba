//! Block light recalculation over a 3×3×3-chunk box.
//!
//! Light is rebuilt from emission alone: every cell starts at its own emission level and a
//! breadth-first flood lowers the value by `1 + blockage` per step. A source at level 15
//! reaches at most 14 cells, so the center chunk of a 48³ box sees every source that can
//! touch it and its result is exact. Only that center chunk is written back.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use voxfield_blocks::registry::MAX_LIGHT;
use voxfield_world::{BlockPos, CHUNK_SIZE, ChunkCoord, World};

pub const LIGHT_BOX_SIZE: usize = 3 * CHUNK_SIZE;
/// Margin around the written-back interior.
pub const MAX_SPREAD: usize = CHUNK_SIZE;
const BOX_VOLUME: usize = LIGHT_BOX_SIZE * LIGHT_BOX_SIZE * LIGHT_BOX_SIZE;

/// Scratch grids for one recalculation: per-cell blockage and light.
#[derive(Clone, Debug)]
pub struct LightBox {
    center: ChunkCoord,
    origin: BlockPos,
    blockage: Vec<u8>,
    light: Vec<u8>,
}

impl LightBox {
    #[inline]
    pub fn idx(x: usize, y: usize, z: usize) -> usize {
        (y * LIGHT_BOX_SIZE + z) * LIGHT_BOX_SIZE + x
    }

    /// Reads blockage and emission for the box centered on `center`. Unloaded cells read
    /// as transparent and dark.
    pub fn gather(world: &World, center: ChunkCoord) -> Self {
        let origin = center.offset(-1, -1, -1).origin();
        let mut blockage = vec![0u8; BOX_VOLUME];
        let mut light = vec![0u8; BOX_VOLUME];
        for z in 0..LIGHT_BOX_SIZE {
            for x in 0..LIGHT_BOX_SIZE {
                let probe = origin.offset(x as i32, 0, z as i32);
                let (cx, cz) = probe.column();
                let Some(column) = world.column(cx, cz) else {
                    continue;
                };
                let (lx, _, lz) = probe.local();
                for y in 0..LIGHT_BOX_SIZE {
                    let s = column.summary(lx, origin.y + y as i32, lz);
                    let i = Self::idx(x, y, z);
                    blockage[i] = s.blockage;
                    light[i] = s.emission;
                }
            }
        }
        Self {
            center,
            origin,
            blockage,
            light,
        }
    }

    /// Box built from raw grids; `emission` seeds the light values. Short inputs are
    /// padded with zeros.
    pub fn from_parts(center: ChunkCoord, mut blockage: Vec<u8>, mut emission: Vec<u8>) -> Self {
        blockage.resize(BOX_VOLUME, 0);
        emission.resize(BOX_VOLUME, 0);
        Self {
            center,
            origin: center.offset(-1, -1, -1).origin(),
            blockage,
            light: emission,
        }
    }

    #[inline]
    pub fn center(&self) -> ChunkCoord {
        self.center
    }

    #[inline]
    pub fn origin(&self) -> BlockPos {
        self.origin
    }

    #[inline]
    pub fn light(&self, x: usize, y: usize, z: usize) -> u8 {
        self.light[Self::idx(x, y, z)]
    }

    #[inline]
    pub fn blockage(&self, x: usize, y: usize, z: usize) -> u8 {
        self.blockage[Self::idx(x, y, z)]
    }

    pub fn light_values(&self) -> &[u8] {
        &self.light
    }

    /// Floods light outward from every cell at level 2 or more. Values only increase, so
    /// running it again on its own output changes nothing.
    pub fn propagate(&mut self) {
        let n = LIGHT_BOX_SIZE;
        let mut q: VecDeque<(usize, usize, usize)> = VecDeque::new();
        for y in 0..n {
            for z in 0..n {
                for x in 0..n {
                    if self.light[Self::idx(x, y, z)] > 1 {
                        q.push_back((x, y, z));
                    }
                }
            }
        }
        while let Some((x, y, z)) = q.pop_front() {
            let spread = i32::from(self.light[Self::idx(x, y, z)]) - 1;
            let mut try_push = |nx: usize, ny: usize, nz: usize| {
                let i = Self::idx(nx, ny, nz);
                let v = (spread - i32::from(self.blockage[i])).max(0) as u8;
                if v > self.light[i] {
                    self.light[i] = v;
                    if v > 1 {
                        q.push_back((nx, ny, nz));
                    }
                }
            };
            if x > 0 {
                try_push(x - 1, y, z);
            }
            if x < n - 1 {
                try_push(x + 1, y, z);
            }
            if y > 0 {
                try_push(x, y - 1, z);
            }
            if y < n - 1 {
                try_push(x, y + 1, z);
            }
            if z > 0 {
                try_push(x, y, z - 1);
            }
            if z < n - 1 {
                try_push(x, y, z + 1);
            }
        }
    }

    /// Stores the center chunk's light into `world` and reports what changed.
    pub fn write_back(&self, world: &mut World) -> LightWriteback {
        let mut out = LightWriteback::default();
        for ly in 0..CHUNK_SIZE {
            for lz in 0..CHUNK_SIZE {
                for lx in 0..CHUNK_SIZE {
                    let v = self.light(lx + MAX_SPREAD, ly + MAX_SPREAD, lz + MAX_SPREAD);
                    let pos = self.origin.offset(
                        (lx + MAX_SPREAD) as i32,
                        (ly + MAX_SPREAD) as i32,
                        (lz + MAX_SPREAD) as i32,
                    );
                    if world.get_block_light(pos) == v {
                        continue;
                    }
                    world.set_block_light(pos, v);
                    out.changed += 1;
                    out.neighbor_mask |= border_neighbors((lx, ly, lz));
                }
            }
        }
        out
    }
}

/// Outcome of a write-back.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LightWriteback {
    pub changed: usize,
    /// Neighbor chunks whose halo holds a changed cell, as bits of [`neighbor_bit`].
    pub neighbor_mask: u32,
}

impl LightWriteback {
    /// Offsets of neighbor chunks that must be remeshed.
    pub fn dirty_neighbors(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let mask = self.neighbor_mask;
        neighbor_offsets().filter(move |&(dx, dy, dz)| mask & neighbor_bit(dx, dy, dz) != 0)
    }
}

/// Bit for neighbor offset `(dx, dy, dz)`, each in `-1..=1`.
#[inline]
pub fn neighbor_bit(dx: i32, dy: i32, dz: i32) -> u32 {
    1 << ((dy + 1) * 9 + (dz + 1) * 3 + (dx + 1))
}

fn neighbor_offsets() -> impl Iterator<Item = (i32, i32, i32)> {
    (-1..=1).flat_map(|dy| (-1..=1).flat_map(move |dz| (-1..=1).map(move |dx| (dx, dy, dz))))
}

fn sides(l: usize) -> impl Iterator<Item = i32> {
    let lo = (l == 0).then_some(-1);
    let hi = (l == CHUNK_SIZE - 1).then_some(1);
    [Some(0), lo, hi].into_iter().flatten()
}

/// Neighbors (face, edge and corner) whose 1-cell halo contains local cell `l`.
fn border_neighbors((lx, ly, lz): (usize, usize, usize)) -> u32 {
    let mut mask = 0;
    for dy in sides(ly) {
        for dz in sides(lz) {
            for dx in sides(lx) {
                if (dx, dy, dz) != (0, 0, 0) {
                    mask |= neighbor_bit(dx, dy, dz);
                }
            }
        }
    }
    mask
}

/// Recomputes light for the box centered on `center`.
pub fn recalculate_light(world: &World, center: ChunkCoord) -> LightBox {
    let mut b = LightBox::gather(world, center);
    b.propagate();
    b
}

/// Chunk offsets (self included) whose light an edit at chunk-local `(px, py, pz)` can
/// reach: light at most 15 travels at most 14 Manhattan steps into a neighbor.
pub fn affected_chunks((px, py, pz): (usize, usize, usize)) -> Vec<(i32, i32, i32)> {
    let reach = i32::from(MAX_LIGHT) - 1;
    let step = |l: usize, d: i32| -> i32 {
        match d {
            -1 => l as i32 + 1,
            1 => CHUNK_SIZE as i32 - l as i32,
            _ => 0,
        }
    };
    neighbor_offsets()
        .filter(|&(dx, dy, dz)| step(px, dx) + step(py, dy) + step(pz, dz) <= reach)
        .collect()
}

#[cfg(test)]
mod tests;
