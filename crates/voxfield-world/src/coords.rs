use serde::{Deserialize, Serialize};
use voxfield_geom::Vec3;

use crate::{CHUNK_SIZE, CHUNK_SIZE_I32};

/// World-space block location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    #[inline]
    pub fn chunk(self) -> ChunkCoord {
        ChunkCoord::new(
            self.x.div_euclid(CHUNK_SIZE_I32),
            self.y.div_euclid(CHUNK_SIZE_I32),
            self.z.div_euclid(CHUNK_SIZE_I32),
        )
    }

    /// Coordinates inside the owning chunk, each in `0..CHUNK_SIZE`.
    #[inline]
    pub fn local(self) -> (usize, usize, usize) {
        (
            self.x.rem_euclid(CHUNK_SIZE_I32) as usize,
            self.y.rem_euclid(CHUNK_SIZE_I32) as usize,
            self.z.rem_euclid(CHUNK_SIZE_I32) as usize,
        )
    }

    #[inline]
    pub fn column(self) -> (i32, i32) {
        (
            self.x.div_euclid(CHUNK_SIZE_I32),
            self.z.div_euclid(CHUNK_SIZE_I32),
        )
    }

    #[inline]
    pub fn sqr_distance(self, other: BlockPos) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        let dz = i64::from(self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Block containing a world-space point.
    #[inline]
    pub fn containing(p: Vec3) -> Self {
        Self::new(p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32)
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }

    #[inline]
    pub fn column(self) -> (i32, i32) {
        (self.cx, self.cz)
    }

    /// Minimum-corner block of the chunk.
    #[inline]
    pub fn origin(self) -> BlockPos {
        BlockPos::new(
            self.cx * CHUNK_SIZE_I32,
            self.cy * CHUNK_SIZE_I32,
            self.cz * CHUNK_SIZE_I32,
        )
    }

    #[inline]
    pub fn center(self) -> Vec3 {
        let half = CHUNK_SIZE as f32 * 0.5;
        self.origin().to_vec3() + Vec3::splat(half)
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}
