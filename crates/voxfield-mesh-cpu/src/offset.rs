//! Deterministic per-block jitter for foliage-style blocks.

use voxfield_blocks::OffsetType;
use voxfield_geom::Vec3;

/// Hash of integer world coordinates. Pure, so every build of a chunk jitters its plants
/// the same way.
#[inline]
pub fn seed_for_coords(i: i32, j: i32, k: i32) -> i64 {
    let mut l = i64::from(i.wrapping_mul(3_129_871))
        ^ i64::from(k).wrapping_mul(116_129_781)
        ^ i64::from(j);
    l = l.wrapping_mul(l).wrapping_mul(42_317_861).wrapping_add(l.wrapping_mul(11));
    l >> 16
}

/// Offset within the block for a cell at world column `(wx, wz)`.
///
/// Horizontal jitter lies in `[-0.25, 0.25]`; vertical jitter (`Xyz` only) in `[-0.2, 0]`.
pub fn block_offset(kind: OffsetType, wx: i32, wz: i32) -> Vec3 {
    if kind == OffsetType::None {
        return Vec3::ZERO;
    }
    let s = seed_for_coords(wx, 0, wz);
    let nibble = |shift: u32| ((s >> shift) & 15) as f32 / 15.0;
    let ox = (nibble(0) - 0.5) * 0.5;
    let oz = (nibble(8) - 0.5) * 0.5;
    let oy = match kind {
        OffsetType::Xyz => (nibble(4) - 1.0) * 0.2,
        _ => 0.0,
    };
    Vec3::new(ox, oy, oz)
}

/// Whether collision boxes follow the visual jitter.
#[inline]
pub fn offset_moves_collider(kind: OffsetType) -> bool {
    kind == OffsetType::XzBoundingBox
}
