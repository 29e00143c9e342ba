//! Per-block neighborhood sampling: corner lights and ambient-occlusion masks.

use voxfield_blocks::Face;
use voxfield_chunk::ChunkBuildData;
use voxfield_geom::Vec3;

use crate::constants::{CORNER_SAMPLES, MAX_LIGHT_F};

/// Light at the 8 cube corners, each in `[0, 15]`. Corner `c` has bit 0 set for `+x`,
/// bit 1 for `+z` and bit 2 for `+y`.
pub type CornerLights = [f32; 8];

/// Averages the 2×2×2 cells around each corner of the block at padded `(x, y, z)`.
/// The caller guarantees `1..=16` on every axis.
pub fn corner_lights(data: &ChunkBuildData, x: usize, y: usize, z: usize) -> CornerLights {
    let mut out = [0.0f32; 8];
    for oy in 0..3 {
        for oz in 0..3 {
            for ox in 0..3 {
                let sample = f32::from(data.light(x + ox - 1, y + oy - 1, z + oz - 1));
                for (c, acc) in out.iter_mut().enumerate() {
                    let hi_x = c & 1 != 0;
                    let hi_z = c & 2 != 0;
                    let hi_y = c & 4 != 0;
                    if on_side(ox, hi_x) && on_side(oy, hi_y) && on_side(oz, hi_z) {
                        *acc += sample;
                    }
                }
            }
        }
    }
    out.map(|v| v / CORNER_SAMPLES)
}

#[inline]
fn on_side(o: usize, hi: bool) -> bool {
    if hi { o != 0 } else { o != 2 }
}

/// Trilinear light at a point in block space, normalized to `[0, 1]` and squared.
pub fn vertex_light(p: Vec3, lights: &CornerLights) -> f32 {
    let (fx, fy, fz) = (p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0), p.z.clamp(0.0, 1.0));
    let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
    let x0z0 = lerp(lights[0], lights[4], fy);
    let x1z0 = lerp(lights[1], lights[5], fy);
    let x0z1 = lerp(lights[2], lights[6], fy);
    let x1z1 = lerp(lights[3], lights[7], fy);
    let v = lerp(lerp(x0z0, x0z1, fz), lerp(x1z0, x1z1, fz), fx) / MAX_LIGHT_F;
    v * v
}

/// Bit for neighbor offset `(dx, dy, dz)` in a 27-cell AO mask.
#[inline]
pub fn ao_bit(dx: i32, dy: i32, dz: i32) -> u32 {
    1 << ((dy + 1) * 9 + (dz + 1) * 3 + (dx + 1))
}

/// Marks which of the 27 cells around padded `(x, y, z)` cast ambient occlusion.
pub fn ao_mask(data: &ChunkBuildData, x: usize, y: usize, z: usize) -> u32 {
    let mut mask = 0;
    for dy in -1..=1 {
        for dz in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny, nz) = (
                    (x as i32 + dx) as usize,
                    (y as i32 + dy) as usize,
                    (z as i32 + dz) as usize,
                );
                if data.block(nx, ny, nz).ao_solid {
                    mask |= ao_bit(dx, dy, dz);
                }
            }
        }
    }
    mask
}

/// Tangent axes `(u, v)` spanning a face, as indices into `[x, y, z]`.
#[inline]
fn tangents(face: Face) -> (usize, usize) {
    match face {
        Face::PosY | Face::NegY => (0, 2),
        Face::PosX | Face::NegX => (2, 1),
        Face::PosZ | Face::NegZ => (0, 1),
    }
}

/// Corner AO factors of one face, indexed `[u side][v side]`, where side 0 is the low
/// end of the tangent axis. Each occluding side or corner cell in the layer the face
/// looks into removes `intensity`.
pub fn face_corner_ao(face: Face, mask: u32, intensity: f32) -> [[f32; 2]; 2] {
    let (nx, ny, nz) = face.delta();
    let (ua, va) = tangents(face);
    let solid = |su: i32, sv: i32| -> f32 {
        let mut d = [nx, ny, nz];
        d[ua] += su;
        d[va] += sv;
        if mask & ao_bit(d[0], d[1], d[2]) != 0 { 1.0 } else { 0.0 }
    };
    let mut out = [[1.0f32; 2]; 2];
    for (cu, row) in out.iter_mut().enumerate() {
        for (cv, ao) in row.iter_mut().enumerate() {
            let su = if cu == 0 { -1 } else { 1 };
            let sv = if cv == 0 { -1 } else { 1 };
            let hits = solid(su, 0) + solid(0, sv) + solid(su, sv);
            *ao = 1.0 - intensity * hits;
        }
    }
    out
}

/// Bilinear AO at a point in block space on `face`.
pub fn vertex_ao(face: Face, corners: &[[f32; 2]; 2], p: Vec3) -> f32 {
    let (ua, va) = tangents(face);
    let a = p.to_array();
    let (fu, fv) = (a[ua].clamp(0.0, 1.0), a[va].clamp(0.0, 1.0));
    let lo = corners[0][0] + (corners[0][1] - corners[0][0]) * fv;
    let hi = corners[1][0] + (corners[1][1] - corners[1][0]) * fv;
    lo + (hi - lo) * fu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_light_maps_to_one() {
        let lights = [15.0; 8];
        assert!((vertex_light(Vec3::new(0.3, 0.9, 0.1), &lights) - 1.0).abs() < 1e-6);
        assert_eq!(vertex_light(Vec3::ZERO, &[0.0; 8]), 0.0);
    }

    #[test]
    fn vertex_light_hits_corners_exactly() {
        let mut lights = [0.0; 8];
        lights[5] = 15.0; // +x, +y, low z
        assert!((vertex_light(Vec3::new(1.0, 1.0, 0.0), &lights) - 1.0).abs() < 1e-6);
        assert_eq!(vertex_light(Vec3::new(0.0, 1.0, 0.0), &lights), 0.0);
        let mid = vertex_light(Vec3::new(1.0, 0.5, 0.0), &lights);
        assert!((mid - 0.25).abs() < 1e-6);
    }

    #[test]
    fn open_faces_have_no_ao() {
        for face in Face::ALL {
            let c = face_corner_ao(face, 0, 0.2);
            assert_eq!(c, [[1.0; 2]; 2]);
            assert_eq!(vertex_ao(face, &c, Vec3::splat(0.5)), 1.0);
        }
    }

    #[test]
    fn one_edge_darkens_its_two_corners() {
        // solid cell above the block, one step toward -x
        let mask = ao_bit(-1, 1, 0);
        let c = face_corner_ao(Face::PosY, mask, 0.2);
        assert!((c[0][0] - 0.8).abs() < 1e-6 && (c[0][1] - 0.8).abs() < 1e-6);
        assert_eq!(c[1], [1.0, 1.0]);
        let at_low_x = vertex_ao(Face::PosY, &c, Vec3::new(0.0, 1.0, 0.5));
        assert!((at_low_x - 0.8).abs() < 1e-6);
        // the same cell sits behind the +x face, so it has no say there
        assert_eq!(face_corner_ao(Face::PosX, mask, 0.2), [[1.0; 2]; 2]);
    }

    #[test]
    fn a_buried_corner_takes_all_three_hits() {
        let mask = ao_bit(1, 1, 0) | ao_bit(0, 1, 1) | ao_bit(1, 1, 1);
        let c = face_corner_ao(Face::PosY, mask, 0.2);
        assert!((c[1][1] - 0.4).abs() < 1e-6);
        assert!((c[0][0] - 1.0).abs() < 1e-6);
    }
}
