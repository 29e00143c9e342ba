//! Quad geometry supplied per block state.
//!
//! Every quad stores its corners as `[top-left, top-right, bottom-left, bottom-right]`
//! seen from the side the face points to. The mesher triangulates each quad as
//! `(0,3,2)` and `(0,1,3)`, which is clockwise from that side.

use voxfield_geom::Vec3;

use crate::types::{Face, OffsetType, RenderLayer};

/// Face groups per geometry: slot 0 is always emitted, slot `1 + face` only when the
/// face's cull flag is set.
pub const FACE_GROUPS: usize = 7;

#[derive(Clone, Debug, PartialEq)]
pub struct FaceQuad {
    /// Corners in block space, usually within `[0,1]`.
    pub pos: [Vec3; 4],
    /// `(u, v, texture layer)` per corner.
    pub uv: [[f32; 3]; 4],
    /// Animation parameters passed through to the vertex stream untouched.
    pub uv_anim: [f32; 4],
    /// `>= 0` takes the block color, negative stays white.
    pub tint_index: i32,
}

impl FaceQuad {
    /// Full unit-cube face with the texture spanning the whole quad.
    pub fn unit(face: Face, texture: u16, rotation: u16, tint_index: i32) -> FaceQuad {
        let uv2 = rotate_uvs(FULL_UVS, rotation);
        FaceQuad {
            pos: face_corners(face),
            uv: with_layer(uv2, texture),
            uv_anim: [0.0; 4],
            tint_index,
        }
    }

    #[inline]
    pub fn tinted(&self) -> bool {
        self.tint_index >= 0
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockGeometry {
    groups: [Vec<FaceQuad>; FACE_GROUPS],
}

impl BlockGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quad; `cull == None` puts it in the always-emitted group.
    pub fn push(&mut self, cull: Option<Face>, quad: FaceQuad) {
        self.groups[group_index(cull)].push(quad);
    }

    #[inline]
    pub fn group(&self, cull: Option<Face>) -> &[FaceQuad] {
        &self.groups[group_index(cull)]
    }

    /// Quads emitted for the given cull flags.
    pub fn quad_count(&self, cull_flags: u8) -> usize {
        let mut n = self.groups[0].len();
        for face in Face::ALL {
            if cull_flags & face.bit() != 0 {
                n += self.groups[1 + face.index()].len();
            }
        }
        n
    }

    /// Visits emitted quads in group order: always-group first, then faces in `Face::ALL` order.
    pub fn for_each_visible(&self, cull_flags: u8, mut f: impl FnMut(Option<Face>, &FaceQuad)) {
        for q in &self.groups[0] {
            f(None, q);
        }
        for face in Face::ALL {
            if cull_flags & face.bit() == 0 {
                continue;
            }
            for q in &self.groups[1 + face.index()] {
                f(Some(face), q);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.is_empty())
    }

    pub fn set_uv_anim(&mut self, anim: [f32; 4]) {
        for q in self.groups.iter_mut().flatten() {
            q.uv_anim = anim;
        }
    }
}

#[inline]
fn group_index(cull: Option<Face>) -> usize {
    match cull {
        None => 0,
        Some(f) => 1 + f.index(),
    }
}

/// Render-facing description of one block state.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockModel {
    pub layer: RenderLayer,
    pub offset: OffsetType,
    pub variants: Vec<BlockGeometry>,
}

impl BlockModel {
    /// Deterministic variant pick for a cell.
    #[inline]
    pub fn variant_for(&self, x: usize, y: usize, z: usize) -> Option<&BlockGeometry> {
        if self.variants.is_empty() {
            return None;
        }
        self.variants.get((x + y + z) % self.variants.len())
    }
}

const FULL_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Unit-cube corners for `face`, ordered top-left, top-right, bottom-left, bottom-right.
pub fn face_corners(face: Face) -> [Vec3; 4] {
    let v = Vec3::new;
    match face {
        Face::PosY => [v(0., 1., 0.), v(1., 1., 0.), v(0., 1., 1.), v(1., 1., 1.)],
        Face::NegY => [v(0., 0., 1.), v(1., 0., 1.), v(0., 0., 0.), v(1., 0., 0.)],
        Face::PosX => [v(1., 1., 1.), v(1., 1., 0.), v(1., 0., 1.), v(1., 0., 0.)],
        Face::NegX => [v(0., 1., 0.), v(0., 1., 1.), v(0., 0., 0.), v(0., 0., 1.)],
        Face::PosZ => [v(0., 1., 1.), v(1., 1., 1.), v(0., 0., 1.), v(1., 0., 1.)],
        Face::NegZ => [v(1., 1., 0.), v(0., 1., 0.), v(1., 0., 0.), v(0., 0., 0.)],
    }
}

/// Rotates texture coordinates about the quad center. Only multiples of 90 are meaningful;
/// other values are rounded down to the previous quarter turn.
pub fn rotate_uvs(uvs: [[f32; 2]; 4], degrees: u16) -> [[f32; 2]; 4] {
    let turns = (degrees / 90) % 4;
    let mut out = uvs;
    for _ in 0..turns {
        for uv in &mut out {
            let (u, v) = (uv[0], uv[1]);
            *uv = [1.0 - v, u];
        }
    }
    out
}

fn with_layer(uvs: [[f32; 2]; 4], layer: u16) -> [[f32; 3]; 4] {
    uvs.map(|[u, v]| [u, v, layer as f32])
}

/// Textures per face in `Face::ALL` order.
pub type FaceTextures = [u16; 6];

pub fn cube(textures: FaceTextures, rotation: u16, tint_index: i32) -> BlockGeometry {
    let mut g = BlockGeometry::new();
    for face in Face::ALL {
        g.push(
            Some(face),
            FaceQuad::unit(face, textures[face.index()], rotation, tint_index),
        );
    }
    g
}

/// Bottom half slab. The top face sits inside the cell and is never culled.
pub fn slab(textures: FaceTextures, rotation: u16, tint_index: i32) -> BlockGeometry {
    let mut g = BlockGeometry::new();
    for face in Face::ALL {
        let mut q = FaceQuad::unit(face, textures[face.index()], rotation, tint_index);
        for p in &mut q.pos {
            p.y *= 0.5;
        }
        match face {
            Face::PosY => g.push(None, q),
            Face::NegY => g.push(Some(face), q),
            _ => {
                for uv in &mut q.uv {
                    uv[1] *= 0.5;
                }
                g.push(Some(face), q);
            }
        }
    }
    g
}

/// Two crossed diagonal planes, double sided, never culled.
pub fn cross(texture: u16, tint_index: i32) -> BlockGeometry {
    let v = Vec3::new;
    let planes = [
        [v(0., 1., 0.), v(1., 1., 1.), v(0., 0., 0.), v(1., 0., 1.)],
        [v(0., 1., 1.), v(1., 1., 0.), v(0., 0., 1.), v(1., 0., 0.)],
    ];
    let uv = with_layer(FULL_UVS, texture);
    let mut g = BlockGeometry::new();
    for [tl, tr, bl, br] in planes {
        g.push(
            None,
            FaceQuad {
                pos: [tl, tr, bl, br],
                uv,
                uv_anim: [0.0; 4],
                tint_index,
            },
        );
        g.push(
            None,
            FaceQuad {
                pos: [tr, tl, br, bl],
                uv: [uv[1], uv[0], uv[3], uv[2]],
                uv_anim: [0.0; 4],
                tint_index,
            },
        );
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_of(q: [Vec3; 4]) -> Vec3 {
        // (TL->BL) x (TL->TR) points out of a clockwise-from-outside quad.
        let a = q[2] - q[0];
        let b = q[1] - q[0];
        Vec3::new(
            a.y * b.z - a.z * b.y,
            a.z * b.x - a.x * b.z,
            a.x * b.y - a.y * b.x,
        )
    }

    #[test]
    fn face_corners_point_outward() {
        for face in Face::ALL {
            let n = normal_of(face_corners(face));
            assert!(n.dot(face.normal()) > 0.0, "{face:?} winds inward");
        }
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        let once = rotate_uvs(FULL_UVS, 90);
        assert_ne!(once, FULL_UVS);
        assert_eq!(rotate_uvs(FULL_UVS, 360), FULL_UVS);
        assert_eq!(rotate_uvs(rotate_uvs(FULL_UVS, 180), 180), FULL_UVS);
    }

    #[test]
    fn quad_count_respects_cull_flags() {
        let g = cube([0; 6], 0, -1);
        assert_eq!(g.quad_count(0), 0);
        assert_eq!(g.quad_count(0b11_1111), 6);
        assert_eq!(g.quad_count(Face::PosY.bit() | Face::NegZ.bit()), 2);
        let s = slab([0; 6], 0, -1);
        assert_eq!(s.quad_count(0), 1);
        assert_eq!(cross(3, 0).quad_count(0), 4);
    }
}
