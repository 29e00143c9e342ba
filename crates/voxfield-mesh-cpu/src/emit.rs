use voxfield_blocks::geometry::face_corners;
use voxfield_blocks::{BlockColor, BlockGeometry, Face};
use voxfield_geom::Vec3;

use crate::constants::{FULL_UVS, LIQUID_INSET, LIQUID_SURFACE};
use crate::mesh_build::{ColliderBuild, MeshBuild};
use crate::sample::{CornerLights, face_corner_ao, vertex_ao, vertex_light};

/// Lighting inputs shared by every quad of one block.
pub(crate) struct BlockShading {
    pub lights: CornerLights,
    pub ao_mask: u32,
    pub ao_intensity: f32,
    pub color: [f32; 3],
}

/// Copies the visible quads of `geom` into `build`, and their positions into `collider`
/// when the block is collidable. `origin` is the block's corner in chunk space, jitter
/// included. Returns the number of quads written.
pub(crate) fn emit_block(
    build: &mut MeshBuild,
    mut collider: Option<&mut ColliderBuild>,
    geom: &BlockGeometry,
    origin: Vec3,
    cull_flags: u8,
    shade: &BlockShading,
) -> usize {
    let mut corner_ao: [Option<[[f32; 2]; 2]>; 6] = [None; 6];
    let mut quads = 0;
    geom.for_each_visible(cull_flags, |face, q| {
        let ao_corners = face.map(|f| {
            *corner_ao[f.index()]
                .get_or_insert_with(|| face_corner_ao(f, shade.ao_mask, shade.ao_intensity))
        });
        let base = if q.tinted() {
            shade.color
        } else {
            BlockColor::WHITE_RGB
        };
        let mut tint = [[0.0f32; 4]; 4];
        for (i, t) in tint.iter_mut().enumerate() {
            let p = q.pos[i];
            let ao = match (face, &ao_corners) {
                (Some(f), Some(c)) => vertex_ao(f, c, p),
                _ => 1.0,
            };
            *t = [
                base[0] * ao,
                base[1] * ao,
                base[2] * ao,
                vertex_light(p, &shade.lights),
            ];
        }
        let pos = q.pos.map(|p| p + origin);
        build.add_quad(pos, &q.uv, &q.uv_anim, tint);
        if let Some(c) = collider.as_deref_mut() {
            c.add_quad(pos);
        }
        quads += 1;
    });
    quads
}

/// Unit-cube quads of a liquid cell. An exposed top sits slightly below the cell top and
/// the sides follow it down.
pub(crate) fn liquid_quads(cull_flags: u8) -> impl Iterator<Item = (Face, [Vec3; 4])> {
    let surface = if cull_flags & Face::PosY.bit() != 0 {
        LIQUID_SURFACE
    } else {
        1.0
    };
    Face::ALL
        .into_iter()
        .filter(move |f| cull_flags & f.bit() != 0)
        .map(move |face| {
            let corners = face_corners(face).map(|mut p| {
                if p.y == 1.0 {
                    p.y = surface;
                }
                match face {
                    Face::NegY => p.y = LIQUID_INSET,
                    Face::PosX => p.x = 1.0 - LIQUID_INSET,
                    Face::NegX => p.x = LIQUID_INSET,
                    Face::PosZ => p.z = 1.0 - LIQUID_INSET,
                    Face::NegZ => p.z = LIQUID_INSET,
                    Face::PosY => {}
                }
                p
            });
            (face, corners)
        })
}

/// Emits the liquid surface of one cell. Liquids carry no AO and no tint.
pub(crate) fn emit_liquid(
    build: &mut MeshBuild,
    texture: u16,
    origin: Vec3,
    cull_flags: u8,
    lights: &CornerLights,
) -> usize {
    let layer = f32::from(texture);
    let uv = FULL_UVS.map(|[u, v]| [u, v, layer]);
    let mut quads = 0;
    for (_, corners) in liquid_quads(cull_flags) {
        let tint = corners.map(|p| [1.0, 1.0, 1.0, vertex_light(p, lights)]);
        build.add_quad(corners.map(|p| p + origin), &uv, &[0.0; 4], tint);
        quads += 1;
    }
    quads
}

/// Number of liquid quads for the given flags.
#[inline]
pub(crate) fn liquid_quad_count(cull_flags: u8) -> usize {
    (cull_flags & 0b11_1111).count_ones() as usize
}
