//! Collision shell around the observer, rebuilt independently of chunk meshes.

use voxfield_blocks::{BlockState, Face};
use voxfield_geom::Vec3;
use voxfield_world::{BlockPos, World};

use crate::build::quad_indices;
use crate::chunk::CollisionMesh;
use crate::cull::NeighborCheck;
use crate::emit::liquid_quads;
use crate::mesh_build::ColliderBuild;
use crate::offset::{block_offset, offset_moves_collider};
use crate::constants::{MOVEMENT_RADIUS, MOVEMENT_RADIUS_SQR_MINI, MOVEMENT_RADIUS_SQR_PLUS};

/// Movement and liquid-surface colliders in world space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalCollider {
    pub center: BlockPos,
    pub movement: CollisionMesh,
    pub liquid: CollisionMesh,
}

/// Offsets of the cells inside the collision shell.
pub fn movement_offsets() -> impl Iterator<Item = (i32, i32, i32)> {
    let r = MOVEMENT_RADIUS;
    (-r..=r).flat_map(move |x| {
        (-r..=r).flat_map(move |y| {
            (-r..=r).filter_map(move |z| {
                ((x * x + y * y + z * z) as f32 <= MOVEMENT_RADIUS_SQR_MINI).then_some((x, y, z))
            })
        })
    })
}

/// Whether an edit at `pos` can change the collider built around `observer`.
#[inline]
pub fn within_movement_radius(observer: BlockPos, pos: BlockPos) -> bool {
    observer.sqr_distance(pos) as f32 <= MOVEMENT_RADIUS_SQR_PLUS
}

fn face_flags(world: &World, pos: BlockPos, check: NeighborCheck) -> u8 {
    Face::ALL
        .into_iter()
        .filter(|f| {
            let (dx, dy, dz) = f.delta();
            check.shows_against(world.block_state(pos.offset(dx, dy, dz)))
        })
        .fold(0, |acc, f| acc | f.bit())
}

fn add_solid(world: &World, pos: BlockPos, state: &BlockState, out: &mut ColliderBuild) {
    if !state.collidable || state.no_solid_mesh {
        return;
    }
    let Some(model) = &state.model else {
        return;
    };
    // same variant pick as the chunk mesher, which works in padded coordinates
    let (lx, ly, lz) = pos.local();
    let Some(geom) = model.variant_for(lx + 1, ly + 1, lz + 1) else {
        return;
    };
    let flags = face_flags(world, pos, NeighborCheck::for_block(state));
    let jitter = if offset_moves_collider(model.offset) {
        block_offset(model.offset, pos.x, pos.z)
    } else {
        Vec3::ZERO
    };
    let base = pos.to_vec3() + jitter;
    geom.for_each_visible(flags, |_, q| out.add_quad(q.pos.map(|p| p + base)));
}

fn add_liquid(world: &World, pos: BlockPos, state: &BlockState, out: &mut ColliderBuild) {
    let Some(kind) = state.liquid else {
        return;
    };
    let flags = face_flags(world, pos, NeighborCheck::Liquid(kind));
    let base = pos.to_vec3();
    for (_, corners) in liquid_quads(flags) {
        out.add_quad(corners.map(|p| p + base));
    }
}

fn into_mesh(b: ColliderBuild) -> CollisionMesh {
    let mut indices = Vec::new();
    quad_indices(0, b.vertex_count() / 4, &mut indices);
    CollisionMesh { pos: b.pos, indices }
}

/// Collision geometry for the solid and liquid surfaces within the movement radius of
/// `center`. Faces hidden by neighbors are skipped, as in chunk meshes.
pub fn build_local_collider(world: &World, center: BlockPos) -> LocalCollider {
    let mut movement = ColliderBuild::default();
    let mut liquid = ColliderBuild::default();
    for (dx, dy, dz) in movement_offsets() {
        let pos = center.offset(dx, dy, dz);
        let state = world.block_state(pos);
        add_solid(world, pos, state, &mut movement);
        add_liquid(world, pos, state, &mut liquid);
    }
    LocalCollider {
        center,
        movement: into_mesh(movement),
        liquid: into_mesh(liquid),
    }
}
