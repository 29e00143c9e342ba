//! CPU chunk mesher: per-layer visual quads with corner light and AO, a collision mesh
//! built alongside, and the observer's local collider.
#![forbid(unsafe_code)]

mod build;
mod cancel;
mod chunk;
mod collider;
mod constants;
mod cull;
mod emit;
mod mesh_build;
mod offset;
mod sample;

pub use build::{build_chunk_mesh, quad_indices};
pub use cancel::CancelToken;
pub use chunk::{ChunkBuildResult, ChunkMesh, CollisionMesh, SubMesh};
pub use collider::{LocalCollider, build_local_collider, movement_offsets, within_movement_radius};
pub use constants::{MOVEMENT_RADIUS, MOVEMENT_RADIUS_SQR_MINI, MOVEMENT_RADIUS_SQR_PLUS};
pub use cull::{NeighborCheck, cull_flags};
pub use mesh_build::{ColliderBuild, MeshBuild};
pub use offset::{block_offset, offset_moves_collider, seed_for_coords};
pub use sample::{
    CornerLights, ao_bit, ao_mask, corner_lights, face_corner_ao, vertex_ao, vertex_light,
};
