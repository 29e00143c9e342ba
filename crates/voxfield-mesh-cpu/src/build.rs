use std::time::Instant;

use voxfield_blocks::{BlockRegistry, RenderLayer};
use voxfield_chunk::ChunkBuildData;
use voxfield_geom::{Aabb, Vec3};
use voxfield_world::{CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord};

use crate::cancel::CancelToken;
use crate::chunk::{ChunkBuildResult, ChunkMesh, CollisionMesh, SubMesh};
use crate::cull::{NeighborCheck, cull_flags};
use crate::emit::{BlockShading, emit_block, emit_liquid, liquid_quad_count};
use crate::mesh_build::{ColliderBuild, MeshBuild};
use crate::offset::block_offset;
use crate::sample::{ao_mask, corner_lights};

#[derive(Default)]
struct MesherPerf {
    count_ms: u32,
    fill_ms: u32,
    finalize_ms: u32,
    total_ms: u32,
}

fn elapsed_ms(start: Instant) -> u32 {
    start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

/// Cull flags recorded by the count pass for one interior cell.
#[derive(Copy, Clone, Default)]
struct CellPlan {
    liquid: u8,
    solid: u8,
}

#[inline]
fn plan_idx(x: usize, y: usize, z: usize) -> usize {
    ((y - 1) * CHUNK_SIZE + (z - 1)) * CHUNK_SIZE + (x - 1)
}

/// Quads each layer and the collider will receive.
struct Counts {
    layers: [usize; RenderLayer::COUNT],
    collider: usize,
}

fn count_pass(data: &ChunkBuildData, plan: &mut [CellPlan]) -> Counts {
    let mut counts = Counts {
        layers: [0; RenderLayer::COUNT],
        collider: 0,
    };
    for y in 1..=CHUNK_SIZE {
        for z in 1..=CHUNK_SIZE {
            for x in 1..=CHUNK_SIZE {
                let state = data.block(x, y, z);
                let cell = &mut plan[plan_idx(x, y, z)];
                if let Some(kind) = state.liquid {
                    let f = cull_flags(data, x, y, z, NeighborCheck::Liquid(kind));
                    cell.liquid = f;
                    counts.layers[kind.layer().index()] += liquid_quad_count(f);
                }
                if state.no_solid_mesh {
                    continue;
                }
                let Some(model) = &state.model else {
                    continue;
                };
                let Some(geom) = model.variant_for(x, y, z) else {
                    continue;
                };
                let f = cull_flags(data, x, y, z, NeighborCheck::for_block(state));
                if f == 0 {
                    continue;
                }
                cell.solid = f;
                let n = geom.quad_count(f);
                counts.layers[model.layer.index()] += n;
                if state.collidable {
                    counts.collider += n;
                }
            }
        }
    }
    counts
}

fn fill_pass(
    data: &ChunkBuildData,
    plan: &[CellPlan],
    builds: &mut [MeshBuild],
    collider: &mut ColliderBuild,
) {
    let reg = data.registry();
    for y in 1..=CHUNK_SIZE {
        for z in 1..=CHUNK_SIZE {
            for x in 1..=CHUNK_SIZE {
                let cell = plan[plan_idx(x, y, z)];
                if cell.liquid == 0 && cell.solid == 0 {
                    continue;
                }
                let state = data.block(x, y, z);
                let origin = Vec3::new((x - 1) as f32, (y - 1) as f32, (z - 1) as f32);
                let lights = corner_lights(data, x, y, z);
                if let Some(kind) = state.liquid.filter(|_| cell.liquid != 0) {
                    emit_liquid(
                        &mut builds[kind.layer().index()],
                        reg.liquid_texture(kind),
                        origin,
                        cell.liquid,
                        &lights,
                    );
                }
                if cell.solid == 0 {
                    continue;
                }
                let Some(model) = &state.model else {
                    continue;
                };
                let Some(geom) = model.variant_for(x, y, z) else {
                    continue;
                };
                let wp = data.world_pos(x, y, z);
                let shade = BlockShading {
                    lights,
                    ao_mask: ao_mask(data, x, y, z),
                    ao_intensity: model.layer.ao_intensity(),
                    color: state.color.resolve(data.biome(x, z)),
                };
                let target = state.collidable.then_some(&mut *collider);
                emit_block(
                    &mut builds[model.layer.index()],
                    target,
                    geom,
                    origin + block_offset(model.offset, wp.x, wp.z),
                    cell.solid,
                    &shade,
                );
            }
        }
    }
}

/// Index stream for `quads` consecutive quads starting at vertex `base`: two triangles
/// `(0,3,2)` and `(0,1,3)` per quad.
pub fn quad_indices(base: u32, quads: usize, out: &mut Vec<u32>) {
    out.reserve(quads * 6);
    for q in 0..quads as u32 {
        let v = base + q * 4;
        out.extend_from_slice(&[v, v + 3, v + 2, v, v + 1, v + 3]);
    }
}

/// Concatenates the non-empty layers in layer order and indexes every stream.
fn finalize(
    coord: ChunkCoord,
    reg: &BlockRegistry,
    builds: Vec<MeshBuild>,
    collider: ColliderBuild,
) -> ChunkBuildResult {
    let total_verts: usize = builds.iter().map(MeshBuild::vertex_count).sum();
    if total_verts == 0 {
        return ChunkBuildResult::Empty;
    }
    let mut mesh = ChunkMesh {
        coord,
        pos: Vec::with_capacity(total_verts * 3),
        uv: Vec::with_capacity(total_verts * 3),
        uv_anim: Vec::with_capacity(total_verts * 4),
        tint: Vec::with_capacity(total_verts * 4),
        indices: Vec::with_capacity(total_verts / 4 * 6),
        ..Default::default()
    };
    for (layer, b) in RenderLayer::ALL.into_iter().zip(builds) {
        if b.is_empty() {
            continue;
        }
        let first_vertex = mesh.vertex_count() as u32;
        let first_index = mesh.indices.len() as u32;
        let quads = b.quad_count();
        quad_indices(first_vertex, quads, &mut mesh.indices);
        mesh.submeshes.push(SubMesh {
            layer,
            material: reg.material_for_layer(layer),
            first_vertex,
            vertex_count: (quads * 4) as u32,
            first_index,
            index_count: (quads * 6) as u32,
        });
        mesh.pos.extend_from_slice(&b.pos);
        mesh.uv.extend_from_slice(&b.uv);
        mesh.uv_anim.extend_from_slice(&b.uv_anim);
        mesh.tint.extend_from_slice(&b.tint);
    }
    let mut bbox = Aabb::EMPTY;
    for p in mesh.pos.chunks_exact(3) {
        bbox.include(Vec3::new(p[0], p[1], p[2]));
    }
    mesh.bbox = bbox;

    let collider = (!collider.is_empty()).then(|| {
        let quads = collider.vertex_count() / 4;
        let mut indices = Vec::new();
        quad_indices(0, quads, &mut indices);
        CollisionMesh {
            pos: collider.pos,
            indices,
        }
    });
    ChunkBuildResult::Built { mesh, collider }
}

/// Builds the visual and collision meshes of one chunk.
///
/// A count pass records each cell's cull flags and sizes every layer buffer exactly; the
/// fill pass then writes quads without reallocating. `token` is checked once, after the
/// fill pass: a cancelled build returns nothing usable.
pub fn build_chunk_mesh(data: &ChunkBuildData, token: &CancelToken) -> ChunkBuildResult {
    let t_total = Instant::now();
    let mut perf = MesherPerf::default();

    let t = Instant::now();
    let mut plan = vec![CellPlan::default(); CHUNK_VOLUME];
    let counts = count_pass(data, &mut plan);
    perf.count_ms = elapsed_ms(t);

    let t = Instant::now();
    let mut builds: Vec<MeshBuild> = counts
        .layers
        .iter()
        .map(|&n| MeshBuild::with_quads(n))
        .collect();
    let mut collider = ColliderBuild::with_quads(counts.collider);
    fill_pass(data, &plan, &mut builds, &mut collider);
    perf.fill_ms = elapsed_ms(t);

    if token.is_cancelled() {
        log::trace!("chunk build {:?} cancelled", data.coord);
        return ChunkBuildResult::Cancelled;
    }

    let t = Instant::now();
    let out = finalize(data.coord, data.registry(), builds, collider);
    perf.finalize_ms = elapsed_ms(t);
    perf.total_ms = elapsed_ms(t_total);
    log_mesher_perf(data.coord, &perf, out.mesh().map_or(0, ChunkMesh::quad_count));
    out
}

fn log_mesher_perf(c: ChunkCoord, perf: &MesherPerf, quads: usize) {
    log::debug!(
        target: "perf",
        "ms count={} fill={} finalize={} total={} chunk_mesh cx={} cy={} cz={} quads={}",
        perf.count_ms,
        perf.fill_ms,
        perf.finalize_ms,
        perf.total_ms,
        c.cx,
        c.cy,
        c.cz,
        quads
    );
}
