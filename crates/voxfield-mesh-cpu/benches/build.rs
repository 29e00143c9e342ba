use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};

use voxfield_blocks::{BlockRegistry, BlockStateId};
use voxfield_chunk::{ChunkBuildData, PADDED, PADDED_VOLUME};
use voxfield_mesh_cpu::{CancelToken, build_chunk_mesh};
use voxfield_world::ChunkCoord;

fn load_registry() -> Arc<BlockRegistry> {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    Arc::new(BlockRegistry::from_path(root.join("../../assets/blocks.toml")).unwrap())
}

fn snapshot(
    reg: &Arc<BlockRegistry>,
    f: impl Fn(usize, usize, usize) -> &'static str,
) -> ChunkBuildData {
    let mut states = vec![BlockStateId::AIR; PADDED_VOLUME];
    for y in 0..PADDED {
        for z in 0..PADDED {
            for x in 0..PADDED {
                states[ChunkBuildData::idx(x, y, z)] =
                    reg.id_by_name(f(x, y, z)).unwrap_or(BlockStateId::AIR);
            }
        }
    }
    let light = vec![12; PADDED_VOLUME];
    ChunkBuildData::from_parts(ChunkCoord::new(0, 0, 0), Arc::clone(reg), states, light, Vec::new())
}

fn bench_flat_terrain(c: &mut Criterion) {
    let reg = load_registry();
    let data = snapshot(&reg, |x, y, z| match y {
        0..=6 => "stone",
        7..=8 => "dirt",
        9 => "grass",
        10 if (x * 7 + z * 13) % 5 == 0 => "fern",
        _ => "air",
    });
    c.bench_function("build_chunk_mesh_flat", |b| {
        b.iter(|| black_box(build_chunk_mesh(black_box(&data), &CancelToken::new())))
    });
}

fn bench_checkerboard(c: &mut Criterion) {
    let reg = load_registry();
    // worst case: every solid cell exposes all six faces
    let data = snapshot(&reg, |x, y, z| if (x + y + z) % 2 == 0 { "stone" } else { "air" });
    c.bench_function("build_chunk_mesh_checkerboard", |b| {
        b.iter(|| black_box(build_chunk_mesh(black_box(&data), &CancelToken::new())))
    });
}

fn bench_water_and_glass(c: &mut Criterion) {
    let reg = load_registry();
    let data = snapshot(&reg, |x, y, z| match (x % 4, y) {
        (_, 0..=4) => "water",
        (0, 5..=12) if z % 3 == 0 => "glass",
        _ => "air",
    });
    c.bench_function("build_chunk_mesh_water_glass", |b| {
        b.iter(|| black_box(build_chunk_mesh(black_box(&data), &CancelToken::new())))
    });
}

criterion_group!(benches, bench_flat_terrain, bench_checkerboard, bench_water_and_glass);
criterion_main!(benches);
