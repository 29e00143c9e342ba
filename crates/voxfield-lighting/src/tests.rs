use std::sync::Arc;

use super::*;
use voxfield_blocks::{BlockRegistry, BlockStateId};

const C: usize = LIGHT_BOX_SIZE / 2;

fn emitter_box(level: u8) -> LightBox {
    let mut emission = vec![0u8; BOX_VOLUME];
    emission[LightBox::idx(C, C, C)] = level;
    LightBox::from_parts(ChunkCoord::default(), Vec::new(), emission)
}

fn lit_world() -> (World, BlockStateId) {
    let reg = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "stone"

        [[blocks]]
        name = "torch"
        shape = "cross"
        light_emission = 14
    "#,
    )
    .unwrap();
    let torch = reg.id_by_name("torch").unwrap();
    let mut w = World::new(Arc::new(reg), 3);
    for cx in -1..=1 {
        for cz in -1..=1 {
            let col = w.new_column();
            w.insert_column(cx, cz, col);
        }
    }
    (w, torch)
}

#[test]
fn single_emitter_falls_off_by_manhattan_distance() {
    let mut b = emitter_box(15);
    b.propagate();
    for d in 0..=16 {
        let expect = 15u8.saturating_sub(d as u8);
        assert_eq!(b.light(C + d, C, C), expect, "distance {d}");
    }
    assert_eq!(b.light(C + 3, C - 4, C), 8);
    assert_eq!(b.light(C + 5, C + 5, C + 5), 0);
}

#[test]
fn blockage_is_subtracted_on_entry() {
    let mut blockage = vec![0u8; BOX_VOLUME];
    blockage[LightBox::idx(C + 1, C, C)] = 2;
    for y in 0..LIGHT_BOX_SIZE {
        for z in 0..LIGHT_BOX_SIZE {
            blockage[LightBox::idx(C - 2, y, z)] = 15;
        }
    }
    let mut emission = vec![0u8; BOX_VOLUME];
    emission[LightBox::idx(C, C, C)] = 15;
    let mut b = LightBox::from_parts(ChunkCoord::default(), blockage, emission);
    b.propagate();
    // blockage applies on entry whichever way light arrives
    assert_eq!(b.light(C + 1, C, C), 12);
    assert_eq!(b.light(C - 1, C, C), 14);
    // the opaque plane stops everything behind it
    assert_eq!(b.light(C - 2, C, C), 0);
    assert_eq!(b.light(C - 3, C, C), 0);
}

#[test]
fn levels_of_one_do_not_spread() {
    let mut b = emitter_box(1);
    b.propagate();
    assert_eq!(b.light(C, C, C), 1);
    assert_eq!(b.light(C + 1, C, C), 0);
}

#[test]
fn propagation_is_idempotent() {
    let mut b = emitter_box(13);
    b.propagate();
    let first = b.light_values().to_vec();
    b.propagate();
    assert_eq!(b.light_values(), &first[..]);
}

#[test]
fn write_back_touches_only_the_center_chunk() {
    let (mut w, torch) = lit_world();
    let at = BlockPos::new(8, 24, 8);
    w.set_block(at, torch).unwrap();
    let center = at.chunk();
    let b = recalculate_light(&w, center);
    let out = b.write_back(&mut w);
    assert!(out.changed > 0);
    assert_eq!(w.get_block_light(at), 14);
    assert_eq!(w.get_block_light(BlockPos::new(9, 24, 8)), 13);
    assert_eq!(w.get_block_light(BlockPos::new(8, 31, 8)), 7);
    // one step into the chunk above stays untouched until that chunk is recalculated
    assert_eq!(w.get_block_light(BlockPos::new(8, 32, 8)), 0);
    assert_eq!(b.light(8 + MAX_SPREAD, 32 - 16 + MAX_SPREAD, 8 + MAX_SPREAD), 6);

    let dirty: Vec<_> = out.dirty_neighbors().collect();
    assert!(dirty.contains(&(0, 1, 0)));
    assert!(dirty.contains(&(-1, 0, 0)));
    assert!(dirty.contains(&(0, -1, 0)));
    // light at the chunk corner cell is 14 - 21 < 0, so no corner neighbor
    assert!(!dirty.contains(&(1, 1, 1)));

    let again = recalculate_light(&w, center).write_back(&mut w);
    assert_eq!(again.changed, 0);
    assert_eq!(again.neighbor_mask, 0);
}

#[test]
fn removing_the_source_darkens_the_chunk() {
    let (mut w, torch) = lit_world();
    let at = BlockPos::new(4, 20, 4);
    w.set_block(at, torch).unwrap();
    recalculate_light(&w, at.chunk()).write_back(&mut w);
    assert_eq!(w.get_block_light(at.offset(1, 0, 0)), 13);
    w.set_block(at, BlockStateId::AIR).unwrap();
    let out = recalculate_light(&w, at.chunk()).write_back(&mut w);
    assert!(out.changed > 0);
    assert_eq!(w.get_block_light(at), 0);
    assert_eq!(w.get_block_light(at.offset(1, 0, 0)), 0);
}

#[test]
fn affected_chunks_follow_reach() {
    let mid = affected_chunks((8, 8, 8));
    assert_eq!(mid.len(), 7);
    assert!(mid.contains(&(0, 0, 0)));
    assert!(mid.contains(&(-1, 0, 0)) && mid.contains(&(0, 0, 1)));

    let low = affected_chunks((0, 0, 0));
    assert_eq!(low.len(), 8);
    assert!(low.contains(&(-1, -1, -1)));
    assert!(!low.iter().any(|&(dx, dy, dz)| dx > 0 || dy > 0 || dz > 0));

    // 1 + 1 + 12 = 14 steps still reaches the corner chunk
    assert!(affected_chunks((0, 0, 11)).contains(&(-1, -1, -1)));
    assert!(!affected_chunks((0, 0, 12)).contains(&(-1, -1, -1)));
}

#[test]
fn neighbor_bits_are_distinct() {
    let mut seen = 0u32;
    for (dx, dy, dz) in neighbor_offsets() {
        let b = neighbor_bit(dx, dy, dz);
        assert_eq!(seen & b, 0);
        seen |= b;
    }
    assert_eq!(seen, (1 << 27) - 1);
}
