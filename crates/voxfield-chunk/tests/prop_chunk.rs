use std::sync::Arc;

use proptest::prelude::*;
use voxfield_blocks::{BlockRegistry, BlockStateId};
use voxfield_chunk::{ChunkBuildData, PADDED, PADDED_VOLUME};
use voxfield_world::{BlockPos, ChunkCoord, World};

fn coord() -> impl Strategy<Value = ChunkCoord> {
    (-1000i32..1000, -4i32..4, -1000i32..1000).prop_map(|(x, y, z)| ChunkCoord::new(x, y, z))
}

fn padded() -> impl Strategy<Value = (usize, usize, usize)> {
    (0..PADDED, 0..PADDED, 0..PADDED)
}

#[test]
fn idx_is_unique_and_in_range() {
    let mut seen = vec![false; PADDED_VOLUME];
    for y in 0..PADDED { for z in 0..PADDED { for x in 0..PADDED {
        let i = ChunkBuildData::idx(x, y, z);
        assert!(i < PADDED_VOLUME);
        assert!(!seen[i]);
        seen[i] = true;
    }}}
    assert!(seen.into_iter().all(|b| b));
}

proptest! {
    // Padded cells map to world positions one block outside the chunk origin
    #[test]
    fn world_pos_matches_origin(c in coord(), (x, y, z) in padded()) {
        let reg = Arc::new(BlockRegistry::new());
        let d = ChunkBuildData::from_parts(c, reg, Vec::new(), Vec::new(), Vec::new());
        let p = d.world_pos(x, y, z);
        let o = c.origin();
        let want = BlockPos::new(o.x + x as i32 - 1, o.y + y as i32 - 1, o.z + z as i32 - 1);
        prop_assert_eq!(p, want);
        let inside = (1..=16).contains(&x) && (1..=16).contains(&y) && (1..=16).contains(&z);
        prop_assert_eq!(p.chunk() == c, inside);
    }

    // from_parts pads or truncates every stream to the padded size
    #[test]
    fn from_parts_resizes(n in 0usize..(PADDED_VOLUME * 2)) {
        let d = ChunkBuildData::from_parts(
            ChunkCoord::default(),
            Arc::new(BlockRegistry::new()),
            vec![BlockStateId(0); n],
            vec![3; n],
            vec![[0.0; 3]; n],
        );
        let corner = if n >= PADDED_VOLUME { 3 } else { 0 };
        prop_assert_eq!(d.light(PADDED - 1, PADDED - 1, PADDED - 1), corner);
        prop_assert!(!d.has_non_air());
    }

    // Every gathered cell agrees with the world it was copied from
    #[test]
    fn gather_agrees_with_world(
        cells in prop::collection::vec((-1i32..17, 0i32..32, -1i32..17), 1..40)
    ) {
        let reg = BlockRegistry::from_toml_str("[[blocks]]\nname = \"stone\"\n").unwrap();
        let mut w = World::new(Arc::new(reg), 2);
        for cx in -1..=1 { for cz in -1..=1 {
            let col = w.new_column();
            w.insert_column(cx, cz, col);
        }}
        w.set_block(BlockPos::new(8, 8, 8), BlockStateId(1)).unwrap();
        for (x, y, z) in &cells {
            w.set_block(BlockPos::new(*x, *y, *z), BlockStateId(1)).unwrap();
        }
        let d = ChunkBuildData::gather(&w, ChunkCoord::new(0, 0, 0)).unwrap();
        for y in 0..PADDED { for z in 0..PADDED { for x in 0..PADDED {
            prop_assert_eq!(d.state(x, y, z), w.get_block(d.world_pos(x, y, z)));
        }}}
    }
}
