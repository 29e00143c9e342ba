use std::sync::Arc;

use proptest::prelude::*;
use voxfield_blocks::{BlockRegistry, BlockStateId};
use voxfield_world::{BlockPos, CHUNK_SIZE_I32, DEFAULT_BIOME_COLOR, World};

const BLOCKS: &str = r#"
    [[blocks]]
    name = "stone"

    [[blocks]]
    name = "torch"
    shape = "cross"
    light_emission = 14
"#;

fn world(radius: i32) -> World {
    let reg = Arc::new(BlockRegistry::from_toml_str(BLOCKS).unwrap());
    let mut w = World::new(reg, 4);
    for cx in -radius..=radius {
        for cz in -radius..=radius {
            let col = w.new_column();
            w.insert_column(cx, cz, col);
        }
    }
    w
}

fn pos_in(radius: i32) -> impl Strategy<Value = BlockPos> {
    let span = (radius + 1) * CHUNK_SIZE_I32;
    (-span..span, 0..64i32, -span..span).prop_map(|(x, y, z)| BlockPos::new(x, y, z))
}

proptest! {
    // Local and chunk coordinates reassemble to the original position
    #[test]
    fn chunk_and_local_recompose(
        x in -100_000i32..100_000,
        y in -512i32..512,
        z in -100_000i32..100_000
    ) {
        let p = BlockPos::new(x, y, z);
        let c = p.chunk();
        let (lx, ly, lz) = p.local();
        let o = c.origin();
        prop_assert_eq!(BlockPos::new(o.x + lx as i32, o.y + ly as i32, o.z + lz as i32), p);
        prop_assert_eq!(p.column(), c.column());
    }

    // The last write wins and reports the previous state
    #[test]
    fn set_then_get(p in pos_in(1), first in 0u16..3, second in 0u16..3) {
        let mut w = world(1);
        let a = BlockStateId(first);
        let b = BlockStateId(second);
        w.set_block(p, a).unwrap();
        let out = w.set_block(p, b).unwrap();
        prop_assert_eq!(out.previous, a);
        prop_assert_eq!(w.get_block(p), b);
    }

    // Light bytes written to loaded columns read back unchanged
    #[test]
    fn light_round_trips(p in pos_in(1), v in 0u8..16) {
        let mut w = world(1);
        w.set_block_light(p, v);
        prop_assert_eq!(w.get_block_light(p), v);
    }
}

#[test]
fn unloaded_columns_read_as_air_and_reject_writes() {
    let mut w = world(0);
    let far = BlockPos::new(100, 10, 100);
    assert_eq!(w.get_block(far), BlockStateId::AIR);
    assert_eq!(w.get_biome(far), DEFAULT_BIOME_COLOR);
    assert!(w.set_block(far, BlockStateId(1)).is_none());
    w.set_block_light(far, 9);
    assert_eq!(w.get_block_light(far), 0);
}

#[test]
fn summaries_track_light_properties() {
    let mut w = world(0);
    let p = BlockPos::new(3, 3, 3);
    let torch = w.registry().id_by_name("torch").unwrap();
    assert!(w.set_block(p, torch).unwrap().relight);
    assert_eq!(w.light_emission_at(p), 14);
    assert_eq!(w.light_blockage_at(p), 0);
    let stone = w.registry().id_by_name("stone").unwrap();
    assert!(w.set_block(p, stone).unwrap().relight);
    assert_eq!(w.light_blockage_at(p), 15);
    assert!(!w.set_block(p, stone).unwrap().relight);
}

#[test]
fn registry_swap_refreshes_summaries() {
    let mut w = world(0);
    let p = BlockPos::new(1, 1, 1);
    w.set_block(p, BlockStateId(1)).unwrap();
    assert_eq!(w.light_blockage_at(p), 15);
    let glassy = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "stone"
        full_solid = false
        layer = "cutout"
    "#,
    )
    .unwrap();
    w.set_registry(Arc::new(glassy));
    assert_eq!(w.light_blockage_at(p), 0);
}

#[test]
fn neighbors_loaded_needs_all_eight() {
    let mut w = world(1);
    let c = BlockPos::new(0, 0, 0).chunk();
    assert!(w.neighbors_loaded(c));
    w.remove_column(1, -1);
    assert!(!w.neighbors_loaded(c));
}
