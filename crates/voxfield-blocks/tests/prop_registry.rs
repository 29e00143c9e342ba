use proptest::prelude::*;
use voxfield_blocks::config::{BlockDef, BlocksConfig};
use voxfield_blocks::geometry::rotate_uvs;
use voxfield_blocks::registry::MAX_LIGHT;
use voxfield_blocks::{BlockRegistry, BlockStateId, Face};

fn block_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,8}", 1..12)
        .prop_map(|s| s.into_iter().filter(|n| n != "air").collect())
}

fn def(name: &str) -> BlockDef {
    BlockDef {
        name: name.to_string(),
        ..BlockDef::default()
    }
}

proptest! {
    // Ids follow definition order after air
    #[test]
    fn ids_follow_definition_order(names in block_names()) {
        let cfg = BlocksConfig {
            blocks: names.iter().map(|n| def(n)).collect(),
            ..BlocksConfig::default()
        };
        let reg = BlockRegistry::from_config(cfg).unwrap();
        prop_assert_eq!(reg.len(), names.len() + 1);
        for (i, n) in names.iter().enumerate() {
            prop_assert_eq!(reg.id_by_name(n), Some(BlockStateId(i as u16 + 1)));
            prop_assert_eq!(&reg.get(BlockStateId(i as u16 + 1)).unwrap().name, n);
        }
    }

    // Light values are clamped into the 4-bit range
    #[test]
    fn light_values_are_clamped(blockage in any::<u8>(), emission in any::<u8>()) {
        let cfg = BlocksConfig {
            blocks: vec![BlockDef {
                light_blockage: Some(blockage),
                light_emission: Some(emission),
                ..def("lamp")
            }],
            ..BlocksConfig::default()
        };
        let reg = BlockRegistry::from_config(cfg).unwrap();
        let s = reg.get(BlockStateId(1)).unwrap();
        prop_assert_eq!(s.light_blockage, blockage.min(MAX_LIGHT));
        prop_assert_eq!(s.light_emission, emission.min(MAX_LIGHT));
    }

    // Rotations compose modulo a full turn
    #[test]
    fn rotations_compose(a in 0u16..4, b in 0u16..4) {
        let base = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];
        let split = rotate_uvs(rotate_uvs(base, a * 90), b * 90);
        let joined = rotate_uvs(base, ((a + b) % 4) * 90);
        prop_assert_eq!(split, joined);
    }
}

#[test]
fn rotations_produce_one_variant_each() {
    let reg = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "sand"
        rotations = [0, 90, 180, 270]
        textures = { top = 4, side = 5 }
    "#,
    )
    .unwrap();
    let sand = reg.get(BlockStateId(1)).unwrap();
    let model = sand.model.as_ref().unwrap();
    assert_eq!(model.variants.len(), 4);
    let top = &model.variants[0].group(Some(Face::PosY))[0];
    let side = &model.variants[0].group(Some(Face::PosX))[0];
    assert_eq!(top.uv[0][2], 4.0);
    assert_eq!(side.uv[0][2], 5.0);
    assert_ne!(
        model.variants[0].group(Some(Face::PosY))[0].uv,
        model.variants[1].group(Some(Face::PosY))[0].uv
    );
}

#[test]
fn custom_faces_parse_cull_direction() {
    let reg = BlockRegistry::from_toml_str(
        r#"
        [[blocks]]
        name = "carpet"
        shape = "custom"
        full_solid = false

        [[blocks.faces]]
        cull = "none"
        pos = [[0.0, 0.0625, 0.0], [1.0, 0.0625, 0.0], [0.0, 0.0625, 1.0], [1.0, 0.0625, 1.0]]
        texture = 7

        [[blocks.faces]]
        cull = "down"
        pos = [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]
    "#,
    )
    .unwrap();
    let carpet = reg.get(BlockStateId(1)).unwrap();
    let g = &carpet.model.as_ref().unwrap().variants[0];
    assert_eq!(g.group(None).len(), 1);
    assert_eq!(g.group(Some(Face::NegY)).len(), 1);
    assert_eq!(g.quad_count(0), 1);
    assert!(carpet.collidable);
    assert!(!carpet.full_solid);
}
