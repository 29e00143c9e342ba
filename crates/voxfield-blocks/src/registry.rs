use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use voxfield_geom::Vec3;

use super::config::{BlockDef, BlocksConfig, ColorDef, FaceTexturesDef};
use super::geometry::{self, BlockGeometry, BlockModel, FaceQuad, FaceTextures};
use super::material::MaterialCatalog;
use super::types::{
    BlockColor, BlockStateId, Face, LiquidKind, MaterialId, OffsetType, RenderLayer,
};

pub const MAX_LIGHT: u8 = 15;

/// Predicates and render description for one block state.
#[derive(Clone, Debug)]
pub struct BlockState {
    pub id: BlockStateId,
    pub name: String,
    /// Hides any neighbor face pressed against it.
    pub full_solid: bool,
    pub collidable: bool,
    /// Darkens corners of neighboring faces.
    pub ao_solid: bool,
    /// Contributes no solid geometry (air, plain liquid).
    pub no_solid_mesh: bool,
    pub liquid: Option<LiquidKind>,
    pub light_blockage: u8,
    pub light_emission: u8,
    /// States sharing a group hide faces between each other.
    pub cull_group: Option<u16>,
    pub color: BlockColor,
    pub model: Option<BlockModel>,
}

impl BlockState {
    pub fn air() -> Self {
        Self {
            id: BlockStateId::AIR,
            name: "air".to_string(),
            full_solid: false,
            collidable: false,
            ao_solid: false,
            no_solid_mesh: true,
            liquid: None,
            light_blockage: 0,
            light_emission: 0,
            cull_group: None,
            color: BlockColor::White,
            model: None,
        }
    }

    #[inline]
    pub fn in_liquid(&self) -> bool {
        self.liquid.is_some()
    }

    #[inline]
    pub fn in_water(&self) -> bool {
        self.liquid == Some(LiquidKind::Water)
    }

    #[inline]
    pub fn in_lava(&self) -> bool {
        self.liquid == Some(LiquidKind::Lava)
    }

    #[inline]
    pub fn layer(&self) -> Option<RenderLayer> {
        self.model.as_ref().map(|m| m.layer)
    }
}

/// Ordered table of block states, indexed by `BlockStateId`.
#[derive(Debug)]
pub struct BlockRegistry {
    pub materials: MaterialCatalog,
    pub states: Vec<BlockState>,
    pub by_name: HashMap<String, BlockStateId>,
    liquid_textures: [u16; 2],
    reported_missing: Mutex<HashSet<u16>>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// Registry holding only air.
    pub fn new() -> Self {
        let air = BlockState::air();
        let mut by_name = HashMap::new();
        by_name.insert(air.name.clone(), air.id);
        Self {
            materials: MaterialCatalog::new(),
            states: vec![air],
            by_name,
            liquid_textures: [0, 0],
            reported_missing: Mutex::new(HashSet::new()),
        }
    }

    #[inline]
    pub fn get(&self, id: BlockStateId) -> Option<&BlockState> {
        self.states.get(id.0 as usize)
    }

    /// Like `get`, but a miss is reported once per id and resolves to air so callers
    /// treat the cell as contributing nothing.
    pub fn state_or_air(&self, id: BlockStateId) -> &BlockState {
        match self.states.get(id.0 as usize) {
            Some(s) => s,
            None => {
                self.report_missing(id);
                &self.states[0]
            }
        }
    }

    fn report_missing(&self, id: BlockStateId) {
        let mut seen = self
            .reported_missing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if seen.insert(id.0) {
            log::warn!("no block state registered for id {}; rendering as air", id.0);
        }
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockStateId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[inline]
    pub fn material_for_layer(&self, layer: RenderLayer) -> Option<MaterialId> {
        self.materials.for_layer(layer)
    }

    #[inline]
    pub fn liquid_texture(&self, kind: LiquidKind) -> u16 {
        self.liquid_textures[kind.index()]
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, Box<dyn Error>> {
        let mut reg = BlockRegistry::new();
        reg.materials = MaterialCatalog::from_layer_map(&cfg.layers)?;
        reg.liquid_textures = [cfg.liquids.water_texture, cfg.liquids.lava_texture];
        let mut groups: HashMap<String, u16> = HashMap::new();
        for def in cfg.blocks {
            if def.name == "air" {
                continue;
            }
            if reg.by_name.contains_key(&def.name) {
                return Err(format!("duplicate block '{}'", def.name).into());
            }
            let id = BlockStateId(u16::try_from(reg.states.len())?);
            let next_group = groups.len() as u16;
            let group = def
                .cull_group
                .as_ref()
                .map(|g| *groups.entry(g.clone()).or_insert(next_group));
            let state = compile_state(id, def, group)?;
            reg.by_name.insert(state.name.clone(), id);
            reg.states.push(state);
        }
        Ok(reg)
    }
}

fn compile_state(
    id: BlockStateId,
    def: BlockDef,
    cull_group: Option<u16>,
) -> Result<BlockState, Box<dyn Error>> {
    let shape = def.shape.as_deref().unwrap_or("cube");
    let liquid = match def.liquid.as_deref() {
        None => None,
        Some("water") => Some(LiquidKind::Water),
        Some("lava") => Some(LiquidKind::Lava),
        Some(other) => return Err(format!("block '{}': unknown liquid '{other}'", def.name).into()),
    };
    let offset = match def.offset.as_deref() {
        None | Some("none") => OffsetType::None,
        Some("xz") => OffsetType::Xz,
        Some("xz_bounding_box") => OffsetType::XzBoundingBox,
        Some("xyz") => OffsetType::Xyz,
        Some(other) => return Err(format!("block '{}': unknown offset '{other}'", def.name).into()),
    };
    let default_layer = match shape {
        "cross" => RenderLayer::Plants,
        "liquid" => RenderLayer::Liquid,
        _ => RenderLayer::Solid,
    };
    let layer = match def.layer.as_deref() {
        None => default_layer,
        Some(name) => RenderLayer::from_name(name)
            .ok_or_else(|| format!("block '{}': unknown layer '{name}'", def.name))?,
    };
    let textures = face_textures(def.texture, def.textures.as_ref());
    let rotations = def.rotations.clone().unwrap_or_else(|| vec![0]);
    let tint_index = if def.tint.unwrap_or(false) { 0 } else { -1 };

    let mut variants: Vec<BlockGeometry> = match shape {
        "cube" => rotations
            .iter()
            .map(|r| geometry::cube(textures, *r, tint_index))
            .collect(),
        "slab" => rotations
            .iter()
            .map(|r| geometry::slab(textures, *r, tint_index))
            .collect(),
        "cross" => vec![geometry::cross(textures[Face::PosY.index()], tint_index)],
        "liquid" => Vec::new(),
        "custom" => vec![custom_geometry(&def)?],
        other => return Err(format!("block '{}': unknown shape '{other}'", def.name).into()),
    };
    if let Some(anim) = def.uv_anim {
        for v in &mut variants {
            v.set_uv_anim(anim);
        }
    }

    let has_mesh = !variants.is_empty();
    let full_cube = shape == "cube";
    let full_solid = def.full_solid.unwrap_or(full_cube && layer == RenderLayer::Solid);
    let collidable = def.collidable.unwrap_or(matches!(shape, "cube" | "slab" | "custom"));
    let ao_solid = def.ao_solid.unwrap_or(full_solid);
    let light_blockage = def
        .light_blockage
        .unwrap_or(if full_solid { MAX_LIGHT } else { 0 })
        .min(MAX_LIGHT);
    let light_emission = def.light_emission.unwrap_or(0).min(MAX_LIGHT);
    let color = match &def.color {
        None => BlockColor::White,
        Some(ColorDef::Named(n)) if n == "white" => BlockColor::White,
        Some(ColorDef::Named(n)) if n == "biome" => BlockColor::Biome,
        Some(ColorDef::Named(n)) => {
            return Err(format!("block '{}': unknown color '{n}'", def.name).into());
        }
        Some(ColorDef::Rgb(rgb)) => BlockColor::Fixed(*rgb),
    };

    Ok(BlockState {
        id,
        name: def.name,
        full_solid,
        collidable: collidable && has_mesh,
        ao_solid,
        no_solid_mesh: !has_mesh,
        liquid,
        light_blockage,
        light_emission,
        cull_group,
        color,
        model: has_mesh.then_some(BlockModel {
            layer,
            offset,
            variants,
        }),
    })
}

fn face_textures(all: Option<u16>, per_face: Option<&FaceTexturesDef>) -> FaceTextures {
    let base = per_face.and_then(|t| t.all).or(all).unwrap_or(0);
    let Some(t) = per_face else {
        return [base; 6];
    };
    let side = t.side.unwrap_or(base);
    let mut out = [side; 6];
    out[Face::PosY.index()] = t.top.unwrap_or(base);
    out[Face::NegY.index()] = t.bottom.unwrap_or(base);
    out
}

fn custom_geometry(def: &BlockDef) -> Result<BlockGeometry, Box<dyn Error>> {
    if def.faces.is_empty() {
        return Err(format!("block '{}': custom shape without faces", def.name).into());
    }
    let mut g = BlockGeometry::new();
    for f in &def.faces {
        let cull = match f.cull.as_str() {
            "none" => None,
            name => Some(
                Face::from_name(name)
                    .ok_or_else(|| format!("block '{}': unknown cull face '{name}'", def.name))?,
            ),
        };
        let layer = f.texture as f32;
        g.push(
            cull,
            FaceQuad {
                pos: f.pos.map(Vec3::from),
                uv: f.uv.map(|[u, v]| [u, v, layer]),
                uv_anim: [0.0; 4],
                tint_index: f.tint,
            },
        );
    }
    Ok(g)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [layers]
        solid = "terrain"
        plants = "terrain_cutout"

        [liquids]
        water_texture = 9

        [[blocks]]
        name = "stone"
        texture = 1

        [[blocks]]
        name = "glass"
        layer = "cutout"
        full_solid = false
        ao_solid = false
        cull_group = "glass"
        light_blockage = 0

        [[blocks]]
        name = "tinted_glass"
        layer = "cutout"
        full_solid = false
        cull_group = "glass"

        [[blocks]]
        name = "water"
        shape = "liquid"
        liquid = "water"
        light_blockage = 2
    "#;

    #[test]
    fn air_is_always_id_zero() {
        let reg = BlockRegistry::from_toml_str(SAMPLE).unwrap();
        assert_eq!(reg.id_by_name("air"), Some(BlockStateId::AIR));
        assert!(reg.get(BlockStateId::AIR).unwrap().no_solid_mesh);
        assert_eq!(reg.id_by_name("stone"), Some(BlockStateId(1)));
    }

    #[test]
    fn cube_defaults_are_solid_and_opaque() {
        let reg = BlockRegistry::from_toml_str(SAMPLE).unwrap();
        let stone = reg.get(reg.id_by_name("stone").unwrap()).unwrap();
        assert!(stone.full_solid && stone.collidable && stone.ao_solid);
        assert_eq!(stone.light_blockage, MAX_LIGHT);
        assert_eq!(stone.layer(), Some(RenderLayer::Solid));
        assert_eq!(
            reg.material_for_layer(RenderLayer::Solid),
            reg.materials.get_id("terrain")
        );
    }

    #[test]
    fn cull_groups_are_shared_by_name() {
        let reg = BlockRegistry::from_toml_str(SAMPLE).unwrap();
        let a = reg.get(reg.id_by_name("glass").unwrap()).unwrap();
        let b = reg.get(reg.id_by_name("tinted_glass").unwrap()).unwrap();
        assert!(a.cull_group.is_some());
        assert_eq!(a.cull_group, b.cull_group);
    }

    #[test]
    fn liquid_shape_has_no_solid_mesh() {
        let reg = BlockRegistry::from_toml_str(SAMPLE).unwrap();
        let water = reg.get(reg.id_by_name("water").unwrap()).unwrap();
        assert!(water.in_water() && water.no_solid_mesh && !water.collidable);
        assert_eq!(water.light_blockage, 2);
        assert_eq!(reg.liquid_texture(LiquidKind::Water), 9);
    }

    #[test]
    fn missing_ids_resolve_to_air() {
        let reg = BlockRegistry::new();
        let s = reg.state_or_air(BlockStateId(999));
        assert_eq!(s.id, BlockStateId::AIR);
        // second lookup takes the already-reported path
        assert_eq!(reg.state_or_air(BlockStateId(999)).id, BlockStateId::AIR);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = BlockRegistry::from_toml_str(
            r#"
            [[blocks]]
            name = "a"
            [[blocks]]
            name = "a"
        "#,
        );
        assert!(err.is_err());
    }
}
