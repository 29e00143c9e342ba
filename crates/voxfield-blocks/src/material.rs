use std::collections::HashMap;
use std::error::Error;

use crate::types::{MaterialId, RenderLayer};

#[derive(Clone, Debug)]
pub struct Material {
    pub id: MaterialId,
    pub key: String,
}

/// Opaque material handles, one per render layer.
#[derive(Default, Clone, Debug)]
pub struct MaterialCatalog {
    pub materials: Vec<Material>,
    pub by_key: HashMap<String, MaterialId>,
    by_layer: [Option<MaterialId>; RenderLayer::COUNT],
}

impl MaterialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_id(&self, key: &str) -> Option<MaterialId> {
        self.by_key.get(key).copied()
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    #[inline]
    pub fn for_layer(&self, layer: RenderLayer) -> Option<MaterialId> {
        self.by_layer[layer.index()]
    }

    /// Builds the catalog from `layer name -> material key` pairs.
    pub fn from_layer_map(layers: &HashMap<String, String>) -> Result<Self, Box<dyn Error>> {
        let mut catalog = MaterialCatalog::new();
        let mut keys: Vec<&String> = layers.values().collect();
        // HashMap iteration order is nondeterministic; sorted keys keep MaterialIds stable
        keys.sort();
        keys.dedup();
        for key in keys {
            let id = MaterialId(catalog.materials.len() as u16);
            catalog.by_key.insert(key.clone(), id);
            catalog.materials.push(Material {
                id,
                key: key.clone(),
            });
        }
        for (layer_name, key) in layers {
            let layer = RenderLayer::from_name(layer_name)
                .ok_or_else(|| format!("unknown render layer '{layer_name}'"))?;
            catalog.by_layer[layer.index()] = catalog.get_id(key);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_share_materials_by_key() {
        let layers = HashMap::from([
            ("solid".to_string(), "terrain".to_string()),
            ("cutout".to_string(), "terrain".to_string()),
            ("liquid".to_string(), "water".to_string()),
        ]);
        let cat = MaterialCatalog::from_layer_map(&layers).unwrap();
        assert_eq!(cat.materials.len(), 2);
        assert_eq!(cat.get_id("terrain"), Some(MaterialId(0)));
        assert_eq!(cat.for_layer(RenderLayer::Solid), cat.for_layer(RenderLayer::Cutout));
        assert_eq!(cat.for_layer(RenderLayer::Liquid), Some(MaterialId(1)));
        assert_eq!(cat.for_layer(RenderLayer::Plants), None);
    }

    #[test]
    fn unknown_layer_is_an_error() {
        let layers = HashMap::from([("sparkles".to_string(), "x".to_string())]);
        assert!(MaterialCatalog::from_layer_map(&layers).is_err());
    }
}
