//! Block-state registry: render layers, face geometry, and the occlusion/collision/liquid
//! predicates the mesher and lighting consume.
#![forbid(unsafe_code)]

pub mod config;
pub mod geometry;
pub mod material;
pub mod registry;
pub mod types;

pub use geometry::{BlockGeometry, BlockModel, FaceQuad};
pub use material::MaterialCatalog;
pub use registry::{BlockRegistry, BlockState};
pub use types::{
    BlockColor, BlockStateId, Face, LiquidKind, MaterialId, OffsetType, RenderLayer,
};
