use voxfield_blocks::{MaterialId, RenderLayer};
use voxfield_geom::{Aabb, Vec3};
use voxfield_world::ChunkCoord;

/// Contiguous range of one render layer inside a [`ChunkMesh`].
#[derive(Clone, Debug, PartialEq)]
pub struct SubMesh {
    pub layer: RenderLayer,
    pub material: Option<MaterialId>,
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub first_index: u32,
    pub index_count: u32,
}

/// Finalized visual geometry of one chunk, positions in chunk-local space.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub bbox: Aabb,
    pub pos: Vec<f32>,
    pub uv: Vec<f32>,
    pub uv_anim: Vec<f32>,
    pub tint: Vec<f32>,
    pub indices: Vec<u32>,
    /// One entry per non-empty layer, in layer order.
    pub submeshes: Vec<SubMesh>,
}

impl ChunkMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertex_count() / 4
    }

    pub fn layer(&self, layer: RenderLayer) -> Option<&SubMesh> {
        self.submeshes.iter().find(|s| s.layer == layer)
    }

    /// Quads of one layer.
    pub fn layer_quad_count(&self, layer: RenderLayer) -> usize {
        self.layer(layer).map_or(0, |s| s.vertex_count as usize / 4)
    }

    /// Corner positions of quad `q`.
    pub fn quad(&self, q: usize) -> [Vec3; 4] {
        quad_at(&self.pos, q)
    }
}

/// Position-only collision geometry, chunk-local.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionMesh {
    pub pos: Vec<f32>,
    pub indices: Vec<u32>,
}

impl CollisionMesh {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertex_count() / 4
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }

    pub fn quad(&self, q: usize) -> [Vec3; 4] {
        quad_at(&self.pos, q)
    }
}

fn quad_at(pos: &[f32], q: usize) -> [Vec3; 4] {
    std::array::from_fn(|i| {
        let v = (q * 4 + i) * 3;
        Vec3::new(pos[v], pos[v + 1], pos[v + 2])
    })
}

/// Outcome of one chunk build.
#[derive(Clone, Debug)]
pub enum ChunkBuildResult {
    /// The token fired; nothing here may be applied.
    Cancelled,
    /// No visible face; any previous mesh and collider must be cleared.
    Empty,
    Built {
        mesh: ChunkMesh,
        /// `None` when no collidable face is visible.
        collider: Option<CollisionMesh>,
    },
}

impl ChunkBuildResult {
    pub fn mesh(&self) -> Option<&ChunkMesh> {
        match self {
            ChunkBuildResult::Built { mesh, .. } => Some(mesh),
            _ => None,
        }
    }

    pub fn collider(&self) -> Option<&CollisionMesh> {
        match self {
            ChunkBuildResult::Built { collider, .. } => collider.as_ref(),
            _ => None,
        }
    }
}
