use voxfield_geom::Vec3;

/// Vertex streams for one render layer. Every quad appends exactly 4 vertices, so all
/// stream lengths stay multiples of 4 vertices.
#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    /// `x, y, z` per vertex.
    pub pos: Vec<f32>,
    /// `u, v, texture layer` per vertex.
    pub uv: Vec<f32>,
    /// 4 animation parameters per vertex.
    pub uv_anim: Vec<f32>,
    /// `r, g, b` (color times AO) and light per vertex.
    pub tint: Vec<f32>,
}

impl MeshBuild {
    /// Empty build with room for exactly `n_quads` quads.
    pub fn with_quads(n_quads: usize) -> Self {
        let mut mb = Self::default();
        mb.reserve_quads(n_quads);
        mb
    }

    /// Pre-reserve capacity for `n_quads` more quads.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve_exact(n_quads * 4 * 3);
        self.uv.reserve_exact(n_quads * 4 * 3);
        self.uv_anim.reserve_exact(n_quads * 4 * 4);
        self.tint.reserve_exact(n_quads * 4 * 4);
    }

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

    /// Appends one quad in TL, TR, BL, BR corner order.
    pub fn add_quad(
        &mut self,
        pos: [Vec3; 4],
        uv: &[[f32; 3]; 4],
        uv_anim: &[f32; 4],
        tint: [[f32; 4]; 4],
    ) {
        for i in 0..4 {
            self.pos.extend_from_slice(&pos[i].to_array());
            self.uv.extend_from_slice(&uv[i]);
            self.uv_anim.extend_from_slice(uv_anim);
            self.tint.extend_from_slice(&tint[i]);
        }
    }

    /// Position of vertex `i`.
    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos[i * 3], self.pos[i * 3 + 1], self.pos[i * 3 + 2])
    }
}

/// Position-only quads for physics.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ColliderBuild {
    pub pos: Vec<f32>,
}

impl ColliderBuild {
    pub fn with_quads(n_quads: usize) -> Self {
        Self {
            pos: Vec::with_capacity(n_quads * 4 * 3),
        }
    }

    #[inline]
    pub fn add_quad(&mut self, pos: [Vec3; 4]) {
        for p in pos {
            self.pos.extend_from_slice(&p.to_array());
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos.is_empty()
    }
}
