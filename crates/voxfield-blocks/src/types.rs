use voxfield_geom::Vec3;

/// Numeric block-state id. Id 0 is always air.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockStateId(pub u16);

impl BlockStateId {
    pub const AIR: BlockStateId = BlockStateId(0);

    #[inline]
    pub fn is_air(self) -> bool {
        self.0 == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u16);

/// Rendering bucket. Declaration order is the submesh order of a finalized chunk mesh.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    Solid = 0,
    Cutout = 1,
    CutoutMipped = 2,
    Translucent = 3,
    Liquid = 4,
    Foliage = 5,
    Plants = 6,
    TallPlants = 7,
}

impl RenderLayer {
    pub const COUNT: usize = 8;
    pub const ALL: [RenderLayer; RenderLayer::COUNT] = [
        RenderLayer::Solid,
        RenderLayer::Cutout,
        RenderLayer::CutoutMipped,
        RenderLayer::Translucent,
        RenderLayer::Liquid,
        RenderLayer::Foliage,
        RenderLayer::Plants,
        RenderLayer::TallPlants,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderLayer::Solid => "solid",
            RenderLayer::Cutout => "cutout",
            RenderLayer::CutoutMipped => "cutout_mipped",
            RenderLayer::Translucent => "translucent",
            RenderLayer::Liquid => "liquid",
            RenderLayer::Foliage => "foliage",
            RenderLayer::Plants => "plants",
            RenderLayer::TallPlants => "tall_plants",
        }
    }

    pub fn from_name(s: &str) -> Option<RenderLayer> {
        RenderLayer::ALL.into_iter().find(|l| l.name() == s)
    }

    /// Corner darkening per occluding neighbor. Plants get a lighter touch.
    #[inline]
    pub fn ao_intensity(self) -> f32 {
        match self {
            RenderLayer::Plants | RenderLayer::TallPlants => 0.15,
            _ => 0.2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LiquidKind {
    Water,
    Lava,
}

impl LiquidKind {
    /// Water is drawn in its own translucent layer; lava is opaque.
    #[inline]
    pub fn layer(self) -> RenderLayer {
        match self {
            LiquidKind::Water => RenderLayer::Liquid,
            LiquidKind::Lava => RenderLayer::Solid,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            LiquidKind::Water => 0,
            LiquidKind::Lava => 1,
        }
    }
}

/// Per-block positional jitter used for foliage-style blocks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OffsetType {
    #[default]
    None,
    Xz,
    /// Like `Xz`, and collision boxes follow the offset.
    XzBoundingBox,
    Xyz,
}

/// Source of the color applied to tinted faces.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum BlockColor {
    #[default]
    White,
    Biome,
    Fixed([f32; 3]),
}

impl BlockColor {
    pub const WHITE_RGB: [f32; 3] = [1.0, 1.0, 1.0];

    #[inline]
    pub fn resolve(self, biome: [f32; 3]) -> [f32; 3] {
        match self {
            BlockColor::White => Self::WHITE_RGB,
            BlockColor::Biome => biome,
            BlockColor::Fixed(rgb) => rgb,
        }
    }
}

/// Axis-aligned block face. The discriminant doubles as the cull-flag bit index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Cull-flag bit for this face.
    #[inline]
    pub fn bit(self) -> u8 {
        1u8 << (self as u8)
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    #[inline]
    pub fn from_index(i: usize) -> Option<Face> {
        Face::ALL.get(i).copied()
    }

    pub fn from_name(s: &str) -> Option<Face> {
        match s {
            "up" | "pos_y" => Some(Face::PosY),
            "down" | "neg_y" => Some(Face::NegY),
            "east" | "pos_x" => Some(Face::PosX),
            "west" | "neg_x" => Some(Face::NegX),
            "south" | "pos_z" => Some(Face::PosZ),
            "north" | "neg_z" => Some(Face::NegZ),
            _ => None,
        }
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        let (x, y, z) = self.delta();
        Vec3::new(x as f32, y as f32, z as f32)
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }
}
