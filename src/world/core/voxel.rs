use cgmath::Vector3;
use std::fmt;

/// Material identifier of a voxel. 0 is air, anything else is solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MaterialId(pub u32);

impl Default for MaterialId {
    fn default() -> Self {
        MaterialId::AIR
    }
}

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MaterialId::AIR => write!(f, "Air"),
            MaterialId::GRASS => write!(f, "Grass"),
            MaterialId::DIRT => write!(f, "Dirt"),
            MaterialId::STONE => write!(f, "Stone"),
            MaterialId::WATER => write!(f, "Water"),
            _ => write!(f, "Material({})", self.0),
        }
    }
}

impl MaterialId {
    pub const AIR: MaterialId = MaterialId(0);
    pub const GRASS: MaterialId = MaterialId(1);
    pub const DIRT: MaterialId = MaterialId(2);
    pub const STONE: MaterialId = MaterialId(3);
    pub const WATER: MaterialId = MaterialId(4);

    pub fn is_air(self) -> bool {
        self == MaterialId::AIR
    }
}

/// Packed color of an empty voxel (opaque black)
pub const AIR_COLOR: u32 = 0xFF00_0000;

/// Content of one cell. Copied by value out of queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voxel {
    pub material: MaterialId,
    /// 0xAARRGGBB
    pub color: u32,
    /// Optional cached surface normal, zero when unset
    pub normal: Vector3<f32>,
    pub density: u8,
    pub metadata: u8,
}

impl Default for Voxel {
    fn default() -> Self {
        Self::air()
    }
}

impl Voxel {
    pub const fn new(material: MaterialId, color: u32) -> Self {
        Self {
            material,
            color,
            normal: Vector3 {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
            density: 0,
            metadata: 0,
        }
    }

    pub const fn air() -> Self {
        Self::new(MaterialId::AIR, AIR_COLOR)
    }

    pub fn is_solid(&self) -> bool {
        !self.material.is_air()
    }

    /// Same material and color. Cached normal, density and metadata are
    /// not part of a voxel's stored identity in the octree.
    pub fn same_content(&self, other: &Voxel) -> bool {
        self.material == other.material && self.color == other.color
    }
}

/// Pack a linear RGB color (components clamped to 0..1) as opaque 0xAARRGGBB
pub fn rgb_to_color(rgb: Vector3<f32>) -> u32 {
    let r = (rgb.x.clamp(0.0, 1.0) * 255.0) as u32;
    let g = (rgb.y.clamp(0.0, 1.0) * 255.0) as u32;
    let b = (rgb.z.clamp(0.0, 1.0) * 255.0) as u32;
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

/// Unpack the RGB part of a 0xAARRGGBB color into 0..1 components
pub fn color_to_rgb(color: u32) -> Vector3<f32> {
    Vector3::new(
        ((color >> 16) & 0xFF) as f32 / 255.0,
        ((color >> 8) & 0xFF) as f32 / 255.0,
        (color & 0xFF) as f32 / 255.0,
    )
}

/// Default color of a material. `height_ratio` (0 at the floor, 1 at the
/// top of the world) shades grass lighter towards peaks.
pub fn default_color(material: MaterialId, height_ratio: f32) -> u32 {
    let h = height_ratio.clamp(0.0, 1.0);
    match material {
        MaterialId::AIR => AIR_COLOR,
        MaterialId::GRASS => rgb_to_color(Vector3::new(0.2 + 0.2 * h, 0.55 + 0.3 * h, 0.15)),
        MaterialId::DIRT => rgb_to_color(Vector3::new(0.45, 0.3, 0.15)),
        MaterialId::STONE => rgb_to_color(Vector3::new(0.5, 0.5, 0.52)),
        MaterialId::WATER => rgb_to_color(Vector3::new(0.15, 0.35, 0.8)),
        _ => 0xFFFF_FFFF,
    }
}

pub fn grass(height_ratio: f32) -> Voxel {
    Voxel::new(MaterialId::GRASS, default_color(MaterialId::GRASS, height_ratio))
}

pub fn dirt() -> Voxel {
    Voxel::new(MaterialId::DIRT, default_color(MaterialId::DIRT, 0.0))
}

pub fn stone() -> Voxel {
    Voxel::new(MaterialId::STONE, default_color(MaterialId::STONE, 0.0))
}

pub fn water() -> Voxel {
    Voxel::new(MaterialId::WATER, default_color(MaterialId::WATER, 0.0))
}
