use super::Voxel;
use crate::error::{VoxelError, VoxelResult};
use cgmath::{InnerSpace, Point3, Vector3};

/// A validated ray: finite origin, unit-length direction.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Build a ray, normalizing `direction`. Zero-length or non-finite
    /// directions are rejected so traversal never divides by a zero vector.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> VoxelResult<Self> {
        let length = direction.magnitude();
        if !length.is_finite() || length <= f32::EPSILON {
            return Err(VoxelError::DegenerateRay {
                direction: [direction.x, direction.y, direction.z],
            });
        }
        if !(origin.x.is_finite() && origin.y.is_finite() && origin.z.is_finite()) {
            return Err(VoxelError::DegenerateRay {
                direction: [direction.x, direction.y, direction.z],
            });
        }

        Ok(Self {
            origin,
            direction: direction / length,
        })
    }

    /// Point at parameter `t` (distance, since the direction is unit length)
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Same ray shifted by `offset`
    pub fn translated(&self, offset: Vector3<f32>) -> Ray {
        Ray {
            origin: self.origin + offset,
            direction: self.direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFace {
    Right,  // +X
    Left,   // -X
    Top,    // +Y
    Bottom, // -Y
    Front,  // +Z
    Back,   // -Z
}

impl BlockFace {
    pub fn normal(&self) -> Vector3<f32> {
        match self {
            BlockFace::Right => Vector3::new(1.0, 0.0, 0.0),
            BlockFace::Left => Vector3::new(-1.0, 0.0, 0.0),
            BlockFace::Top => Vector3::new(0.0, 1.0, 0.0),
            BlockFace::Bottom => Vector3::new(0.0, -1.0, 0.0),
            BlockFace::Front => Vector3::new(0.0, 0.0, 1.0),
            BlockFace::Back => Vector3::new(0.0, 0.0, -1.0),
        }
    }

    /// Face of a box whose center is offset from `point` by `local`, picked
    /// by the axis with the strictly largest displacement (ties go to Z).
    pub fn from_local_offset(local: Vector3<f32>) -> BlockFace {
        let abs = Vector3::new(local.x.abs(), local.y.abs(), local.z.abs());

        if abs.x > abs.y && abs.x > abs.z {
            if local.x > 0.0 {
                BlockFace::Right
            } else {
                BlockFace::Left
            }
        } else if abs.y > abs.z {
            if local.y > 0.0 {
                BlockFace::Top
            } else {
                BlockFace::Bottom
            }
        } else if local.z > 0.0 {
            BlockFace::Front
        } else {
            BlockFace::Back
        }
    }
}

/// Nearest surface found by a ray query
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// Hit point in world space
    pub position: Point3<f32>,
    /// Unit surface normal at the hit
    pub normal: Vector3<f32>,
    /// Distance along the ray
    pub distance: f32,
    pub voxel: Voxel,
}
