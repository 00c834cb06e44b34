use crate::constants::world::MAX_EXTENT;
use crate::error::{VoxelError, VoxelResult};
use cgmath::Vector3;

/// Integer size of a world along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorldExtent {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl WorldExtent {
    /// Validated extent. Every axis must be in `1..=MAX_EXTENT`.
    pub fn new(x: u32, y: u32, z: u32) -> VoxelResult<Self> {
        if x == 0 || y == 0 || z == 0 {
            return Err(VoxelError::InvalidExtent {
                size: (x, y, z),
                reason: "every axis must be at least 1".to_string(),
            });
        }
        if x > MAX_EXTENT || y > MAX_EXTENT || z > MAX_EXTENT {
            return Err(VoxelError::InvalidExtent {
                size: (x, y, z),
                reason: format!("axes are capped at {}", MAX_EXTENT),
            });
        }
        Ok(Self { x, y, z })
    }

    pub fn as_tuple(&self) -> (u32, u32, u32) {
        (self.x, self.y, self.z)
    }

    /// Whether a cell coordinate lies inside `[0,x)×[0,y)×[0,z)`
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.x
            && (y as u32) < self.y
            && (z as u32) < self.z
    }

    pub fn cell_count(&self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    pub fn max_axis(&self) -> u32 {
        self.x.max(self.y).max(self.z)
    }

    /// Offset from world space to grid space. The grid is centered on X and
    /// Z and its floor sits at y = 0.
    pub fn grid_offset(&self) -> Vector3<f32> {
        Vector3::new(self.x as f32 / 2.0, 0.0, self.z as f32 / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_extent_rejected() {
        assert!(WorldExtent::new(0, 4, 4).is_err());
        assert!(WorldExtent::new(4, 4, MAX_EXTENT + 1).is_err());
    }

    #[test]
    fn test_contains() {
        let e = WorldExtent::new(4, 2, 3).unwrap();
        assert!(e.contains(0, 0, 0));
        assert!(e.contains(3, 1, 2));
        assert!(!e.contains(4, 0, 0));
        assert!(!e.contains(-1, 0, 0));
        assert_eq!(e.cell_count(), 24);
    }

    #[test]
    fn test_grid_offset() {
        let e = WorldExtent::new(128, 64, 100).unwrap();
        assert_eq!(e.grid_offset(), Vector3::new(64.0, 0.0, 50.0));
    }
}
