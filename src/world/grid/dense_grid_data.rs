//! Dense Grid Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in dense_grid_operations.rs

use crate::world::core::{Voxel, WorldExtent};

/// Flat 3D array of voxels with a fixed extent.
///
/// Cell `(x, y, z)` lives at `x + y * X + z * X * Y`. Every cell inside the
/// extent is defined; a fresh grid is all air.
#[derive(Clone, Debug)]
pub struct DenseGridWorld {
    pub extent: WorldExtent,
    pub cells: Vec<Voxel>,
}

/// Dense grid statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStats {
    pub cell_count: u64,
    pub solid_count: u64,
    pub memory_bytes: usize,
}
