//! Clean interfaces for the voxel world system
//!
//! `VoxelWorld` is the backend-agnostic query surface a renderer talks to.
//! `WorldBackend` is the tagged variant over the two storage backends.

use crate::world::core::{Ray, RaycastHit, Voxel, WorldExtent};
use crate::world::grid::DenseGridWorld;
use crate::world::octree::SparseOctreeWorld;
use cgmath::Vector3;
use serde::{Deserialize, Serialize};

/// Read-only capability set shared by every world backend.
///
/// Out-of-range coordinates are not errors: they read as air.
pub trait VoxelWorld {
    fn get_voxel(&self, x: i32, y: i32, z: i32) -> Voxel;

    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.get_voxel(x, y, z).is_solid()
    }

    /// Neighbor-based face normal of a cell
    fn get_normal(&self, x: i32, y: i32, z: i32) -> Vector3<f32>;

    /// Nearest surface along `ray` closer than `max_distance`, None on a miss.
    /// The ray origin is in world space (grid centered on X/Z, floor at y = 0).
    fn ray_cast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit>;

    fn size(&self) -> WorldExtent;

    fn memory_usage(&self) -> usize;

    fn describe(&self) -> String;
}

/// Mutation entry point used by generators and editors
pub trait VoxelWorldMut: VoxelWorld {
    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel);
}

/// Which storage backend a world uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    #[default]
    Dense,
    Sparse,
}

/// A world of either backend
#[derive(Debug, Clone)]
pub enum WorldBackend {
    Dense(DenseGridWorld),
    Sparse(SparseOctreeWorld),
}

impl WorldBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            WorldBackend::Dense(_) => BackendKind::Dense,
            WorldBackend::Sparse(_) => BackendKind::Sparse,
        }
    }

    pub fn as_sparse(&self) -> Option<&SparseOctreeWorld> {
        match self {
            WorldBackend::Sparse(octree) => Some(octree),
            WorldBackend::Dense(_) => None,
        }
    }

    pub fn as_sparse_mut(&mut self) -> Option<&mut SparseOctreeWorld> {
        match self {
            WorldBackend::Sparse(octree) => Some(octree),
            WorldBackend::Dense(_) => None,
        }
    }

    fn inner(&self) -> &dyn VoxelWorld {
        match self {
            WorldBackend::Dense(grid) => grid,
            WorldBackend::Sparse(octree) => octree,
        }
    }
}

impl VoxelWorld for WorldBackend {
    fn get_voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        self.inner().get_voxel(x, y, z)
    }

    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        self.inner().is_solid(x, y, z)
    }

    fn get_normal(&self, x: i32, y: i32, z: i32) -> Vector3<f32> {
        self.inner().get_normal(x, y, z)
    }

    fn ray_cast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        self.inner().ray_cast(ray, max_distance)
    }

    fn size(&self) -> WorldExtent {
        self.inner().size()
    }

    fn memory_usage(&self) -> usize {
        self.inner().memory_usage()
    }

    fn describe(&self) -> String {
        self.inner().describe()
    }
}

impl VoxelWorldMut for WorldBackend {
    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) {
        match self {
            WorldBackend::Dense(grid) => grid.set_voxel(x, y, z, voxel),
            WorldBackend::Sparse(octree) => octree.set_voxel(x, y, z, voxel),
        }
    }
}

impl From<DenseGridWorld> for WorldBackend {
    fn from(grid: DenseGridWorld) -> Self {
        WorldBackend::Dense(grid)
    }
}

impl From<SparseOctreeWorld> for WorldBackend {
    fn from(octree: SparseOctreeWorld) -> Self {
        WorldBackend::Sparse(octree)
    }
}
