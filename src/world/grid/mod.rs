//! Dense regular grid backend

mod dense_grid_data;
pub mod dense_grid_operations;

pub use dense_grid_data::{DenseGridWorld, GridStats};

use crate::error::VoxelResult;
use crate::world::core::{Ray, RaycastHit, Voxel, WorldExtent};
use crate::world::interfaces::{VoxelWorld, VoxelWorldMut};
use cgmath::Vector3;

impl DenseGridWorld {
    /// Allocate an all-air grid of `x * y * z` cells
    pub fn new(x: u32, y: u32, z: u32) -> VoxelResult<Self> {
        dense_grid_operations::create_dense_grid(WorldExtent::new(x, y, z)?)
    }

    pub fn stats(&self) -> GridStats {
        dense_grid_operations::get_stats(self)
    }
}

impl VoxelWorld for DenseGridWorld {
    fn get_voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        dense_grid_operations::get_voxel(self, x, y, z)
    }

    fn get_normal(&self, x: i32, y: i32, z: i32) -> Vector3<f32> {
        dense_grid_operations::get_normal(self, x, y, z)
    }

    fn ray_cast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        dense_grid_operations::ray_cast(self, ray, max_distance)
    }

    fn size(&self) -> WorldExtent {
        self.extent
    }

    fn memory_usage(&self) -> usize {
        dense_grid_operations::memory_usage(self)
    }

    fn describe(&self) -> String {
        dense_grid_operations::describe(self)
    }
}

impl VoxelWorldMut for DenseGridWorld {
    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) {
        dense_grid_operations::set_voxel(self, x, y, z, voxel)
    }
}
