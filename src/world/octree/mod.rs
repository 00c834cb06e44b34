//! Sparse voxel octree backend

mod octree_raycast;
mod sparse_octree_data;
pub mod sparse_octree_operations;

pub use octree_raycast::ray_cast;
pub use sparse_octree_data::{
    ChildOrder, OctreeNode, OctreeStats, SparseOctreeWorld, NODE_LEAF, NODE_UNIFORM, ROOT_NODE,
};

use crate::error::VoxelResult;
use crate::world::core::{Ray, RaycastHit, Voxel, WorldExtent};
use crate::world::interfaces::{VoxelWorld, VoxelWorldMut};
use cgmath::Vector3;

impl SparseOctreeWorld {
    /// All-air octree visiting children nearest first
    pub fn new(x: u32, y: u32, z: u32) -> VoxelResult<Self> {
        Self::with_child_order(x, y, z, ChildOrder::default())
    }

    pub fn with_child_order(x: u32, y: u32, z: u32, child_order: ChildOrder) -> VoxelResult<Self> {
        Ok(sparse_octree_operations::create_sparse_octree(
            WorldExtent::new(x, y, z)?,
            child_order,
        ))
    }

    /// Collapse uniform regions until nothing changes; returns the number
    /// of collapsed nodes
    pub fn compress_tree(&mut self) -> usize {
        sparse_octree_operations::compress_tree(self)
    }

    pub fn node_count(&self) -> u32 {
        sparse_octree_operations::node_count(self)
    }

    pub fn leaf_count(&self) -> u32 {
        sparse_octree_operations::leaf_count(self)
    }

    pub fn stats(&self) -> OctreeStats {
        sparse_octree_operations::get_stats(self)
    }

    pub fn validate(&self) -> Vec<String> {
        sparse_octree_operations::validate(self)
    }
}

impl VoxelWorld for SparseOctreeWorld {
    fn get_voxel(&self, x: i32, y: i32, z: i32) -> Voxel {
        sparse_octree_operations::get_voxel(self, x, y, z)
    }

    fn get_normal(&self, x: i32, y: i32, z: i32) -> Vector3<f32> {
        sparse_octree_operations::get_normal(self, x, y, z)
    }

    fn ray_cast(&self, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
        octree_raycast::ray_cast(self, ray, max_distance)
    }

    fn size(&self) -> WorldExtent {
        self.extent
    }

    fn memory_usage(&self) -> usize {
        sparse_octree_operations::memory_usage(self)
    }

    fn describe(&self) -> String {
        sparse_octree_operations::describe(self)
    }
}

impl VoxelWorldMut for SparseOctreeWorld {
    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) {
        sparse_octree_operations::set_voxel(self, x, y, z, voxel)
    }
}
