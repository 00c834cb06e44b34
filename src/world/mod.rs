//! World Module
//!
//! A bounded solid/void volume with two interchangeable backends.
//!
//! # Architecture Overview
//!
//! - **Core**: Voxel, Ray, extents, the slab test and the neighbor normal
//! - **Grid**: Dense flat array, rays step cell by cell (DDA)
//! - **Octree**: Sparse arena tree with uniform-region compression
//! - **Interfaces**: `VoxelWorld` capability set and the `WorldBackend` variant
//! - **Generation**: Terrain generators writing through `VoxelWorldMut`
//!
//! # Design Principles
//!
//! 1. **DOP architecture**: `*_data.rs` holds data, `*_operations.rs` transforms it
//! 2. **Read-mostly**: rays borrow a world shared, edits borrow it exclusively
//! 3. **No silent failure**: out-of-range queries are defined (air or a miss)

pub mod core;
pub mod generation;
pub mod grid;
pub mod interfaces;
pub mod octree;

// Re-export core types for convenience
pub use core::{BlockFace, MaterialId, Ray, RaycastHit, Voxel, WorldExtent};

pub use generation::{
    HillyTerrainGenerator, NoiseTerrainGenerator, TerrainGenerator, TestSceneGenerator,
};
pub use grid::DenseGridWorld;
pub use interfaces::{BackendKind, VoxelWorld, VoxelWorldMut, WorldBackend};
pub use octree::{ChildOrder, OctreeStats, SparseOctreeWorld};
