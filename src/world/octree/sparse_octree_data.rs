//! Sparse Voxel Octree Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in sparse_octree_operations.rs

use crate::world::core::WorldExtent;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Node is a leaf: its material/color cover its whole cube
pub const NODE_LEAF: u32 = 1 << 0;
/// Leaf produced by collapsing 8 identical children
pub const NODE_UNIFORM: u32 = 1 << 1;

/// Index of the root node in the arena. Never a child of anything, so 0 in
/// a child slot means "no child".
pub const ROOT_NODE: u32 = 0;

/// Octree node stored in the arena
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct OctreeNode {
    /// Child indices by octant (bit0 = +X, bit1 = +Y, bit2 = +Z), 0 = empty
    pub children: [u32; 8],
    /// Material id. Authoritative only on leaves; on internal nodes it is
    /// the template copied into newly created children.
    pub material: u32,
    /// 0xAARRGGBB, same rules as `material`
    pub color: u32,
    /// Minimum corner of the node's cube
    pub min: [u32; 3],
    /// Edge length of the node's cube
    pub size: u32,
    /// NODE_LEAF | NODE_UNIFORM
    pub flags: u32,
}

impl OctreeNode {
    pub const EMPTY: Self = Self {
        children: [0; 8],
        material: 0,
        color: 0,
        min: [0; 3],
        size: 0,
        flags: 0,
    };
}

/// Order in which the ray descent visits the children of an internal node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildOrder {
    /// Increasing entry distance; the first hit found is the nearest one
    #[default]
    NearestFirst,
    /// Increasing octant index. Can return a farther sibling's hit.
    OctantIndex,
}

/// Sparse voxel octree over an arena of nodes
#[derive(Debug, Clone)]
pub struct SparseOctreeWorld {
    /// Node arena, root at `ROOT_NODE`
    pub nodes: Vec<OctreeNode>,
    /// Released arena slots available for reuse
    pub free_nodes: Vec<u32>,

    pub extent: WorldExtent,
    /// Smallest power of two >= the largest world axis
    pub root_size: u32,
    /// log2(root_size)
    pub max_depth: u32,
    pub child_order: ChildOrder,
}

/// Octree statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctreeStats {
    pub node_count: u32,
    pub leaf_count: u32,
    pub max_depth: u32,
    pub root_size: u32,
    pub memory_bytes: usize,
}
