//! Packed Octree Data - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in packed_octree_operations.rs
//!
//! Word stream layout:
//! - `data[0]`: first word of the far-pointer table
//! - `data[1]`: first word of the palette
//! - `data[2..far_start)`: node slots, root at slot 2 (absent for an all-air world)
//! - `data[far_start..palette_start)`: far pointers, absolute slot indices
//! - `data[palette_start..)`: palette, `(material, color)` word pairs
//!
//! A node descriptor packs the child pointer in bits 0..15 (bit 15 = far),
//! `childIsLeaf` in bits 16..23 and `childHasData` in bits 24..31. Leaf
//! slots hold a palette index.

use bytemuck::{Pod, Zeroable};
use static_assertions::assert_eq_size;

/// On-disk header: the root cube is `2^max_level_size` cells wide
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct SparseVoxelOctreeHeader {
    pub max_level_size: u32,
}

assert_eq_size!(SparseVoxelOctreeHeader, u32);

/// Header plus the flat word buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedOctree {
    pub header: SparseVoxelOctreeHeader,
    pub data: Vec<u32>,
}

/// Validated section boundaries of a packed buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedLayout {
    pub far_start: usize,
    pub palette_start: usize,
    pub palette_len: usize,
    pub root_size: u32,
}

/// Read-only lookups straight over a packed buffer, no tree is built
#[derive(Debug, Clone, Copy)]
pub struct PackedOctreeView<'a> {
    pub packed: &'a PackedOctree,
    pub layout: PackedLayout,
}
