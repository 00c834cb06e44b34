//! Persistence Module - packed octree codec and its binary file format
//!
//! The in-memory octree is a pointer tree over an arena; the packed form
//! is a flat, append-only `u32` buffer meant for storage and transfer.

// Data modules
pub mod packed_octree_data;

// Operations modules
pub mod octree_file_operations;
pub mod packed_octree_operations;

pub use octree_file_operations::{
    load_voxel_octree, read_voxel_octree, save_voxel_octree, write_voxel_octree,
};
pub use packed_octree_data::{
    PackedLayout, PackedOctree, PackedOctreeView, SparseVoxelOctreeHeader,
};
pub use packed_octree_operations::{
    create_packed_view, decode_octree, decode_octree_with_extent, encode_octree,
};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Packed buffer truncated: needed {needed} words, {available} available")]
    Truncated { needed: usize, available: usize },
    #[error("Packed layout invalid: far table at {far_start}, palette at {palette_start}")]
    BadLayout {
        far_start: usize,
        palette_start: usize,
    },
    #[error("Child pointer in slot {slot} targets {target}, outside the node region ending at {limit}")]
    DanglingPointer {
        slot: usize,
        target: usize,
        limit: usize,
    },
    #[error("Far pointer {index} in slot {slot} exceeds the far table of {table_len} entries")]
    MissingFarPointer {
        slot: usize,
        index: usize,
        table_len: usize,
    },
    #[error("Slot {target} is referenced again from slot {slot}")]
    AliasedSlot { slot: usize, target: usize },
    #[error("Far table overflow: {needed} far pointers needed, at most {max} addressable")]
    FarTableOverflow { needed: usize, max: usize },
    #[error("Node nesting exceeds max level size {max_level_size}")]
    DepthOverflow { max_level_size: u32 },
    #[error("Packed root size {root_size} cannot hold a {extent:?} world")]
    ExtentMismatch {
        root_size: u32,
        extent: (u32, u32, u32),
    },
    #[error("Bad palette: {reason}")]
    BadPalette { reason: String },
}
