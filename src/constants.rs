//! Shared constants for worlds, rays and the packed octree format.

/// World defaults
pub mod world {
    /// Default extent along X (grid is centered on X)
    pub const DEFAULT_SIZE_X: u32 = 128;
    /// Default extent along Y (grid is floor-aligned on Y)
    pub const DEFAULT_SIZE_Y: u32 = 64;
    /// Default extent along Z (grid is centered on Z)
    pub const DEFAULT_SIZE_Z: u32 = 128;

    /// Largest extent accepted on any axis. Keeps the octree root size
    /// representable and dense allocations sane.
    pub const MAX_EXTENT: u32 = 1 << 16;

    /// Largest number of cells a dense grid may allocate.
    pub const MAX_DENSE_CELLS: u64 = 1 << 28;
}

/// Ray query defaults
pub mod ray {
    /// Default cutoff distance for a ray query
    pub const DEFAULT_MAX_DISTANCE: f32 = 1000.0;

    /// Neighbor-normal vectors shorter than this fall back to +Y
    pub const NORMAL_LENGTH_THRESHOLD: f32 = 0.1;
}

/// Packed sparse voxel octree word layout.
///
/// | child pointer | is_far | child_is_leaf | child_has_data |
/// |       15 bits | 1 bit  | 8 bits        | 8 bits         |
/// |0            14|   15   |16           23| 24           31|
pub mod packed {
    /// Largest near child pointer (relative offset in words)
    pub const MAX_CHILD_POINTER: u32 = 0x7FFF;
    /// Set when the pointer field indexes the far-pointer table
    pub const IS_FAR_BIT: u32 = 0x8000;
    /// Shift of the child-is-leaf mask
    pub const CHILD_IS_LEAF_SHIFT: u32 = 16;
    /// Shift of the child-has-data mask
    pub const CHILD_HAS_DATA_SHIFT: u32 = 24;

    /// Preamble word holding the far table start
    pub const FAR_TABLE_START_WORD: usize = 0;
    /// Preamble word holding the palette start
    pub const PALETTE_START_WORD: usize = 1;
    /// Index of the root slot
    pub const ROOT_SLOT: usize = 2;

    /// Deepest octree the format accepts (root size 2^31)
    pub const MAX_LEVEL_SIZE: u32 = 31;
}

/// Terrain generation
pub mod terrain {
    /// Hill baseline as a fraction of world height
    pub const HILL_BASE_RATIO: f32 = 0.3;
    /// Vertical scale of the summed hill waves
    pub const HILL_AMPLITUDE: f32 = 8.0;
    /// Dirt cells under the grass cap before stone starts
    pub const DIRT_DEPTH: i32 = 3;

    pub const NOISE_SCALE: f64 = 0.02;
    pub const NOISE_AMPLITUDE: f64 = 12.0;
}
