/// Camera Module - Data-Oriented Programming (DOP) style
///
/// This module follows pure DOP principles:
/// - camera_data.rs: Pure data structures with NO methods
/// - camera_operations.rs: Pure functions that operate on data

pub mod camera_data;
pub mod camera_operations;

// Re-export data structures
pub use camera_data::{CameraBasis, PinholeCamera};

// Re-export all operations
pub use camera_operations::{
    // Initialization
    init_camera,
    orbit_camera,

    // Updates
    update_aspect_ratio,
    update_fov,

    // Ray generation
    basis_ray,
    camera_basis,
    pixel_ray,
    subsample_rays,
};
