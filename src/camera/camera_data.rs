//! Camera data structures - Pure DOP
//!
//! NO METHODS. Just data.
//! All transformations happen in camera_operations.rs

use cgmath::{Point3, Vector3};

/// Pinhole camera that generates primary rays
#[derive(Debug, Clone, Copy)]
pub struct PinholeCamera {
    /// Eye position in world space
    pub position: Point3<f32>,

    /// Point the camera looks at
    pub target: Point3<f32>,

    /// Approximate up direction, must not be parallel to the view direction
    pub up: Vector3<f32>,

    /// Field of view (vertical, radians)
    pub fov_y_rad: f32,

    /// Aspect ratio (width / height)
    pub aspect: f32,
}

impl Default for PinholeCamera {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 40.0, 80.0),
            target: Point3::new(0.0, 10.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov_y_rad: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
        }
    }
}

/// Orthonormal view frame plus the image plane half extents at distance 1
#[derive(Debug, Clone, Copy)]
pub struct CameraBasis {
    pub origin: Point3<f32>,
    pub forward: Vector3<f32>,
    pub right: Vector3<f32>,
    pub up: Vector3<f32>,
    pub half_width: f32,
    pub half_height: f32,
}
