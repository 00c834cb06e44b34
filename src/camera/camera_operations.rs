//! Camera operations - Pure DOP functions
//!
//! All functions are pure: they take data, return new data, no side effects.
//! No methods, no self, just transformations.

use super::camera_data::{CameraBasis, PinholeCamera};
use crate::error::{VoxelError, VoxelResult};
use crate::world::core::Ray;
use cgmath::{InnerSpace, Point3, Vector3};

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Camera at `position` looking at `target` with the default lens
pub fn init_camera(position: Point3<f32>, target: Point3<f32>) -> PinholeCamera {
    PinholeCamera {
        position,
        target,
        ..Default::default()
    }
}

/// Camera on a sphere around `target`. `theta` turns around +Y, `phi` is
/// the elevation.
pub fn orbit_camera(target: Point3<f32>, distance: f32, theta: f32, phi: f32) -> PinholeCamera {
    let offset = Vector3::new(
        distance * phi.cos() * theta.sin(),
        distance * phi.sin(),
        distance * phi.cos() * theta.cos(),
    );
    init_camera(target + offset, target)
}

// ============================================================================
// UPDATES
// ============================================================================

/// Update aspect ratio (e.g., on resize)
pub fn update_aspect_ratio(camera: &PinholeCamera, width: u32, height: u32) -> PinholeCamera {
    let mut new_camera = *camera;
    new_camera.aspect = width as f32 / height.max(1) as f32;
    new_camera
}

/// Update FOV
pub fn update_fov(camera: &PinholeCamera, fov_degrees: f32) -> PinholeCamera {
    let mut new_camera = *camera;
    new_camera.fov_y_rad = fov_degrees.to_radians();
    new_camera
}

// ============================================================================
// RAY GENERATION
// ============================================================================

/// View frame of a camera. Fails when the eye sits on the target, when
/// `up` is parallel to the view direction, or when the lens is unusable.
pub fn camera_basis(camera: &PinholeCamera) -> VoxelResult<CameraBasis> {
    let view = camera.target - camera.position;
    if !(view.magnitude() > f32::EPSILON) {
        return Err(VoxelError::DegenerateRay {
            direction: [view.x, view.y, view.z],
        });
    }
    let forward = view.normalize();

    let side = forward.cross(camera.up);
    if !(side.magnitude() > 1e-6) {
        return Err(VoxelError::InvalidConfig {
            field: "camera.up".to_string(),
            value: format!("{:?}", camera.up),
            reason: "up is parallel to the view direction".to_string(),
        });
    }
    let right = side.normalize();
    let up = right.cross(forward);

    if !(camera.fov_y_rad > 0.0 && camera.fov_y_rad < std::f32::consts::PI) {
        return Err(VoxelError::InvalidConfig {
            field: "camera.fov_y_rad".to_string(),
            value: camera.fov_y_rad.to_string(),
            reason: "must be in (0, pi)".to_string(),
        });
    }
    if !(camera.aspect > 0.0 && camera.aspect.is_finite()) {
        return Err(VoxelError::InvalidConfig {
            field: "camera.aspect".to_string(),
            value: camera.aspect.to_string(),
            reason: "must be positive".to_string(),
        });
    }

    let half_height = (camera.fov_y_rad * 0.5).tan();
    Ok(CameraBasis {
        origin: camera.position,
        forward,
        right,
        up,
        half_width: half_height * camera.aspect,
        half_height,
    })
}

/// Ray through image-plane coordinates `(u, v)`, both in `[0, 1]`, with
/// `v = 0` at the top edge
pub fn basis_ray(basis: &CameraBasis, u: f32, v: f32) -> VoxelResult<Ray> {
    let x = (2.0 * u - 1.0) * basis.half_width;
    let y = (1.0 - 2.0 * v) * basis.half_height;
    Ray::new(basis.origin, basis.forward + basis.right * x + basis.up * y)
}

/// Ray through the center of pixel `(px, py)`
pub fn pixel_ray(
    basis: &CameraBasis,
    px: u32,
    py: u32,
    width: u32,
    height: u32,
) -> VoxelResult<Ray> {
    basis_ray(
        basis,
        (px as f32 + 0.5) / width as f32,
        (py as f32 + 0.5) / height as f32,
    )
}

/// `grid * grid` stratified rays inside pixel `(px, py)`, one per sub-cell
/// center
pub fn subsample_rays(
    basis: &CameraBasis,
    px: u32,
    py: u32,
    width: u32,
    height: u32,
    grid: u32,
) -> VoxelResult<Vec<Ray>> {
    let grid = grid.max(1);
    let step = 1.0 / grid as f32;
    let mut rays = Vec::with_capacity((grid * grid) as usize);

    for sy in 0..grid {
        for sx in 0..grid {
            let u = (px as f32 + (sx as f32 + 0.5) * step) / width as f32;
            let v = (py as f32 + (sy as f32 + 0.5) * step) / height as f32;
            rays.push(basis_ray(basis, u, v)?);
        }
    }
    Ok(rays)
}
