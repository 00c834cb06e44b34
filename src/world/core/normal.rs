use super::WorldExtent;
use crate::constants::ray::NORMAL_LENGTH_THRESHOLD;
use cgmath::{InnerSpace, Vector3};

/// Face-normal approximation from the six neighbors of a cell.
///
/// Per axis: -1 if the in-world neighbor on the negative side is empty,
/// else +1 if the in-world neighbor on the positive side is empty, else 0.
/// Neighbors beyond the world edge are not consulted. An enclosed cell
/// yields +Y. This is a cheap approximation, not a density gradient.
pub fn estimate_face_normal<F>(
    extent: &WorldExtent,
    x: i32,
    y: i32,
    z: i32,
    is_solid: F,
) -> Vector3<f32>
where
    F: Fn(i32, i32, i32) -> bool,
{
    let mut normal = Vector3::new(0.0f32, 0.0, 0.0);

    if x > 0 && !is_solid(x - 1, y, z) {
        normal.x = -1.0;
    } else if x < extent.x as i32 - 1 && !is_solid(x + 1, y, z) {
        normal.x = 1.0;
    }

    if y > 0 && !is_solid(x, y - 1, z) {
        normal.y = -1.0;
    } else if y < extent.y as i32 - 1 && !is_solid(x, y + 1, z) {
        normal.y = 1.0;
    }

    if z > 0 && !is_solid(x, y, z - 1) {
        normal.z = -1.0;
    } else if z < extent.z as i32 - 1 && !is_solid(x, y, z + 1) {
        normal.z = 1.0;
    }

    if normal.magnitude() < NORMAL_LENGTH_THRESHOLD {
        return Vector3::new(0.0, 1.0, 0.0);
    }

    normal.normalize()
}
