/// Axis-Aligned Bounding Box and the ray slab test
///
/// Pure functions over plain data, shared by the dense DDA entry test and
/// the octree descent.
use super::Ray;
use cgmath::Point3;

/// Axis-Aligned Bounding Box - pure data structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

/// Axis-aligned cube with its minimum corner at `min` and edge length `size`
pub fn cube_aabb(min: [u32; 3], size: u32) -> Aabb {
    let s = size as f32;
    Aabb {
        min: Point3::new(min[0] as f32, min[1] as f32, min[2] as f32),
        max: Point3::new(
            min[0] as f32 + s,
            min[1] as f32 + s,
            min[2] as f32 + s,
        ),
    }
}

/// Get center point of AABB
pub fn aabb_center(aabb: &Aabb) -> Point3<f32> {
    Point3::new(
        (aabb.min.x + aabb.max.x) * 0.5,
        (aabb.min.y + aabb.max.y) * 0.5,
        (aabb.min.z + aabb.max.z) * 0.5,
    )
}

/// Clip the parameter interval `[t_min, t_max]` of `ray` against `aabb`.
///
/// Returns the clipped `(t_enter, t_exit)` or `None` when the interval is
/// empty. An axis where the ray direction is exactly zero is parallel to
/// that slab: the ray misses if its origin lies outside the half-open slab
/// `[min, max)`, otherwise the axis imposes no constraint. Half-open matches
/// the `floor` cell assignment of the grid traversal.
pub fn ray_interval(aabb: &Aabb, ray: &Ray, t_min: f32, t_max: f32) -> Option<(f32, f32)> {
    let mut t0 = t_min;
    let mut t1 = t_max;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        let box_min = aabb.min[axis];
        let box_max = aabb.max[axis];

        if dir == 0.0 {
            // Ray is parallel to axis
            if origin < box_min || origin >= box_max {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / dir;
        let mut t_near = (box_min - origin) * inv_d;
        let mut t_far = (box_max - origin) * inv_d;
        if inv_d < 0.0 {
            std::mem::swap(&mut t_near, &mut t_far);
        }

        t0 = t0.max(t_near);
        t1 = t1.min(t_far);
        if t0 > t1 {
            return None;
        }
    }

    Some((t0, t1))
}
