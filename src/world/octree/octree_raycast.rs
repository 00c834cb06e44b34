//! Recursive ray descent over the octree
//!
//! The world extent is slab-tested once, then every node whose cube the ray
//! crosses is visited with the parameter interval clipped to that cube.

use super::sparse_octree_data::{ChildOrder, SparseOctreeWorld, ROOT_NODE};
use super::sparse_octree_operations::{is_leaf, node_voxel};
use crate::world::core::aabb::{aabb_center, cube_aabb};
use crate::world::core::{ray_interval, Aabb, BlockFace, Ray, RaycastHit, Voxel};
use cgmath::{Point3, Vector3};
use std::cmp::Ordering;

/// Leaf hit in grid space
struct LeafHit {
    distance: f32,
    normal: Vector3<f32>,
    voxel: Voxel,
}

/// Cast a ray through the octree.
///
/// `ray` is in world space; the octree shares the dense grid's placement
/// (X/Z centered, floor at y = 0).
pub fn ray_cast(world: &SparseOctreeWorld, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
    let offset = world.extent.grid_offset();
    let local = ray.translated(offset);

    let bounds = Aabb {
        min: Point3::new(0.0, 0.0, 0.0),
        max: Point3::new(
            world.extent.x as f32,
            world.extent.y as f32,
            world.extent.z as f32,
        ),
    };
    let (t_enter, t_exit) = ray_interval(&bounds, &local, 0.0, max_distance)?;

    let hit = cast_node(world, ROOT_NODE, &local, t_enter, t_exit)?;
    Some(RaycastHit {
        position: ray.at(hit.distance),
        normal: hit.normal,
        distance: hit.distance,
        voxel: hit.voxel,
    })
}

fn cast_node(
    world: &SparseOctreeWorld,
    index: u32,
    ray: &Ray,
    t_min: f32,
    t_max: f32,
) -> Option<LeafHit> {
    let node = &world.nodes[index as usize];

    if is_leaf(node) {
        if node.material == 0 {
            return None;
        }
        let aabb = cube_aabb(node.min, node.size);
        let (t0, _) = ray_interval(&aabb, ray, t_min, t_max)?;
        if t0 >= t_max {
            return None;
        }
        let face = BlockFace::from_local_offset(ray.at(t0) - aabb_center(&aabb));
        return Some(LeafHit {
            distance: t0,
            normal: face.normal(),
            voxel: node_voxel(node),
        });
    }

    let mut candidates: Vec<(f32, f32, u32)> = Vec::with_capacity(8);
    for &child in &node.children {
        if child == 0 {
            continue;
        }
        let child_node = &world.nodes[child as usize];
        if is_leaf(child_node) && child_node.material == 0 {
            continue;
        }
        let aabb = cube_aabb(child_node.min, child_node.size);
        if let Some((t0, t1)) = ray_interval(&aabb, ray, t_min, t_max) {
            candidates.push((t0, t1, child));
        }
    }

    if world.child_order == ChildOrder::NearestFirst {
        // Sibling cubes are disjoint, so their intervals along the ray are too
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    }

    candidates
        .into_iter()
        .find_map(|(t0, t1, child)| cast_node(world, child, ray, t0, t1))
}
