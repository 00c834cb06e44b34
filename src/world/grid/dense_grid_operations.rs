//! Dense Grid Operations - Pure DOP Functions
//!
//! Free functions over `DenseGridWorld`: cell access, the neighbor normal
//! and incremental (Amanatides-Woo) ray traversal.

use super::dense_grid_data::{DenseGridWorld, GridStats};
use crate::constants::world::MAX_DENSE_CELLS;
use crate::error::{VoxelError, VoxelResult};
use crate::world::core::{
    estimate_face_normal, ray_interval, Aabb, Ray, RaycastHit, Voxel, WorldExtent,
};
use cgmath::{Point3, Vector3};

/// Create a dense grid of the given extent, filled with air
pub fn create_dense_grid(extent: WorldExtent) -> VoxelResult<DenseGridWorld> {
    let cell_count = extent.cell_count();
    if cell_count > MAX_DENSE_CELLS {
        return Err(VoxelError::InvalidExtent {
            size: extent.as_tuple(),
            reason: format!(
                "{} cells exceed the dense grid limit of {}",
                cell_count, MAX_DENSE_CELLS
            ),
        });
    }

    log::debug!(
        "[DenseGrid::create] Allocating {}x{}x{} grid ({} cells)",
        extent.x,
        extent.y,
        extent.z,
        cell_count
    );

    Ok(DenseGridWorld {
        extent,
        cells: vec![Voxel::air(); cell_count as usize],
    })
}

/// Flat index of a cell, or None outside the extent
pub fn cell_index(grid: &DenseGridWorld, x: i32, y: i32, z: i32) -> Option<usize> {
    if !grid.extent.contains(x, y, z) {
        return None;
    }
    let (sx, sy) = (grid.extent.x as usize, grid.extent.y as usize);
    Some(x as usize + y as usize * sx + z as usize * sx * sy)
}

/// Get voxel at position, air if out of bounds
pub fn get_voxel(grid: &DenseGridWorld, x: i32, y: i32, z: i32) -> Voxel {
    match cell_index(grid, x, y, z) {
        Some(index) => grid.cells[index],
        None => Voxel::air(),
    }
}

/// Set voxel at position. Writes outside the extent are dropped.
pub fn set_voxel(grid: &mut DenseGridWorld, x: i32, y: i32, z: i32, voxel: Voxel) {
    match cell_index(grid, x, y, z) {
        Some(index) => grid.cells[index] = voxel,
        None => log::trace!(
            "[DenseGrid::set_voxel] Ignoring write outside extent at ({}, {}, {})",
            x,
            y,
            z
        ),
    }
}

pub fn is_solid(grid: &DenseGridWorld, x: i32, y: i32, z: i32) -> bool {
    get_voxel(grid, x, y, z).is_solid()
}

/// Neighbor-based face normal of a cell
pub fn get_normal(grid: &DenseGridWorld, x: i32, y: i32, z: i32) -> Vector3<f32> {
    estimate_face_normal(&grid.extent, x, y, z, |nx, ny, nz| is_solid(grid, nx, ny, nz))
}

/// Number of non-air cells
pub fn solid_count(grid: &DenseGridWorld) -> u64 {
    grid.cells.iter().filter(|v| v.is_solid()).count() as u64
}

pub fn memory_usage(grid: &DenseGridWorld) -> usize {
    grid.cells.len() * std::mem::size_of::<Voxel>() + std::mem::size_of::<DenseGridWorld>()
}

pub fn get_stats(grid: &DenseGridWorld) -> GridStats {
    GridStats {
        cell_count: grid.extent.cell_count(),
        solid_count: solid_count(grid),
        memory_bytes: memory_usage(grid),
    }
}

pub fn describe(grid: &DenseGridWorld) -> String {
    format!(
        "Grid ({}x{}x{}), Cells: {}, Memory: {} KB",
        grid.extent.x,
        grid.extent.y,
        grid.extent.z,
        grid.extent.cell_count(),
        memory_usage(grid) / 1024
    )
}

/// Cast a ray through the grid, stepping one cell at a time.
///
/// The ray is moved into grid space (X/Z centered, floor at y = 0). A ray
/// starting outside the grid is first advanced to its slab-test entry
/// point. Distances are measured from the ray origin in both cases.
pub fn ray_cast(grid: &DenseGridWorld, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
    let local = ray.translated(grid.extent.grid_offset());
    let size = [
        grid.extent.x as i32,
        grid.extent.y as i32,
        grid.extent.z as i32,
    ];

    let start = [
        local.origin.x.floor() as i32,
        local.origin.y.floor() as i32,
        local.origin.z.floor() as i32,
    ];

    let t_entry = if grid.extent.contains(start[0], start[1], start[2]) {
        0.0
    } else {
        let bounds = Aabb {
            min: Point3::new(0.0, 0.0, 0.0),
            max: Point3::new(size[0] as f32, size[1] as f32, size[2] as f32),
        };
        let (t_enter, _) = ray_interval(&bounds, &local, 0.0, max_distance)?;
        t_enter
    };

    let entry = local.at(t_entry);
    let mut cell = [0i32; 3];
    let mut step = [0i32; 3];
    let mut t_max = [f32::INFINITY; 3];
    let mut t_delta = [f32::INFINITY; 3];

    for axis in 0..3 {
        // The entry point may sit exactly on the far face
        cell[axis] = (entry[axis].floor() as i32).clamp(0, size[axis] - 1);

        let dir = local.direction[axis];
        if dir > 0.0 {
            step[axis] = 1;
            t_max[axis] = ((cell[axis] + 1) as f32 - local.origin[axis]) / dir;
            t_delta[axis] = 1.0 / dir;
        } else if dir < 0.0 {
            step[axis] = -1;
            t_max[axis] = (cell[axis] as f32 - local.origin[axis]) / dir;
            t_delta[axis] = -1.0 / dir;
        }
    }

    let mut distance = t_entry;

    loop {
        if distance >= max_distance {
            return None;
        }
        if !grid.extent.contains(cell[0], cell[1], cell[2]) {
            return None;
        }

        let voxel = get_voxel(grid, cell[0], cell[1], cell[2]);
        if voxel.is_solid() {
            return Some(RaycastHit {
                position: ray.at(distance),
                normal: get_normal(grid, cell[0], cell[1], cell[2]),
                distance,
                voxel,
            });
        }

        let axis = if t_max[0] < t_max[1] && t_max[0] < t_max[2] {
            0
        } else if t_max[1] < t_max[2] {
            1
        } else {
            2
        };

        cell[axis] += step[axis];
        distance = t_max[axis];
        t_max[axis] += t_delta[axis];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::core::MaterialId;
    use cgmath::InnerSpace;

    fn grid(x: u32, y: u32, z: u32) -> DenseGridWorld {
        create_dense_grid(WorldExtent::new(x, y, z).unwrap()).unwrap()
    }

    fn solid(material: u32) -> Voxel {
        Voxel::new(MaterialId(material), 0xFF11_2233)
    }

    #[test]
    fn test_set_get_roundtrip() {
        let mut g = grid(4, 3, 2);
        set_voxel(&mut g, 3, 2, 1, solid(7));
        assert_eq!(get_voxel(&g, 3, 2, 1), solid(7));
        assert!(is_solid(&g, 3, 2, 1));
        assert!(!is_solid(&g, 0, 0, 0));
    }

    #[test]
    fn test_out_of_range_read_is_air() {
        let g = grid(2, 2, 2);
        assert_eq!(get_voxel(&g, -1, 0, 0), Voxel::air());
        assert_eq!(get_voxel(&g, 0, 2, 0), Voxel::air());
    }

    #[test]
    fn test_out_of_range_write_is_noop() {
        let mut g = grid(2, 2, 2);
        set_voxel(&mut g, 5, 0, 0, solid(1));
        assert_eq!(solid_count(&g), 0);
    }

    #[test]
    fn test_normal_of_floor() {
        let mut g = grid(3, 3, 3);
        for x in 0..3 {
            for z in 0..3 {
                set_voxel(&mut g, x, 0, z, solid(1));
            }
        }
        assert_eq!(get_normal(&g, 1, 0, 1), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_ray_hits_center_cell() {
        // Cell (2,2,2) in grid space; world origin maps to grid (2,0,2)
        let mut g = grid(4, 4, 4);
        set_voxel(&mut g, 2, 2, 2, solid(1));

        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.5, 2.5, 0.5)).unwrap();
        let hit = ray_cast(&g, &ray, 100.0).expect("ray should hit");

        assert_eq!(hit.voxel.material, MaterialId(1));
        // Enters the cell through its y = 2 face
        assert!((hit.position.y - 2.0).abs() < 1e-4);
        assert!((hit.position.x - 0.4).abs() < 1e-4);
        assert!((hit.distance - 0.8 * Vector3::new(0.5f32, 2.5, 0.5).magnitude()).abs() < 1e-4);
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let mut g = grid(4, 4, 4);
        set_voxel(&mut g, 2, 2, 2, solid(1));

        // Origin on the floor face, pointing out of the world
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, -1.0, 0.0)).unwrap();
        assert!(ray_cast(&g, &ray, 100.0).is_none());

        // Origin entirely outside, pointing away
        let ray = Ray::new(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.0, 1.0, 0.0)).unwrap();
        assert!(ray_cast(&g, &ray, 100.0).is_none());
    }

    #[test]
    fn test_ray_enters_from_outside() {
        let mut g = grid(4, 4, 4);
        set_voxel(&mut g, 0, 1, 2, solid(3));

        // Starts at grid x = -3, travels +X along row y = 1.5, z = 2.5
        let ray = Ray::new(Point3::new(-5.0, 1.5, 0.5), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        let hit = ray_cast(&g, &ray, 100.0).expect("ray should hit");
        assert!((hit.distance - 3.0).abs() < 1e-5);
        // x = 0 has no in-world left neighbor, so the estimate leans +X
        let expected = Vector3::new(1.0f32, -1.0, -1.0).normalize();
        assert!((hit.normal - expected).magnitude() < 1e-6);
        assert_eq!(hit.voxel.material, MaterialId(3));
    }

    #[test]
    fn test_ray_entering_through_far_face() {
        let mut g = grid(4, 4, 4);
        set_voxel(&mut g, 1, 3, 1, solid(2));

        // Straight down onto the top face of the world
        let ray = Ray::new(Point3::new(-0.5, 10.0, -0.5), Vector3::new(0.0, -1.0, 0.0)).unwrap();
        let hit = ray_cast(&g, &ray, 100.0).expect("ray should hit");
        assert!((hit.distance - 6.0).abs() < 1e-5);
        assert!((hit.position.y - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_max_distance_cuts_off() {
        let mut g = grid(8, 1, 1);
        set_voxel(&mut g, 7, 0, 0, solid(1));

        let ray = Ray::new(Point3::new(-4.0, 0.5, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(ray_cast(&g, &ray, 6.5).is_none());
        assert!(ray_cast(&g, &ray, 7.5).is_some());
    }

    #[test]
    fn test_describe_mentions_extent() {
        let g = grid(4, 5, 6);
        assert!(describe(&g).starts_with("Grid (4x5x6)"));
        assert_eq!(get_stats(&g).cell_count, 120);
    }
}
