//! Read-only ray fan-out over a world
//!
//! Rays borrow the world shared, so no edit can happen while a batch or a
//! frame is in flight. With the `parallel` feature, rows are spread over
//! the rayon pool.

use crate::camera::{camera_basis, pixel_ray, CameraBasis, PinholeCamera};
use crate::error::{VoxelError, VoxelResult};
use crate::world::core::{Ray, RaycastHit};
use crate::world::interfaces::VoxelWorld;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-pixel hits of one traced image, row-major from the top-left corner
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub hits: Vec<Option<RaycastHit>>,
}

impl Frame {
    pub fn hit(&self, x: u32, y: u32) -> Option<&RaycastHit> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.hits[(y * self.width + x) as usize].as_ref()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.iter().filter(|h| h.is_some()).count()
    }
}

/// Cast a batch of rays, results in input order
pub fn cast_rays<W>(world: &W, rays: &[Ray], max_distance: f32) -> Vec<Option<RaycastHit>>
where
    W: VoxelWorld + Sync + ?Sized,
{
    #[cfg(feature = "parallel")]
    {
        rays.par_iter()
            .map(|ray| world.ray_cast(ray, max_distance))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        rays.iter()
            .map(|ray| world.ray_cast(ray, max_distance))
            .collect()
    }
}

fn trace_row<W>(
    world: &W,
    basis: &CameraBasis,
    y: u32,
    width: u32,
    height: u32,
    max_distance: f32,
) -> Vec<Option<RaycastHit>>
where
    W: VoxelWorld + ?Sized,
{
    (0..width)
        .map(|x| match pixel_ray(basis, x, y, width, height) {
            Ok(ray) => world.ray_cast(&ray, max_distance),
            Err(e) => {
                log::warn!("[Trace::trace_frame] Skipping pixel ({}, {}): {}", x, y, e);
                None
            }
        })
        .collect()
}

/// Trace one primary ray per pixel center
pub fn trace_frame<W>(
    world: &W,
    camera: &PinholeCamera,
    width: u32,
    height: u32,
    max_distance: f32,
) -> VoxelResult<Frame>
where
    W: VoxelWorld + Sync + ?Sized,
{
    if width == 0 || height == 0 {
        return Err(VoxelError::InvalidConfig {
            field: "frame".to_string(),
            value: format!("{}x{}", width, height),
            reason: "frame dimensions must be non-zero".to_string(),
        });
    }
    let basis = camera_basis(camera)?;

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<Option<RaycastHit>>> = (0..height)
        .into_par_iter()
        .map(|y| trace_row(world, &basis, y, width, height, max_distance))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<Option<RaycastHit>>> = (0..height)
        .map(|y| trace_row(world, &basis, y, width, height, max_distance))
        .collect();

    let frame = Frame {
        width,
        height,
        hits: rows.concat(),
    };

    log::debug!(
        "[Trace::trace_frame] {}x{} frame, {} hits",
        width,
        height,
        frame.hit_count()
    );
    Ok(frame)
}
