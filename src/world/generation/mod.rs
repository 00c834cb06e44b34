//! Terrain generators that populate a world through its mutation interface
//!
//! Generators only decide which cell gets which voxel; storage stays with
//! the backend.

use crate::constants::terrain::{
    DIRT_DEPTH, HILL_AMPLITUDE, HILL_BASE_RATIO, NOISE_AMPLITUDE, NOISE_SCALE,
};
use crate::world::core::voxel::{dirt, grass, stone, water};
use crate::world::core::WorldExtent;
use crate::world::interfaces::VoxelWorldMut;
use noise::{NoiseFn, Perlin};

/// Universal world generation interface
pub trait TerrainGenerator {
    /// Highest solid cell of column `(x, z)`, already clamped to the world
    fn surface_height(&self, x: i32, z: i32, extent: &WorldExtent) -> i32;

    /// Highest cell flooded with water above low ground, if any
    fn sea_level(&self, _extent: &WorldExtent) -> Option<i32> {
        None
    }

    /// Fill every column: grass cap, a few cells of dirt, stone below, and
    /// water up to the sea level where the ground is lower
    fn generate(&self, world: &mut dyn VoxelWorldMut) {
        let extent = world.size();
        let sea_level = self
            .sea_level(&extent)
            .map(|level| level.min(extent.y as i32 - 1));
        let mut solid_cells = 0u64;

        for x in 0..extent.x as i32 {
            for z in 0..extent.z as i32 {
                let top = self.surface_height(x, z, &extent);
                fill_column(world, x, z, top);
                solid_cells += top as u64 + 1;

                if let Some(level) = sea_level {
                    for y in top + 1..=level {
                        world.set_voxel(x, y, z, water());
                        solid_cells += 1;
                    }
                }
            }
        }

        log::debug!(
            "[TerrainGenerator::generate] Filled {} cells of a {}x{}x{} world",
            solid_cells,
            extent.x,
            extent.y,
            extent.z
        );
    }
}

/// Write a layered column from y = 0 up to and including `top`
pub fn fill_column(world: &mut dyn VoxelWorldMut, x: i32, z: i32, top: i32) {
    let height = world.size().y as f32;
    for y in 0..=top {
        let voxel = if y == top {
            grass(y as f32 / height)
        } else if top - y <= DIRT_DEPTH {
            dirt()
        } else {
            stone()
        };
        world.set_voxel(x, y, z, voxel);
    }
}

/// Rolling hills from three summed sine waves
#[derive(Debug, Clone, Copy)]
pub struct HillyTerrainGenerator {
    pub base_height_ratio: f32,
    pub amplitude: f32,
    /// Water fills valleys up to this fraction of the world height
    pub sea_level_ratio: Option<f32>,
}

impl Default for HillyTerrainGenerator {
    fn default() -> Self {
        Self {
            base_height_ratio: HILL_BASE_RATIO,
            amplitude: HILL_AMPLITUDE,
            sea_level_ratio: None,
        }
    }
}

impl TerrainGenerator for HillyTerrainGenerator {
    fn surface_height(&self, x: i32, z: i32, extent: &WorldExtent) -> i32 {
        let (fx, fz) = (x as f32, z as f32);
        let waves = (fx * 0.1).sin() * 0.7
            + (fz * 0.08).cos() * 0.5
            + (fx * 0.03 + fz * 0.05).sin() * 1.2;
        let height = extent.y as f32 * self.base_height_ratio + waves * self.amplitude;
        (height as i32).clamp(0, extent.y as i32 - 1)
    }

    fn sea_level(&self, extent: &WorldExtent) -> Option<i32> {
        self.sea_level_ratio.map(|ratio| (extent.y as f32 * ratio) as i32)
    }
}

/// Height field sampled from 2D Perlin noise
#[derive(Debug, Clone)]
pub struct NoiseTerrainGenerator {
    pub seed: u32,
    pub scale: f64,
    pub amplitude: f64,
    pub base_height_ratio: f64,
    perlin: Perlin,
}

impl NoiseTerrainGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            scale: NOISE_SCALE,
            amplitude: NOISE_AMPLITUDE,
            base_height_ratio: HILL_BASE_RATIO as f64,
            perlin: Perlin::new(seed),
        }
    }
}

impl TerrainGenerator for NoiseTerrainGenerator {
    fn surface_height(&self, x: i32, z: i32, extent: &WorldExtent) -> i32 {
        let sample = self
            .perlin
            .get([x as f64 * self.scale, z as f64 * self.scale]);
        let height = extent.y as f64 * self.base_height_ratio + sample * self.amplitude;
        (height as i32).clamp(0, extent.y as i32 - 1)
    }
}

/// Flat one-cell floor with a stone cube standing at the center
#[derive(Debug, Clone, Copy, Default)]
pub struct TestSceneGenerator;

impl TestSceneGenerator {
    /// Cube corner and edge length for a world
    pub fn cube_bounds(extent: &WorldExtent) -> ([i32; 3], i32) {
        let edge = (extent.x.min(extent.y).min(extent.z) as i32 / 4).max(1);
        let corner = [
            (extent.x as i32 - edge) / 2,
            1,
            (extent.z as i32 - edge) / 2,
        ];
        (corner, edge)
    }
}

impl TerrainGenerator for TestSceneGenerator {
    fn surface_height(&self, _x: i32, _z: i32, _extent: &WorldExtent) -> i32 {
        0
    }

    fn generate(&self, world: &mut dyn VoxelWorldMut) {
        let extent = world.size();
        for x in 0..extent.x as i32 {
            for z in 0..extent.z as i32 {
                world.set_voxel(x, 0, z, grass(0.0));
            }
        }

        let (corner, edge) = Self::cube_bounds(&extent);
        for x in corner[0]..corner[0] + edge {
            for y in corner[1]..corner[1] + edge {
                for z in corner[2]..corner[2] + edge {
                    world.set_voxel(x, y, z, stone());
                }
            }
        }
    }
}
