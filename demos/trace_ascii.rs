//! Generate terrain, round-trip it through the packed octree format and
//! print a shaded ASCII view.
//!
//! Usage: `cargo run --example trace_ascii [config.toml]`

use anyhow::{Context, Result};
use cgmath::{InnerSpace, Point3, Vector3};
use voxelcast::camera::{orbit_camera, update_aspect_ratio};
use voxelcast::world::core::voxel::color_to_rgb;
use voxelcast::world::{HillyTerrainGenerator, TerrainGenerator};
use voxelcast::{
    decode_octree_with_extent, encode_octree, load_voxel_octree, save_voxel_octree, trace_frame,
    BackendKind, Frame, SparseOctreeWorld, VoxelWorld, WorldBackend, WorldConfig,
};

const WIDTH: u32 = 96;
const HEIGHT: u32 = 40;
const RAMP: &[u8] = b" .:-=+*#%@";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => WorldConfig::load(&path)?,
        None => WorldConfig {
            backend: BackendKind::Sparse,
            size_x: 64,
            size_y: 32,
            size_z: 64,
            ..Default::default()
        },
    };
    config.validate()?;

    let mut world = config.create_world()?;
    let terrain = HillyTerrainGenerator {
        sea_level_ratio: Some(0.25),
        ..Default::default()
    };
    terrain.generate(&mut world);

    if config.compress_after_generation {
        if let Some(octree) = world.as_sparse_mut() {
            let collapsed = octree.compress_tree();
            log::info!("[trace_ascii] Collapsed {} octree nodes", collapsed);
        }
    }
    log::info!("[trace_ascii] {}", world.describe());

    // Round-trip through the packed format when the world is an octree
    let reloaded = match world.as_sparse() {
        Some(octree) => Some(round_trip(octree)?),
        None => None,
    };
    if let Some(mut decoded) = reloaded {
        decoded.child_order = config.octree_child_order;
        world = WorldBackend::Sparse(decoded);
    }

    let extent = world.size();
    let target = Point3::new(0.0, extent.y as f32 * 0.25, 0.0);
    let camera = orbit_camera(target, extent.max_axis() as f32 * 1.2, 0.6, 0.5);
    // Terminal cells are about twice as tall as they are wide
    let camera = update_aspect_ratio(&camera, WIDTH, HEIGHT * 2);

    let frame = trace_frame(&world, &camera, WIDTH, HEIGHT, config.max_ray_distance)?;
    print!("{}", shade(&frame));
    log::info!(
        "[trace_ascii] {} of {} rays hit terrain",
        frame.hit_count(),
        WIDTH * HEIGHT
    );
    Ok(())
}

fn round_trip(octree: &SparseOctreeWorld) -> Result<SparseOctreeWorld> {
    let packed = encode_octree(octree)?;
    let dir = tempfile::tempdir().context("failed to create a scratch directory")?;
    let path = dir.path().join("terrain.svo");

    save_voxel_octree(&packed, &path)?;
    let loaded = load_voxel_octree(&path)?;
    log::info!(
        "[trace_ascii] Saved and reloaded {} packed words",
        loaded.data.len()
    );

    Ok(decode_octree_with_extent(&loaded, octree.extent)?)
}

/// Lambert shading of the hit colour, mapped onto a character ramp
fn shade(frame: &Frame) -> String {
    let light = Vector3::new(0.4f32, 0.8, 0.3).normalize();
    let mut out = String::with_capacity(((frame.width + 1) * frame.height) as usize);

    for y in 0..frame.height {
        for x in 0..frame.width {
            let c = match frame.hit(x, y) {
                Some(hit) => {
                    let rgb = color_to_rgb(hit.voxel.color);
                    let luma = 0.3 * rgb.x + 0.59 * rgb.y + 0.11 * rgb.z;
                    let diffuse = hit.normal.dot(light).max(0.0) * 0.8 + 0.2;
                    let level = (luma * diffuse * (RAMP.len() - 1) as f32).round() as usize;
                    RAMP[level.clamp(1, RAMP.len() - 1)] as char
                }
                None => ' ',
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}
