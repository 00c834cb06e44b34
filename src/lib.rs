// voxelcast - solid/void voxel worlds with interchangeable storage backends
//
// - world: dense grid (DDA rays) and sparse octree (recursive rays) behind
//   the VoxelWorld / VoxelWorldMut capability traits
// - persistence: packed sparse voxel octree words and their file transfer
// - camera + trace: primary rays and read-only parallel fan-out
//
// Data lives in *_data.rs, the functions over it in *_operations.rs.

// Constants module
pub mod constants;

pub mod error;

pub mod camera;
pub mod persistence;
pub mod trace;
pub mod world;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub use error::{VoxelError, VoxelResult};

pub use camera::{init_camera, orbit_camera, PinholeCamera};
pub use persistence::{
    decode_octree, decode_octree_with_extent, encode_octree, load_voxel_octree,
    save_voxel_octree, PackedOctree, PersistenceError,
};
pub use trace::{cast_rays, trace_frame, Frame};
pub use world::{
    BackendKind, BlockFace, ChildOrder, DenseGridWorld, MaterialId, Ray, RaycastHit,
    SparseOctreeWorld, Voxel, VoxelWorld, VoxelWorldMut, WorldBackend, WorldExtent,
};

use constants::{ray, world as world_limits};

/// World construction settings, loadable from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub backend: BackendKind,
    pub size_x: u32,
    pub size_y: u32,
    pub size_z: u32,
    pub max_ray_distance: f32,
    pub octree_child_order: ChildOrder,
    /// Collapse uniform octree regions once terrain is written
    pub compress_after_generation: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Dense,
            size_x: world_limits::DEFAULT_SIZE_X,
            size_y: world_limits::DEFAULT_SIZE_Y,
            size_z: world_limits::DEFAULT_SIZE_Z,
            max_ray_distance: ray::DEFAULT_MAX_DISTANCE,
            octree_child_order: ChildOrder::NearestFirst,
            compress_after_generation: true,
        }
    }
}

impl WorldConfig {
    /// Parse a config from TOML text; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: WorldConfig =
            toml::from_str(text).context("WorldConfig: failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("WorldConfig: failed to read {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let sizes = [self.size_x, self.size_y, self.size_z];

        if sizes.iter().any(|&s| s == 0) {
            return Err(anyhow::anyhow!(
                "WorldConfig: extent {}x{}x{} has a zero axis",
                self.size_x,
                self.size_y,
                self.size_z
            ));
        }

        if let Some(&s) = sizes.iter().find(|&&s| s > world_limits::MAX_EXTENT) {
            return Err(anyhow::anyhow!(
                "WorldConfig: axis size {} exceeds maximum of {}",
                s,
                world_limits::MAX_EXTENT
            ));
        }

        let cells = self.size_x as u64 * self.size_y as u64 * self.size_z as u64;
        if self.backend == BackendKind::Dense && cells > world_limits::MAX_DENSE_CELLS {
            return Err(anyhow::anyhow!(
                "WorldConfig: dense grid of {} cells exceeds maximum of {}, use the sparse backend",
                cells,
                world_limits::MAX_DENSE_CELLS
            ));
        }

        if !(self.max_ray_distance.is_finite() && self.max_ray_distance > 0.0) {
            return Err(anyhow::anyhow!(
                "WorldConfig: max_ray_distance {} must be positive and finite",
                self.max_ray_distance
            ));
        }

        log::info!(
            "[WorldConfig] Validation: backend={:?}, extent={}x{}x{}, cells={}, max_ray_distance={}",
            self.backend,
            self.size_x,
            self.size_y,
            self.size_z,
            cells,
            self.max_ray_distance
        );
        Ok(())
    }

    /// Empty world of the configured backend and extent
    pub fn create_world(&self) -> VoxelResult<WorldBackend> {
        let world = match self.backend {
            BackendKind::Dense => {
                WorldBackend::Dense(DenseGridWorld::new(self.size_x, self.size_y, self.size_z)?)
            }
            BackendKind::Sparse => WorldBackend::Sparse(SparseOctreeWorld::with_child_order(
                self.size_x,
                self.size_y,
                self.size_z,
                self.octree_child_order,
            )?),
        };

        log::info!("[WorldConfig::create_world] {}", world.describe());
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend, BackendKind::Dense);
        assert_eq!((config.size_x, config.size_y, config.size_z), (128, 64, 128));
        assert_eq!(config.max_ray_distance, 1000.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorldConfig::from_toml_str(
            r#"
            backend = "sparse"
            size_y = 32
            octree_child_order = "octant_index"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendKind::Sparse);
        assert_eq!(config.size_x, 128);
        assert_eq!(config.size_y, 32);
        assert_eq!(config.octree_child_order, ChildOrder::OctantIndex);
        assert!(config.compress_after_generation);
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(WorldConfig::from_toml_str("size_x = 0").is_err());
        assert!(WorldConfig::from_toml_str("size_z = 70000").is_err());
        assert!(WorldConfig::from_toml_str("max_ray_distance = -1.0").is_err());
        assert!(WorldConfig::from_toml_str("backend = \"voxel_soup\"").is_err());

        let huge_dense = WorldConfig {
            size_x: 4096,
            size_y: 4096,
            size_z: 4096,
            ..Default::default()
        };
        assert!(huge_dense.validate().is_err());
        let huge_sparse = WorldConfig {
            backend: BackendKind::Sparse,
            ..huge_dense
        };
        assert!(huge_sparse.validate().is_ok());
    }

    #[test]
    fn test_parse_error_carries_context() {
        let err = WorldConfig::from_toml_str("size_x = [").unwrap_err();
        assert!(format!("{:#}", err).contains("WorldConfig: failed to parse TOML"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "size_x = 8\nsize_y = 8\nsize_z = 8").unwrap();

        let config = WorldConfig::load(file.path()).unwrap();
        assert_eq!(config.size_x, 8);
        assert!(WorldConfig::load(file.path().with_extension("missing")).is_err());
    }

    #[test]
    fn test_create_world_matches_backend() {
        let dense = WorldConfig {
            size_x: 8,
            size_y: 4,
            size_z: 8,
            ..Default::default()
        };
        let sparse = WorldConfig {
            backend: BackendKind::Sparse,
            ..dense.clone()
        };

        let a = dense.create_world().unwrap();
        let b = sparse.create_world().unwrap();
        assert_eq!(a.kind(), BackendKind::Dense);
        assert_eq!(b.kind(), BackendKind::Sparse);
        assert_eq!(a.size(), b.size());
    }
}
