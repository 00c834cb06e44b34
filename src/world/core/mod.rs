//! Core world data types and fundamental structures
//!
//! This module contains the value types shared by both world backends,
//! independent of whether the dense grid or the sparse octree is used.

pub mod aabb;
mod extent;
mod normal;
mod ray;
pub mod voxel;

pub use aabb::{ray_interval, Aabb};
pub use extent::WorldExtent;
pub use normal::estimate_face_normal;
pub use ray::{BlockFace, Ray, RaycastHit};
pub use voxel::{MaterialId, Voxel, AIR_COLOR};
