//! Spatial acceleration structures for a game engine.
//!
//! - [`Bvh`]: per-mesh bounding volume hierarchy over triangles, for picking
//! - [`bsp::Bsp`]: per-level binary space partitioning over scene primitives

mod aabb;
pub mod bsp;
pub mod bvh;
mod error;
mod mesh;
mod ray;

pub use aabb::{Aabb, Axis, SURFACE_EPSILON};
pub use bsp::{Bsp, BspNode, BspNodeType, BspOptions, Primitive, SplitPlane};
pub use bvh::{Bvh, BvhNode};
pub use error::BvhError;
pub use mesh::{ray_triangle_distance, Mesh, MeshHit, Vertex};
pub use ray::{Ray, RAY_PARALLEL_EPSILON};
