//! Bounding volume hierarchy over the triangles of a single mesh.
//!
//! The BVH is the per-mesh acceleration structure used for picking. It is
//! built by inserting triangles one at a time, choosing for each new leaf
//! the sibling that increases the total surface area of the tree the least.
//!
//! - Nodes are kept in one flat array and refer to each other by position.
//! - Every internal node has two children and a box equal to their union.
//! - Ray queries only gather candidate triangles; resolving the closest hit
//!   is done by the caller against the actual triangle geometry.
//!
//! # Example
//!
//! ```ignore
//! use spatial_tree::{Bvh, Mesh, Ray};
//! use nalgebra::{Point3, Vector3};
//!
//! let mesh = Mesh::from_positions(&positions, indices);
//! let bvh = Bvh::from_mesh(&mesh)?;
//!
//! let ray = Ray::new(Point3::new(0.5, 0.5, -1.0), Vector3::z());
//! if let Some(hit) = mesh.closest_hit(&bvh, &ray) {
//!     println!("picked triangle {}", hit.triangle_base / 3);
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Bvh`]: the tree, owning its node array
//! - [`BvhNode`]: a leaf (one triangle) or an internal node (two children)

mod node;
mod tree;

pub use node::BvhNode;
pub use tree::Bvh;
