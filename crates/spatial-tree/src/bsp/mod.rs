//! Binary Space Partitioning tree for the primitives of a level.
//!
//! The tree starts from a cube around all primitives and halves it one axis
//! at a time, cycling through seven node shapes so that every third level is
//! a cube again. Primitives that lie entirely on one side of a node's split
//! plane move into that child; primitives straddling it stay at the node.
//!
//! # Example
//!
//! ```ignore
//! use spatial_tree::bsp::{Bsp, CollectingVisitor};
//!
//! let mut bsp = Bsp::new();
//! bsp.initialize(&primitives);
//!
//! let mut visitor = CollectingVisitor::new();
//! bsp.pre_order(&mut visitor);
//! assert_eq!(visitor.primitives().len(), primitives.len());
//!
//! bsp.shutdown();
//! ```
//!
//! # Architecture
//!
//! - [`Bsp`]: the tree container and its build options
//! - [`BspNode`]: a box with a shape, a split plane and the primitives kept there
//! - [`Primitive`]: what the tree needs to know about a scene component
//! - [`PlaneSelector`]: strategy trait for choosing among candidate planes
//! - [`BspVisitor`]: visitor trait for custom traversal behavior

mod node;
mod primitive;
mod selector;
mod tree;
mod visitor;

pub use node::{BspNode, BspNodeType, SplitPlane};
pub use primitive::{classify_aabb, PlaneSide, Primitive};
pub use selector::{FewestIntersected, MostIntersected, PlaneCandidate, PlaneSelector};
pub use tree::{Bsp, BspOptions, DEFAULT_SUBDIVISION_LEVELS};
pub use visitor::{BspVisitor, CollectingVisitor, FnVisitor};
