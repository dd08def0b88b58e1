//! Errors reported by the BVH.

use thiserror::Error;

/// Rejected BVH input or a failed structural check.
///
/// Input errors leave the tree in the state it had before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BvhError {
    #[error("triangle base index {base} is not a multiple of 3")]
    MisalignedTriangle { base: u32 },

    #[error("triangle base index {base} is out of range for {index_count} indices")]
    TriangleOutOfRange { base: u32, index_count: usize },

    #[error("vertex index {index} is out of range for {vertex_count} vertices")]
    VertexOutOfRange { index: u32, vertex_count: usize },

    #[error("empty tree is inconsistent: {0}")]
    InconsistentEmptyTree(&'static str),

    #[error("root index {0} is invalid")]
    InvalidRoot(usize),

    #[error("node {node} is stored at position {position}")]
    MisplacedNode { node: usize, position: usize },

    #[error("leaf {node} is malformed: {reason}")]
    MalformedLeaf { node: usize, reason: &'static str },

    #[error("internal node {node} is malformed: {reason}")]
    MalformedInternal { node: usize, reason: &'static str },

    #[error("node {child} does not point back to its parent {parent}")]
    ParentMismatch { child: usize, parent: usize },

    #[error("node {node} has no valid parent")]
    Orphan { node: usize },

    #[error("internal node {node} box is not the union of its children")]
    StaleBox { node: usize },

    #[error("{unreachable} of {total} nodes are not reachable from the root")]
    UnreachableNodes { unreachable: usize, total: usize },
}
