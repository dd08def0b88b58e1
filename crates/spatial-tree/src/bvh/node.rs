//! BVH node stored in the tree's flat node array.

use crate::Aabb;

/// A node of the [`Bvh`](super::Bvh).
///
/// Nodes refer to each other by their position in the tree's node array.
/// Positions are stable for the lifetime of the tree since nodes are never
/// removed or moved.
///
/// - A **leaf** has no children and references one mesh triangle through
///   its base index (a multiple of 3 into the index buffer).
/// - An **internal** node has exactly two children, no triangle, and a box
///   equal to the union of its children's boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct BvhNode {
    /// Position of this node in the node array.
    pub(crate) index: usize,

    /// Parent position, `None` for the root.
    pub(crate) parent: Option<usize>,

    pub(crate) child1: Option<usize>,
    pub(crate) child2: Option<usize>,

    pub(crate) aabb: Aabb,

    /// Base index of the referenced triangle, leaves only.
    pub(crate) triangle_base: Option<u32>,
}

impl BvhNode {
    /// Creates a detached leaf for the triangle at `triangle_base`.
    pub(crate) fn leaf(index: usize, aabb: Aabb, triangle_base: u32) -> Self {
        Self {
            index,
            parent: None,
            child1: None,
            child2: None,
            aabb,
            triangle_base: Some(triangle_base),
        }
    }

    /// Creates an internal node over two children.
    pub(crate) fn internal(
        index: usize,
        parent: Option<usize>,
        children: (usize, usize),
        aabb: Aabb,
    ) -> Self {
        Self {
            index,
            parent,
            child1: Some(children.0),
            child2: Some(children.1),
            aabb,
            triangle_base: None,
        }
    }

    /// Position of this node in the tree's node array.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Parent position, or `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    pub fn child1(&self) -> Option<usize> {
        self.child1
    }

    #[inline]
    pub fn child2(&self) -> Option<usize> {
        self.child2
    }

    /// Both children, if this is an internal node.
    #[inline]
    pub fn children(&self) -> Option<(usize, usize)> {
        self.child1.zip(self.child2)
    }

    #[inline]
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Triangle base index, `None` for internal nodes.
    #[inline]
    pub fn triangle_base(&self) -> Option<u32> {
        self.triangle_base
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.triangle_base.is_some()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
