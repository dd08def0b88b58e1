//! BVH container, incremental construction and ray traversal.

use crate::{Aabb, BvhError, Mesh, Ray, SURFACE_EPSILON};

use super::node::BvhNode;

/// A dynamic bounding volume hierarchy over the triangles of one mesh.
///
/// Nodes live in a single array and refer to each other by position. The
/// tree is grown one triangle at a time: every insertion looks for the
/// existing leaf that makes the cheapest sibling (measured by the growth of
/// total surface area), pairs the new leaf with it under a fresh internal
/// node, and refits the boxes of all ancestors.
///
/// ```ignore
/// use spatial_tree::{Bvh, Mesh, Ray};
///
/// let mesh: Mesh = /* ... */;
/// let bvh = Bvh::from_mesh(&mesh)?;
///
/// let mut candidates = Vec::new();
/// if bvh.traverse_ray(&ray, &mut candidates) {
///     // `candidates` holds triangle base indices whose boxes the ray hits.
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: Option<usize>,
    /// Sum of the surface areas of all node boxes.
    cost: f32,
}

impl Bvh {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            cost: 0.0,
        }
    }

    /// Builds a tree over every triangle of `mesh`.
    pub fn from_mesh(mesh: &Mesh) -> Result<Self, BvhError> {
        let mut bvh = Self::new();
        bvh.build(mesh)?;
        Ok(bvh)
    }

    /// Removes all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.cost = 0.0;
    }

    /// Rebuilds the tree from scratch over every triangle of `mesh`.
    ///
    /// The whole index buffer is checked before anything is touched; a mesh
    /// referencing missing vertices is rejected and the current tree is kept.
    pub fn build(&mut self, mesh: &Mesh) -> Result<(), BvhError> {
        if let Err(err) = mesh.validate_indices() {
            log::error!("rejected mesh for BVH build: {err}");
            return Err(err);
        }
        if mesh.indices.len() % 3 != 0 {
            log::warn!(
                "mesh index count {} is not a multiple of 3, ignoring {} trailing indices",
                mesh.indices.len(),
                mesh.indices.len() % 3
            );
        }

        self.clear();
        self.nodes
            .reserve((mesh.triangle_count() * 2).saturating_sub(1));

        for base in mesh.triangle_bases() {
            self.insert_leaf(mesh, base)?;
        }

        self.cost = self.compute_cost();
        self.check_validity();

        log::debug!(
            "built BVH: {} triangles, {} nodes, depth {}, cost {:.3}",
            mesh.triangle_count(),
            self.nodes.len(),
            self.depth(),
            self.cost
        );
        Ok(())
    }

    /// Inserts the triangle starting at `triangle_base` as a new leaf.
    ///
    /// Returns the position of the new leaf. On error nothing is inserted.
    pub fn insert_leaf(&mut self, mesh: &Mesh, triangle_base: u32) -> Result<usize, BvhError> {
        let leaf_aabb = mesh
            .triangle_aabb(triangle_base)
            .inspect_err(|err| log::error!("cannot insert BVH leaf: {err}"))?;

        let leaf = self.nodes.len();
        self.nodes.push(BvhNode::leaf(leaf, leaf_aabb, triangle_base));

        match self.find_best_sibling(&leaf_aabb) {
            None => {
                self.root = Some(leaf);
                self.cost = leaf_aabb.surface_area();
            }
            Some(sibling) => {
                let internal = self.insert_internal_node(leaf, sibling);
                self.cost += leaf_aabb.surface_area() + self.nodes[internal].aabb.surface_area();
                self.refit_ancestors(internal);
            }
        }

        Ok(leaf)
    }

    /// Branch-and-bound search for the leaf that is the cheapest sibling for
    /// a new leaf with box `leaf_aabb`. `None` if the tree is empty.
    ///
    /// A subtree is skipped once the area of its box merged with the new leaf
    /// reaches the best cost found so far. Ties keep the first candidate
    /// found; `child1` is explored before `child2`.
    fn find_best_sibling(&self, leaf_aabb: &Aabb) -> Option<usize> {
        let root = self.root?;

        let mut best = root;
        let mut best_cost = f32::INFINITY;
        let mut stack = vec![root];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            let direct_cost = node.aabb.merged(leaf_aabb).surface_area();
            if direct_cost >= best_cost {
                continue;
            }

            match node.children() {
                None => {
                    let cost = self.cost_increase(index, leaf_aabb);
                    if cost < best_cost {
                        best_cost = cost;
                        best = index;
                    }
                }
                Some((child1, child2)) => {
                    stack.push(child2);
                    stack.push(child1);
                }
            }
        }

        Some(best)
    }

    /// Cost of pairing `candidate` with a new leaf: the area of the new
    /// internal node plus the area growth of every ancestor of `candidate`.
    fn cost_increase(&self, candidate: usize, leaf_aabb: &Aabb) -> f32 {
        let mut cost = self.nodes[candidate].aabb.merged(leaf_aabb).surface_area();

        let mut ancestor = self.nodes[candidate].parent;
        while let Some(index) = ancestor {
            let aabb = &self.nodes[index].aabb;
            cost += aabb.merged(leaf_aabb).surface_area() - aabb.surface_area();
            ancestor = self.nodes[index].parent;
        }

        cost
    }

    /// Puts a new internal node between `sibling` and its parent, with
    /// `sibling` and `new_leaf` as children. Returns the new node.
    ///
    /// # Panics
    ///
    /// Panics if the recorded parent of `sibling` does not reference it.
    fn insert_internal_node(&mut self, new_leaf: usize, sibling: usize) -> usize {
        let old_parent = self.nodes[sibling].parent;

        // Which slot of the old parent to rewire: true for child1.
        let rewire_child1 = old_parent.map(|parent| {
            let parent_node = &self.nodes[parent];
            if parent_node.child1 == Some(sibling) {
                true
            } else if parent_node.child2 == Some(sibling) {
                false
            } else {
                panic!(
                    "BVH corrupted: node {sibling} records {parent} as parent, \
                     but {parent} has children {:?}/{:?}",
                    parent_node.child1, parent_node.child2
                );
            }
        });

        let internal = self.nodes.len();
        let aabb = self.nodes[sibling].aabb.merged(&self.nodes[new_leaf].aabb);
        self.nodes.push(BvhNode::internal(
            internal,
            old_parent,
            (sibling, new_leaf),
            aabb,
        ));
        self.nodes[sibling].parent = Some(internal);
        self.nodes[new_leaf].parent = Some(internal);

        match (old_parent, rewire_child1) {
            (Some(parent), Some(true)) => self.nodes[parent].child1 = Some(internal),
            (Some(parent), Some(false)) => self.nodes[parent].child2 = Some(internal),
            _ => self.root = Some(internal),
        }

        internal
    }

    /// Recomputes the box of every ancestor of `start`, up to the root, from
    /// its two current children, keeping `cost` in sync.
    fn refit_ancestors(&mut self, start: usize) {
        let mut ancestor = self.nodes[start].parent;

        while let Some(index) = ancestor {
            let Some((child1, child2)) = self.nodes[index].children() else {
                panic!("BVH corrupted: ancestor {index} of node {start} has no children");
            };
            let refit = self.nodes[child1].aabb.merged(&self.nodes[child2].aabb);

            let node = &mut self.nodes[index];
            self.cost += refit.surface_area() - node.aabb.surface_area();
            node.aabb = refit;
            ancestor = node.parent;
        }
    }

    /// Collects the triangle base index of every leaf whose box `ray` hits.
    ///
    /// Results are appended to `out` in traversal order, not by distance;
    /// picking the closest triangle is up to the caller (see
    /// [`Mesh::closest_hit`]). Returns `true` if any leaf was hit.
    pub fn traverse_ray(&self, ray: &Ray, out: &mut Vec<u32>) -> bool {
        let Some(root) = self.root else {
            return false;
        };

        let mut hit = false;
        let mut stack = vec![root];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.aabb.intersects_ray(ray) {
                continue;
            }

            if let Some(base) = node.triangle_base {
                out.push(base);
                hit = true;
            } else if let Some((child1, child2)) = node.children() {
                stack.push(child2);
                stack.push(child1);
            }
        }

        hit
    }

    /// Sum of the surface areas of all node boxes, computed from scratch.
    pub fn compute_cost(&self) -> f32 {
        self.nodes.iter().map(|node| node.aabb.surface_area()).sum()
    }

    /// Checks the structural invariants of the tree.
    pub fn validate(&self) -> Result<(), BvhError> {
        let Some(root) = self.root else {
            if !self.nodes.is_empty() {
                return Err(BvhError::InconsistentEmptyTree("nodes present without a root"));
            }
            if self.cost != 0.0 {
                return Err(BvhError::InconsistentEmptyTree("non-zero cost"));
            }
            return Ok(());
        };

        let count = self.nodes.len();
        if root >= count || self.nodes[root].parent.is_some() {
            return Err(BvhError::InvalidRoot(root));
        }

        for (position, node) in self.nodes.iter().enumerate() {
            if node.index != position {
                return Err(BvhError::MisplacedNode {
                    node: node.index,
                    position,
                });
            }

            match (node.triangle_base, node.child1, node.child2) {
                (Some(base), None, None) => {
                    if base % 3 != 0 {
                        return Err(BvhError::MalformedLeaf {
                            node: position,
                            reason: "triangle base is not a multiple of 3",
                        });
                    }
                }
                (Some(_), _, _) => {
                    return Err(BvhError::MalformedLeaf {
                        node: position,
                        reason: "leaf has children",
                    });
                }
                (None, Some(child1), Some(child2)) => {
                    self.validate_internal(position, child1, child2)?;
                }
                (None, _, _) => {
                    return Err(BvhError::MalformedInternal {
                        node: position,
                        reason: "missing child",
                    });
                }
            }

            if position != root && node.parent.is_none_or(|parent| parent >= count) {
                return Err(BvhError::Orphan { node: position });
            }
        }

        // Every node must hang off the root.
        let mut visited = vec![false; count];
        let mut stack = vec![root];
        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            if let Some((child1, child2)) = self.nodes[index].children() {
                stack.push(child1);
                stack.push(child2);
            }
        }
        let unreachable = visited.iter().filter(|&&seen| !seen).count();
        if unreachable > 0 {
            return Err(BvhError::UnreachableNodes {
                unreachable,
                total: count,
            });
        }

        Ok(())
    }

    fn validate_internal(&self, node: usize, child1: usize, child2: usize) -> Result<(), BvhError> {
        if child1 == child2 {
            return Err(BvhError::MalformedInternal {
                node,
                reason: "both children are the same node",
            });
        }
        for child in [child1, child2] {
            if child >= self.nodes.len() {
                return Err(BvhError::MalformedInternal {
                    node,
                    reason: "child index out of range",
                });
            }
            if self.nodes[child].parent != Some(node) {
                return Err(BvhError::ParentMismatch {
                    child,
                    parent: node,
                });
            }
        }

        let union = self.nodes[child1].aabb.merged(&self.nodes[child2].aabb);
        if !self.nodes[node].aabb.approx_eq(&union, SURFACE_EPSILON) {
            return Err(BvhError::StaleBox { node });
        }
        Ok(())
    }

    /// Runs [`validate`](Self::validate) and logs a failure.
    ///
    /// A failed check is a diagnostic only; the tree stays usable.
    pub fn check_validity(&self) -> bool {
        match self.validate() {
            Ok(()) => true,
            Err(err) => {
                log::error!("BVH validity check failed: {err}");
                false
            }
        }
    }

    /// Returns the node at `index`.
    #[inline]
    pub fn node(&self, index: usize) -> Option<&BvhNode> {
        self.nodes.get(index)
    }

    /// All nodes, indexed by position.
    #[inline]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    #[inline]
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Sum of the surface areas of all node boxes.
    #[inline]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Box enclosing the whole mesh, empty for an empty tree.
    pub fn root_aabb(&self) -> Aabb {
        self.root.map_or(Aabb::EMPTY, |root| self.nodes[root].aabb)
    }

    /// Number of nodes on the longest root-to-leaf path (0 for empty tree).
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };

        let mut deepest = 0;
        let mut stack = vec![(root, 1)];
        while let Some((index, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Some((child1, child2)) = self.nodes[index].children() {
                stack.push((child1, depth + 1));
                stack.push((child2, depth + 1));
            }
        }
        deepest
    }
}
