//! BSP tree container and construction.

use nalgebra::{Point3, Vector3};

use crate::Aabb;

use super::node::{BspNode, BspNodeType, SplitPlane};
use super::primitive::{classify_aabb, PlaneSide, Primitive};
use super::selector::{MostIntersected, PlaneCandidate, PlaneSelector};
use super::visitor::{BspVisitor, CollectingVisitor};

/// Number of halvings after which cubes stop being divided, by default.
pub const DEFAULT_SUBDIVISION_LEVELS: u32 = 4;

/// Build options for a [`Bsp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BspOptions {
    /// Cubes whose size is at or below `root size * 0.5^subdivision_levels`
    /// are not divided any further.
    pub subdivision_levels: u32,
}

impl Default for BspOptions {
    fn default() -> Self {
        Self {
            subdivision_levels: DEFAULT_SUBDIVISION_LEVELS,
        }
    }
}

impl BspOptions {
    pub fn with_subdivision_levels(mut self, levels: u32) -> Self {
        self.subdivision_levels = levels;
        self
    }
}

/// A Binary Space Partitioning tree over the primitives of a level.
///
/// The tree starts from a cube enclosing every primitive and halves it one
/// axis at a time. Each step picks one of the planes through the node's
/// center with a [`PlaneSelector`]; primitives entirely on one side move
/// into the matching child, primitives straddling the plane stay at the node.
///
/// # Construction
///
/// ```ignore
/// use spatial_tree::{Bsp, FewestIntersected};
///
/// let mut bsp = Bsp::new();
/// bsp.initialize(&level_primitives);
///
/// let mut bsp = Bsp::with_selector(FewestIntersected);
/// bsp.initialize(&level_primitives);
/// ```
///
/// # Traversal
///
/// The tree has no query methods of its own; callers walk it with
/// [`pre_order`](Bsp::pre_order), [`in_order`](Bsp::in_order),
/// [`post_order`](Bsp::post_order) or [`pre_order_until`](Bsp::pre_order_until),
/// the latter to skip subtrees whose bounds fail a test:
///
/// ```ignore
/// bsp.pre_order_until(|node| {
///     if !node.bounds().intersects_ray(&ray) {
///         return false;
///     }
///     candidates.extend(node.primitives().iter().cloned());
///     true
/// });
/// ```
///
/// There is no incremental insertion or removal. When the level's
/// primitives change the tree has to be initialized again.
#[derive(Debug, Clone)]
pub struct Bsp<P, S = MostIntersected> {
    root: Option<Box<BspNode<P>>>,
    minimum_extent: f32,
    options: BspOptions,
    selector: S,
}

impl<P, S: Default> Default for Bsp<P, S> {
    fn default() -> Self {
        Self::with_selector(S::default())
    }
}

impl<P> Bsp<P> {
    /// Creates an empty BSP tree using the [`MostIntersected`] selector.
    pub fn new() -> Self {
        Self::with_selector(MostIntersected)
    }
}

impl<P, S> Bsp<P, S> {
    /// Creates an empty BSP tree using the given plane selector.
    pub fn with_selector(selector: S) -> Self {
        Self {
            root: None,
            minimum_extent: 0.0,
            options: BspOptions::default(),
            selector,
        }
    }

    /// Replaces the build options. Takes effect on the next
    /// [`initialize`](Self::initialize).
    pub fn with_options(mut self, options: BspOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn options(&self) -> &BspOptions {
        &self.options
    }

    /// Returns `true` if the tree has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a reference to the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<&BspNode<P>> {
        self.root.as_deref()
    }

    /// Size below which cubes are not divided, set by the last build. Zero
    /// while the tree is empty.
    #[inline]
    pub fn minimum_extent(&self) -> f32 {
        self.minimum_extent
    }

    /// Returns the total number of primitives stored in the tree.
    pub fn primitive_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.primitive_count())
    }

    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.node_count())
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    /// Visits every node, parent before children, left before right.
    pub fn pre_order<V: BspVisitor<P>>(&self, visitor: &mut V) {
        if let Some(ref root) = self.root {
            pre_order_node(root, visitor);
        }
    }

    /// Visits every node, left subtree, then the node, then right subtree.
    pub fn in_order<V: BspVisitor<P>>(&self, visitor: &mut V) {
        if let Some(ref root) = self.root {
            in_order_node(root, visitor);
        }
    }

    /// Visits every node, children before their parent.
    pub fn post_order<V: BspVisitor<P>>(&self, visitor: &mut V) {
        if let Some(ref root) = self.root {
            post_order_node(root, visitor);
        }
    }

    /// Pre-order traversal that does not descend below a node for which
    /// `visit` returns `false`. Siblings of such a node are still visited.
    pub fn pre_order_until<F>(&self, mut visit: F)
    where
        F: FnMut(&BspNode<P>) -> bool,
    {
        if let Some(ref root) = self.root {
            pre_order_until_node(root, &mut visit);
        }
    }

    /// Deletes every node bottom-up and leaves the tree empty, with no
    /// minimum extent.
    pub fn shutdown(&mut self) {
        self.minimum_extent = 0.0;
        if let Some(root) = self.root.take() {
            let removed = dismantle(root);
            log::debug!("BSP shutdown removed {removed} nodes");
        }
    }
}

impl<P: Primitive + Clone, S: PlaneSelector> Bsp<P, S> {
    /// Builds the tree over `primitives`, replacing any previous tree.
    ///
    /// Does nothing else for an empty slice. Primitives with an empty world
    /// box do not contribute to the bounds and stay at the root.
    pub fn initialize(&mut self, primitives: &[P]) {
        self.shutdown();
        if primitives.is_empty() {
            return;
        }

        let mut bounds = Aabb::EMPTY;
        let mut skipped = 0;
        for primitive in primitives {
            let aabb = primitive.world_aabb();
            if aabb.is_empty() {
                skipped += 1;
            } else {
                bounds = bounds.merged(&aabb);
            }
        }
        if skipped > 0 {
            log::warn!(
                "{skipped} of {} primitives have an empty bounding box and stay at the BSP root",
                primitives.len()
            );
        }

        let (center, extent) = if bounds.is_empty() {
            // Nothing to divide: anchor the root at the primitives' locations.
            let sum: Vector3<f32> = primitives
                .iter()
                .map(|primitive| primitive.relative_location().coords)
                .sum();
            (Point3::from(sum / primitives.len() as f32), 0.0)
        } else {
            (bounds.center(), bounds.size().max())
        };

        let levels = i32::try_from(self.options.subdivision_levels).unwrap_or(i32::MAX);
        self.minimum_extent = extent * 0.5_f32.powi(levels);

        let mut root = BspNode::new(
            BspNodeType::Cube,
            center,
            Vector3::repeat(extent),
            primitives.to_vec(),
        );
        divide(&mut root, &self.selector, self.minimum_extent);

        log::debug!(
            "built BSP: {} primitives, {} nodes, depth {}, cube size {extent:.3}, minimum {:.3}",
            primitives.len(),
            root.node_count(),
            root.depth(),
            self.minimum_extent
        );
        self.root = Some(Box::new(root));
    }

    /// Returns every primitive in the tree, in pre-order.
    pub fn collect_primitives(&self) -> Vec<P> {
        let mut visitor = CollectingVisitor::new();
        self.pre_order(&mut visitor);
        visitor.into_primitives()
    }
}

/// Recursively divides `node` until its primitives are separated or it is
/// too small.
///
/// The node's shape decides which planes are candidates and which shape its
/// children get (see [`BspNodeType::transitions`]).
fn divide<P: Primitive + Clone, S: PlaneSelector>(
    node: &mut BspNode<P>,
    selector: &S,
    minimum_extent: f32,
) {
    if node.primitives().is_empty() {
        return;
    }

    let transitions = node.node_type().transitions();
    let extent = node.extent();
    let split_extent = transitions
        .iter()
        .map(|(plane, _)| extent[plane.axis().index()])
        .fold(0.0, f32::max);
    if split_extent <= minimum_extent {
        return;
    }

    let position = node.position();
    let candidates: Vec<PlaneCandidate> = transitions
        .iter()
        .map(|&(plane, _)| PlaneCandidate {
            plane,
            intersected: plane.count_intersected(node.primitives(), &position),
        })
        .collect();

    let Some(chosen) = selector.select(&candidates) else {
        return;
    };
    let Some(&(plane, child_type)) = transitions.iter().find(|(p, _)| *p == chosen.plane) else {
        return;
    };

    let axis = plane.axis().index();
    let split_at = position[axis];

    let mut minus = Vec::new();
    let mut plus = Vec::new();
    let mut intersected = Vec::new();
    for primitive in node.take_primitives() {
        match classify_aabb(&primitive.world_aabb(), axis, split_at) {
            PlaneSide::Minus => minus.push(primitive),
            PlaneSide::Plus => plus.push(primitive),
            PlaneSide::Intersected => intersected.push(primitive),
        }
    }

    log::trace!(
        "dividing {:?} at {position} by {plane:?}: {} below, {} above, {} kept",
        node.node_type(),
        minus.len(),
        plus.len(),
        intersected.len()
    );

    node.set_primitives(intersected);
    node.set_split_plane(plane);

    let mut child_extent = extent;
    child_extent[axis] *= 0.5;
    let offset = extent[axis] / 4.0;

    let child_position = |sign: f32| {
        let mut p = position;
        p[axis] += sign * offset;
        p
    };
    let left = make_child(
        minus,
        child_type,
        child_position(-1.0),
        child_extent,
        selector,
        minimum_extent,
    );
    let right = make_child(
        plus,
        child_type,
        child_position(1.0),
        child_extent,
        selector,
        minimum_extent,
    );
    node.set_left(left);
    node.set_right(right);
}

/// Creates and divides a child node, or `None` if it would hold nothing.
fn make_child<P: Primitive + Clone, S: PlaneSelector>(
    primitives: Vec<P>,
    node_type: BspNodeType,
    position: Point3<f32>,
    extent: Vector3<f32>,
    selector: &S,
    minimum_extent: f32,
) -> Option<BspNode<P>> {
    if primitives.is_empty() {
        return None;
    }

    let mut child = BspNode::new(node_type, position, extent, primitives);
    divide(&mut child, selector, minimum_extent);
    Some(child)
}

fn pre_order_node<P, V: BspVisitor<P>>(node: &BspNode<P>, visitor: &mut V) {
    visitor.visit(node);
    if let Some(left) = node.left() {
        pre_order_node(left, visitor);
    }
    if let Some(right) = node.right() {
        pre_order_node(right, visitor);
    }
}

fn in_order_node<P, V: BspVisitor<P>>(node: &BspNode<P>, visitor: &mut V) {
    if let Some(left) = node.left() {
        in_order_node(left, visitor);
    }
    visitor.visit(node);
    if let Some(right) = node.right() {
        in_order_node(right, visitor);
    }
}

fn post_order_node<P, V: BspVisitor<P>>(node: &BspNode<P>, visitor: &mut V) {
    if let Some(left) = node.left() {
        post_order_node(left, visitor);
    }
    if let Some(right) = node.right() {
        post_order_node(right, visitor);
    }
    visitor.visit(node);
}

fn pre_order_until_node<P, F>(node: &BspNode<P>, visit: &mut F)
where
    F: FnMut(&BspNode<P>) -> bool,
{
    if !visit(node) {
        return;
    }
    if let Some(left) = node.left() {
        pre_order_until_node(left, visit);
    }
    if let Some(right) = node.right() {
        pre_order_until_node(right, visit);
    }
}

/// Drops a subtree children-first. Returns the number of nodes removed.
fn dismantle<P>(mut node: Box<BspNode<P>>) -> usize {
    let mut removed = 1;
    if let Some(left) = node.take_left() {
        removed += dismantle(left);
    }
    if let Some(right) = node.take_right() {
        removed += dismantle(right);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::selector::FewestIntersected;
    use crate::bsp::visitor::FnVisitor;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[derive(Debug, Clone, PartialEq)]
    struct Block {
        id: usize,
        aabb: Aabb,
        location: Point3<f32>,
    }

    impl Primitive for Block {
        fn world_aabb(&self) -> Aabb {
            self.aabb
        }

        fn relative_location(&self) -> Point3<f32> {
            self.location
        }
    }

    fn make_block(id: usize, min: [f32; 3], max: [f32; 3]) -> Block {
        let aabb = Aabb::new(
            Point3::new(min[0], min[1], min[2]),
            Point3::new(max[0], max[1], max[2]),
        );
        Block {
            id,
            aabb,
            location: aabb.center(),
        }
    }

    /// A primitive without a real box, like a billboard.
    fn make_billboard(id: usize, at: [f32; 3]) -> Block {
        Block {
            id,
            aabb: Aabb::EMPTY,
            location: Point3::new(at[0], at[1], at[2]),
        }
    }

    fn make_random_blocks(seed: u64, count: usize) -> Vec<Block> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|id| {
                let min = [
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-20.0..20.0),
                    rng.gen_range(-50.0..50.0),
                ];
                let size: f32 = rng.gen_range(0.1..6.0);
                make_block(id, min, [min[0] + size, min[1] + size * 0.5, min[2] + size])
            })
            .collect()
    }

    fn collect_ids<S>(bsp: &Bsp<Block, S>) -> Vec<usize> {
        let mut ids = Vec::new();
        bsp.pre_order(&mut FnVisitor::new(|node: &BspNode<Block>| {
            ids.extend(node.primitives().iter().map(|b| b.id));
        }));
        ids.sort_unstable();
        ids
    }

    fn all_nodes<S>(bsp: &Bsp<Block, S>, mut check: impl FnMut(&BspNode<Block>)) {
        bsp.pre_order(&mut FnVisitor::new(|node: &BspNode<Block>| check(node)));
    }

    #[test]
    fn empty_tree() {
        let bsp = Bsp::<Block>::new();
        assert!(bsp.is_empty());
        assert_eq!(bsp.primitive_count(), 0);
        assert_eq!(bsp.node_count(), 0);
        assert_eq!(bsp.depth(), 0);
    }

    #[test]
    fn initialize_empty_leaves_no_root() {
        let mut bsp = Bsp::<Block>::new();
        bsp.initialize(&[]);
        assert!(bsp.root().is_none());

        let mut visited = 0;
        bsp.pre_order(&mut FnVisitor::new(|_: &BspNode<Block>| visited += 1));
        assert_eq!(visited, 0);
    }

    #[test]
    fn root_is_a_cube_around_all_primitives() {
        let blocks = vec![
            make_block(0, [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            make_block(1, [9.0, 1.0, 2.0], [10.0, 2.0, 3.0]),
        ];
        let mut bsp = Bsp::new();
        bsp.initialize(&blocks);

        let root = bsp.root().unwrap();
        assert_eq!(root.node_type(), BspNodeType::Cube);
        assert_eq!(root.extent(), Vector3::repeat(10.0));
        assert_eq!(root.position(), Point3::new(5.0, 1.0, 1.5));
        assert!((bsp.minimum_extent() - 10.0 / 16.0).abs() < 1e-6);
    }

    #[test]
    fn subdivision_levels_set_minimum_extent() {
        let blocks = vec![make_block(0, [0.0, 0.0, 0.0], [8.0, 8.0, 8.0])];
        let mut bsp = Bsp::new().with_options(BspOptions::default().with_subdivision_levels(2));
        bsp.initialize(&blocks);
        assert!((bsp.minimum_extent() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn huge_subdivision_levels_still_divide() {
        let blocks = vec![
            make_block(0, [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            make_block(1, [31.0, 31.0, 31.0], [32.0, 32.0, 32.0]),
        ];

        let mut default = Bsp::with_selector(FewestIntersected);
        default.initialize(&blocks);

        let options = BspOptions::default().with_subdivision_levels(u32::MAX);
        let mut deep = Bsp::with_selector(FewestIntersected).with_options(options);
        deep.initialize(&blocks);

        assert_eq!(deep.minimum_extent(), 0.0);
        assert!(deep.minimum_extent() < default.minimum_extent());
        assert!(deep.node_count() >= default.node_count());
        assert!(deep.node_count() > 1);
        assert_eq!(collect_ids(&deep), vec![0, 1]);
    }

    #[test]
    fn single_primitive_stays_at_root() {
        let blocks = vec![make_block(0, [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0])];
        let mut bsp = Bsp::new();
        bsp.initialize(&blocks);

        let root = bsp.root().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.primitives(), blocks.as_slice());
        assert_eq!(root.split_plane(), Some(SplitPlane::XY));
    }

    #[test]
    fn primitives_are_conserved() {
        for seed in 0..6 {
            let blocks = make_random_blocks(seed, 150);
            let expected: Vec<usize> = (0..150).collect();

            let mut most = Bsp::new();
            most.initialize(&blocks);
            assert_eq!(collect_ids(&most), expected, "seed {seed}");
            assert_eq!(most.primitive_count(), 150);

            let mut fewest = Bsp::with_selector(FewestIntersected);
            fewest.initialize(&blocks);
            assert_eq!(collect_ids(&fewest), expected, "seed {seed}");
        }
    }

    #[test]
    fn primitives_fit_inside_their_child_cells() {
        let blocks = make_random_blocks(21, 120);
        let mut bsp = Bsp::with_selector(FewestIntersected);
        bsp.initialize(&blocks);

        all_nodes(&bsp, |node| {
            let bounds = node.bounds();
            for child in [node.left(), node.right()].into_iter().flatten() {
                let cell = child.bounds();
                assert!((cell.min - bounds.min).min() > -1e-4);
                assert!((bounds.max - cell.max).min() > -1e-4);
                for block in child.primitives() {
                    // Non-straddling primitives lie strictly on the child's side.
                    let axis = node.split_plane().unwrap().axis().index();
                    let split = node.position()[axis];
                    if child.position()[axis] < split {
                        assert!(block.aabb.max[axis] < split);
                    } else {
                        assert!(block.aabb.min[axis] > split);
                    }
                }
            }
        });
    }

    #[test]
    fn straddling_primitives_stay_at_the_split_node() {
        for seed in 0..4 {
            let blocks = make_random_blocks(seed + 100, 100);
            let mut bsp = Bsp::new();
            bsp.initialize(&blocks);

            all_nodes(&bsp, |node| {
                if let Some(plane) = node.split_plane() {
                    for block in node.primitives() {
                        assert!(plane.intersects(&block.aabb, &node.position()));
                    }
                }
            });
        }
    }

    #[test]
    fn cubes_at_minimum_extent_are_not_divided() {
        let blocks = make_random_blocks(9, 400);
        let mut bsp = Bsp::with_selector(FewestIntersected);
        bsp.initialize(&blocks);
        let minimum = bsp.minimum_extent();

        let mut smallest_divided = f32::INFINITY;
        all_nodes(&bsp, |node| {
            if node.node_type() == BspNodeType::Cube && node.extent().x <= minimum {
                assert!(node.is_leaf());
                assert_eq!(node.split_plane(), None);
            }
            if node.split_plane().is_some() {
                smallest_divided = smallest_divided.min(node.extent().max());
            }
        });
        assert!(smallest_divided > minimum);
    }

    #[test]
    fn children_follow_the_shape_transitions() {
        let blocks = make_random_blocks(4, 200);
        let mut bsp = Bsp::with_selector(FewestIntersected);
        bsp.initialize(&blocks);

        all_nodes(&bsp, |node| {
            for child in [node.left(), node.right()].into_iter().flatten() {
                let plane = node.split_plane().unwrap();
                assert!(
                    node.node_type()
                        .transitions()
                        .contains(&(plane, child.node_type()))
                );

                let axis = plane.axis().index();
                let offset = (child.position() - node.position())[axis].abs();
                assert!((child.extent()[axis] - node.extent()[axis] * 0.5).abs() < 1e-4);
                assert!((offset - node.extent()[axis] * 0.25).abs() < 1e-4);

                if child.node_type() == BspNodeType::Cube {
                    let e = child.extent();
                    assert!((e.x - e.y).abs() < 1e-4 && (e.y - e.z).abs() < 1e-4);
                }
            }
        });
    }

    #[test]
    fn most_intersected_keeps_worst_plane_at_node() {
        // Two tall slabs at opposite ends of X: only the YZ plane separates them.
        let blocks = vec![
            make_block(0, [0.0, 0.0, 0.0], [1.0, 10.0, 10.0]),
            make_block(1, [9.0, 0.0, 0.0], [10.0, 10.0, 10.0]),
        ];

        let mut bsp = Bsp::new();
        bsp.initialize(&blocks);
        let root = bsp.root().unwrap();
        assert_eq!(root.split_plane(), Some(SplitPlane::XY));
        assert!(root.is_leaf());
        assert_eq!(root.primitives().len(), 2);
    }

    #[test]
    fn fewest_intersected_separates_primitives() {
        let blocks = vec![
            make_block(0, [0.0, 0.0, 0.0], [1.0, 10.0, 10.0]),
            make_block(1, [9.0, 0.0, 0.0], [10.0, 10.0, 10.0]),
        ];

        let mut bsp = Bsp::with_selector(FewestIntersected);
        bsp.initialize(&blocks);
        let root = bsp.root().unwrap();
        assert_eq!(root.split_plane(), Some(SplitPlane::YZ));
        assert!(root.primitives().is_empty());

        let left = root.left().unwrap();
        let right = root.right().unwrap();
        assert_eq!(left.node_type(), BspNodeType::YZExtended);
        assert_eq!(left.position(), Point3::new(2.5, 5.0, 5.0));
        assert_eq!(left.extent(), Vector3::new(5.0, 10.0, 10.0));
        assert_eq!(left.primitives()[0].id, 0);
        assert_eq!(right.position(), Point3::new(7.5, 5.0, 5.0));
        assert_eq!(right.primitives()[0].id, 1);
    }

    #[test]
    fn billboards_stay_at_root() {
        let blocks = vec![
            make_block(0, [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
            make_block(1, [7.0, 7.0, 7.0], [8.0, 8.0, 8.0]),
            make_billboard(2, [0.5, 0.5, 0.5]),
        ];
        let mut bsp = Bsp::with_selector(FewestIntersected);
        bsp.initialize(&blocks);

        let root = bsp.root().unwrap();
        assert_eq!(root.extent(), Vector3::repeat(8.0));
        assert!(root.primitives().iter().any(|b| b.id == 2));
        assert_eq!(collect_ids(&bsp), vec![0, 1, 2]);
    }

    #[test]
    fn only_billboards_build_a_single_node() {
        let blocks = vec![
            make_billboard(0, [0.0, 0.0, 0.0]),
            make_billboard(1, [2.0, 4.0, 6.0]),
        ];
        let mut bsp = Bsp::new();
        bsp.initialize(&blocks);

        let root = bsp.root().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.position(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(root.extent(), Vector3::zeros());
        assert_eq!(root.primitives().len(), 2);
    }

    #[test]
    fn reinitialize_replaces_tree() {
        let mut bsp = Bsp::new();
        bsp.initialize(&make_random_blocks(1, 50));
        assert_eq!(bsp.primitive_count(), 50);

        bsp.initialize(&make_random_blocks(2, 10));
        assert_eq!(bsp.primitive_count(), 10);
        assert!(bsp.minimum_extent() > 0.0);

        bsp.initialize(&[]);
        assert!(bsp.is_empty());
        assert_eq!(bsp.minimum_extent(), 0.0);
    }

    #[test]
    fn shutdown_empties_tree() {
        let mut bsp = Bsp::with_selector(FewestIntersected);
        bsp.initialize(&make_random_blocks(3, 80));
        assert!(bsp.node_count() > 1);

        bsp.shutdown();
        assert!(bsp.is_empty());
        assert_eq!(bsp.node_count(), 0);
        assert_eq!(bsp.minimum_extent(), 0.0);

        // Shutting down twice is harmless.
        bsp.shutdown();
        assert!(bsp.is_empty());
    }

    #[test]
    fn dismantle_counts_every_node() {
        let mut bsp = Bsp::with_selector(FewestIntersected);
        bsp.initialize(&make_random_blocks(8, 60));
        let nodes = bsp.node_count();

        let root = bsp.root.take().unwrap();
        assert_eq!(dismantle(root), nodes);
    }

    #[test]
    fn collect_primitives_in_pre_order() {
        let blocks = vec![
            make_block(0, [0.0, 0.0, 0.0], [1.0, 10.0, 10.0]),
            make_block(1, [9.0, 0.0, 0.0], [10.0, 10.0, 10.0]),
        ];
        let mut bsp = Bsp::with_selector(FewestIntersected);
        bsp.initialize(&blocks);

        let ids: Vec<usize> = bsp.collect_primitives().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    /// Hand-built tree: r(0) -> [a(-1) -> [c(-2)], b(1)].
    fn make_manual_tree() -> Bsp<Block> {
        let node = |x: f32| {
            BspNode::new(
                BspNodeType::Cube,
                Point3::new(x, 0.0, 0.0),
                Vector3::repeat(1.0),
                Vec::<Block>::new(),
            )
        };

        let mut a = node(-1.0);
        a.set_left(Some(node(-2.0)));
        let mut r = node(0.0);
        r.set_left(Some(a));
        r.set_right(Some(node(1.0)));

        let mut bsp = Bsp::new();
        bsp.root = Some(Box::new(r));
        bsp
    }

    /// Records the x coordinate of every visited node.
    #[derive(Default)]
    struct OrderRecorder(Vec<f32>);

    impl BspVisitor<Block> for OrderRecorder {
        fn visit(&mut self, node: &BspNode<Block>) {
            self.0.push(node.position().x);
        }
    }

    #[test]
    fn traversal_orders() {
        let bsp = make_manual_tree();

        let mut pre = OrderRecorder::default();
        bsp.pre_order(&mut pre);
        assert_eq!(pre.0, vec![0.0, -1.0, -2.0, 1.0]);

        let mut in_order = OrderRecorder::default();
        bsp.in_order(&mut in_order);
        assert_eq!(in_order.0, vec![-2.0, -1.0, 0.0, 1.0]);

        let mut post = OrderRecorder::default();
        bsp.post_order(&mut post);
        assert_eq!(post.0, vec![-2.0, -1.0, 1.0, 0.0]);
    }

    #[test]
    fn pre_order_until_skips_subtree_but_not_siblings() {
        let bsp = make_manual_tree();

        let mut order = Vec::new();
        bsp.pre_order_until(|node| {
            order.push(node.position().x);
            node.position().x != -1.0
        });
        assert_eq!(order, vec![0.0, -1.0, 1.0]);

        let mut order = Vec::new();
        bsp.pre_order_until(|node| {
            order.push(node.position().x);
            false
        });
        assert_eq!(order, vec![0.0]);
    }
}
