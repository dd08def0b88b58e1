//! BSP tree node implementation.

use nalgebra::{Point3, Vector3};

use crate::{Aabb, Axis};

use super::primitive::{classify_aabb, PlaneSide, Primitive};

/// An axis-aligned plane through a node's center.
///
/// Planes are named after the two axes they contain; each one halves the
/// remaining axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitPlane {
    /// `z = const`, halves Z.
    XY,
    /// `x = const`, halves X.
    YZ,
    /// `y = const`, halves Y.
    XZ,
}

impl SplitPlane {
    /// The axis this plane cuts in half.
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            SplitPlane::XY => Axis::Z,
            SplitPlane::YZ => Axis::X,
            SplitPlane::XZ => Axis::Y,
        }
    }

    /// Returns `true` if `aabb` touches or crosses this plane placed at `center`.
    pub fn intersects(self, aabb: &Aabb, center: &Point3<f32>) -> bool {
        let axis = self.axis().index();
        classify_aabb(aabb, axis, center[axis]) == PlaneSide::Intersected
    }

    /// Number of `primitives` that this plane placed at `center` cannot separate.
    pub fn count_intersected<P: Primitive>(self, primitives: &[P], center: &Point3<f32>) -> usize {
        primitives
            .iter()
            .filter(|primitive| self.intersects(&primitive.world_aabb(), center))
            .count()
    }
}

/// Shape of a BSP node in the cube subdivision scheme.
///
/// A `Cube` is split into octants over three steps, one axis per step.
/// The in-between shapes are named after the axes along which they still
/// span the full size of the cube they came from:
///
/// `Cube -> XYExtended | YZExtended | XZExtended -> XExtended | YExtended | ZExtended -> Cube`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BspNodeType {
    Cube,
    XYExtended,
    YZExtended,
    XZExtended,
    XExtended,
    YExtended,
    ZExtended,
}

impl BspNodeType {
    /// Planes this shape can be split by, in priority order, each paired with
    /// the shape of the two halves it produces.
    pub fn transitions(self) -> &'static [(SplitPlane, BspNodeType)] {
        use BspNodeType::*;
        use SplitPlane::{XY, XZ, YZ};

        match self {
            Cube => &[(XY, XYExtended), (YZ, YZExtended), (XZ, XZExtended)],
            XYExtended => &[(YZ, YExtended), (XZ, XExtended)],
            YZExtended => &[(XY, YExtended), (XZ, ZExtended)],
            XZExtended => &[(XY, XExtended), (YZ, ZExtended)],
            XExtended => &[(YZ, Cube)],
            YExtended => &[(XZ, Cube)],
            ZExtended => &[(XY, Cube)],
        }
    }
}

/// A node in the BSP tree.
///
/// Each node covers an axis-aligned box given by its center `position` and
/// its full size `extent`. Primitives that the node's split plane cannot
/// separate stay at the node; the others live in the subtrees.
///
/// - `left`: the half below the split plane
/// - `right`: the half above the split plane
#[derive(Debug, Clone)]
pub struct BspNode<P> {
    node_type: BspNodeType,
    position: Point3<f32>,
    extent: Vector3<f32>,

    /// Primitives kept at this node: those straddling `split`, or all of them
    /// if the node was not divided.
    primitives: Vec<P>,

    /// Plane chosen when this node was divided.
    split: Option<SplitPlane>,

    left: Option<Box<BspNode<P>>>,
    right: Option<Box<BspNode<P>>>,
}

impl<P> BspNode<P> {
    /// Creates an undivided node holding `primitives`.
    pub fn new(
        node_type: BspNodeType,
        position: Point3<f32>,
        extent: Vector3<f32>,
        primitives: Vec<P>,
    ) -> Self {
        Self {
            node_type,
            position,
            extent,
            primitives,
            split: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn node_type(&self) -> BspNodeType {
        self.node_type
    }

    /// Center of the node's box.
    #[inline]
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Full size of the node's box along each axis.
    #[inline]
    pub fn extent(&self) -> Vector3<f32> {
        self.extent
    }

    /// The node's box.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_extent(self.position, self.extent)
    }

    /// Primitives stored at this node (not including descendants).
    #[inline]
    pub fn primitives(&self) -> &[P] {
        &self.primitives
    }

    /// The plane this node was divided by, `None` if it was never divided.
    #[inline]
    pub fn split_plane(&self) -> Option<SplitPlane> {
        self.split
    }

    /// Subtree below the split plane.
    #[inline]
    pub fn left(&self) -> Option<&BspNode<P>> {
        self.left.as_deref()
    }

    /// Subtree above the split plane.
    #[inline]
    pub fn right(&self) -> Option<&BspNode<P>> {
        self.right.as_deref()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Returns the total number of primitives in this subtree.
    pub fn primitive_count(&self) -> usize {
        let mut count = self.primitives.len();

        if let Some(ref left) = self.left {
            count += left.primitive_count();
        }
        if let Some(ref right) = self.right {
            count += right.primitive_count();
        }

        count
    }

    /// Returns the number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |n| n.node_count())
            + self.right.as_ref().map_or(0, |n| n.node_count())
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let left_depth = self.left.as_ref().map_or(0, |n| n.depth());
        let right_depth = self.right.as_ref().map_or(0, |n| n.depth());
        1 + left_depth.max(right_depth)
    }

    pub(crate) fn take_primitives(&mut self) -> Vec<P> {
        std::mem::take(&mut self.primitives)
    }

    pub(crate) fn set_primitives(&mut self, primitives: Vec<P>) {
        self.primitives = primitives;
    }

    pub(crate) fn set_split_plane(&mut self, plane: SplitPlane) {
        self.split = Some(plane);
    }

    pub(crate) fn set_left(&mut self, node: Option<BspNode<P>>) {
        self.left = node.map(Box::new);
    }

    pub(crate) fn set_right(&mut self, node: Option<BspNode<P>>) {
        self.right = node.map(Box::new);
    }

    pub(crate) fn take_left(&mut self) -> Option<Box<BspNode<P>>> {
        self.left.take()
    }

    pub(crate) fn take_right(&mut self) -> Option<Box<BspNode<P>>> {
        self.right.take()
    }
}
