//! Scene primitives placed into the BSP.

use std::rc::Rc;
use std::sync::Arc;

use nalgebra::Point3;

use crate::Aabb;

/// A primitive component as seen by the BSP.
///
/// The BSP stores handles to primitives (`Clone` values such as ids, `Rc`s
/// or references) and never owns the components themselves. When primitives
/// move or are destroyed the tree has to be rebuilt.
pub trait Primitive {
    /// World-space bounding box. Primitives without a real extent (e.g.
    /// billboards) return an empty box.
    fn world_aabb(&self) -> Aabb;

    /// Location of the primitive relative to its parent.
    fn relative_location(&self) -> Point3<f32>;
}

impl<T: Primitive + ?Sized> Primitive for &T {
    fn world_aabb(&self) -> Aabb {
        (**self).world_aabb()
    }

    fn relative_location(&self) -> Point3<f32> {
        (**self).relative_location()
    }
}

impl<T: Primitive + ?Sized> Primitive for Rc<T> {
    fn world_aabb(&self) -> Aabb {
        (**self).world_aabb()
    }

    fn relative_location(&self) -> Point3<f32> {
        (**self).relative_location()
    }
}

impl<T: Primitive + ?Sized> Primitive for Arc<T> {
    fn world_aabb(&self) -> Aabb {
        (**self).world_aabb()
    }

    fn relative_location(&self) -> Point3<f32> {
        (**self).relative_location()
    }
}

/// Where a primitive lies relative to an axis-aligned split plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Entirely below the plane position.
    Minus,
    /// Entirely above the plane position.
    Plus,
    /// Touches or crosses the plane, or has no extent to classify.
    Intersected,
}

/// Classifies `aabb` against the plane `coordinate[axis] == position`.
///
/// A box straddles the plane when `min <= position <= max` on that axis.
/// Empty boxes are reported as intersected so they stay where they are.
pub fn classify_aabb(aabb: &Aabb, axis: usize, position: f32) -> PlaneSide {
    if aabb.is_empty() {
        PlaneSide::Intersected
    } else if aabb.max[axis] < position {
        PlaneSide::Minus
    } else if aabb.min[axis] > position {
        PlaneSide::Plus
    } else {
        PlaneSide::Intersected
    }
}
