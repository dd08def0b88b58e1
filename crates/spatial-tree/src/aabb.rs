//! Axis-aligned bounding boxes.

use nalgebra::{Point3, Vector3};

use crate::Ray;

/// Tolerance used when comparing surface areas and box corners.
pub const SURFACE_EPSILON: f32 = 1e-4;

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in X, Y, Z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// An axis-aligned box given by its minimum and maximum corners.
///
/// A box is *empty* when `min > max` on any axis. [`Aabb::EMPTY`] is the
/// identity for [`Aabb::merged`]. A box with `min == max` is a point and is
/// not empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// The empty box: `min = +inf`, `max = -inf`.
    pub const EMPTY: Aabb = Aabb {
        min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
        max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    /// Creates a box from two corners. The corners are not reordered.
    #[inline]
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Returns the empty box.
    #[inline]
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Smallest box enclosing all `points`. Empty if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |aabb, point| aabb.grow(point))
    }

    /// Creates a box from its center and its full size along each axis.
    pub fn from_center_extent(center: Point3<f32>, extent: Vector3<f32>) -> Self {
        let half = extent * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Returns `true` if `min > max` on any axis.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Returns the union of two boxes.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Returns this box extended to contain `point`.
    #[inline]
    pub fn grow(&self, point: &Point3<f32>) -> Aabb {
        Aabb {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }

    /// Size of the box along each axis. Zero for an empty box.
    pub fn size(&self) -> Vector3<f32> {
        if self.is_empty() {
            Vector3::zeros()
        } else {
            self.max - self.min
        }
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Total area of the six faces. Zero for an empty box.
    pub fn surface_area(&self) -> f32 {
        let d = self.size();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Returns `true` if `other` lies entirely inside this box.
    pub fn contains(&self, other: &Aabb) -> bool {
        other.is_empty()
            || (self.min.x <= other.min.x
                && self.min.y <= other.min.y
                && self.min.z <= other.min.z
                && self.max.x >= other.max.x
                && self.max.y >= other.max.y
                && self.max.z >= other.max.z)
    }

    /// Returns `true` if both boxes have the same corners within `epsilon`.
    pub fn approx_eq(&self, other: &Aabb, epsilon: f32) -> bool {
        (self.min - other.min).amax() <= epsilon && (self.max - other.max).amax() <= epsilon
    }

    /// Slab test against a ray, considering hits at `t >= 0`.
    ///
    /// Boxes with zero thickness on an axis can still be hit.
    pub fn intersects_ray(&self, ray: &Ray) -> bool {
        if self.is_empty() {
            return false;
        }

        let mut t_enter = 0.0_f32;
        let mut t_exit = f32::INFINITY;

        for axis in Axis::ALL {
            let i = axis.index();
            let origin = ray.origin[i];
            let direction = ray.direction[i];

            if direction.abs() < crate::ray::RAY_PARALLEL_EPSILON {
                // Parallel to this slab: the origin must already be inside it.
                if origin < self.min[i] || origin > self.max[i] {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let t1 = (self.min[i] - origin) * inv;
            let t2 = (self.max[i] - origin) * inv;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));

            if t_enter > t_exit {
                return false;
            }
        }

        true
    }
}
