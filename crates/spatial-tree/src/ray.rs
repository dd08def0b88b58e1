//! Rays used for picking queries.

use nalgebra::{Point3, Vector3};

/// Direction components smaller than this are treated as parallel to a slab.
pub const RAY_PARALLEL_EPSILON: f32 = 1e-8;

/// A half-line `origin + t * direction` for `t >= 0`.
///
/// The direction does not need to be normalized; hit distances are then
/// expressed in multiples of its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a ray from an origin and a direction.
    #[inline]
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// Creates a ray starting at `from` and passing through `to`.
    ///
    /// Returns `None` if the two points coincide.
    pub fn through(from: Point3<f32>, to: Point3<f32>) -> Option<Self> {
        let direction = (to - from).try_normalize(RAY_PARALLEL_EPSILON)?;
        Some(Self::new(from, direction))
    }

    /// Point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}
