//! Triangle-list mesh data consumed by the BVH.

use nalgebra::{Point3, Vector3};

use crate::{Aabb, Bvh, BvhError, Ray};

/// A mesh vertex. Only the position takes part in spatial queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    /// Creates a vertex with a zero normal.
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
        }
    }

    pub fn with_normal(mut self, normal: Vector3<f32>) -> Self {
        self.normal = normal;
        self
    }
}

/// An indexed triangle list.
///
/// Triangle `n` is made of `indices[3n..3n + 3]`; its *base index* is `3n`.
/// Trailing indices that do not form a full triangle are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// The closest triangle hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit {
    /// Base index of the triangle in the index buffer.
    pub triangle_base: u32,
    /// Ray parameter of the hit point.
    pub distance: f32,
    pub point: Point3<f32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Creates a mesh from bare positions.
    pub fn from_positions(positions: &[Point3<f32>], indices: Vec<u32>) -> Self {
        Self {
            vertices: positions.iter().copied().map(Vertex::new).collect(),
            indices,
        }
    }

    /// Number of complete triangles in the index buffer.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates the base indices `0, 3, 6, ...` of all complete triangles.
    pub fn triangle_bases(&self) -> impl Iterator<Item = u32> + use<> {
        (0..self.triangle_count() as u32).map(|n| n * 3)
    }

    /// Checks that the triangle starting at `base` exists and is aligned.
    pub fn check_triangle(&self, base: u32) -> Result<(), BvhError> {
        if base % 3 != 0 {
            return Err(BvhError::MisalignedTriangle { base });
        }
        let base_usize = base as usize;
        if base_usize + 2 >= self.indices.len() {
            return Err(BvhError::TriangleOutOfRange {
                base,
                index_count: self.indices.len(),
            });
        }
        for &index in &self.indices[base_usize..base_usize + 3] {
            if index as usize >= self.vertices.len() {
                return Err(BvhError::VertexOutOfRange {
                    index,
                    vertex_count: self.vertices.len(),
                });
            }
        }
        Ok(())
    }

    /// Checks every index of every complete triangle against the vertex buffer.
    pub fn validate_indices(&self) -> Result<(), BvhError> {
        let used = self.triangle_count() * 3;
        match self.indices[..used]
            .iter()
            .find(|&&index| index as usize >= self.vertices.len())
        {
            Some(&index) => Err(BvhError::VertexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            }),
            None => Ok(()),
        }
    }

    /// The three corner positions of the triangle at `base`.
    pub fn triangle(&self, base: u32) -> Result<[Point3<f32>; 3], BvhError> {
        self.check_triangle(base)?;
        let b = base as usize;
        Ok([
            self.vertices[self.indices[b] as usize].position,
            self.vertices[self.indices[b + 1] as usize].position,
            self.vertices[self.indices[b + 2] as usize].position,
        ])
    }

    /// Bounding box of the triangle at `base`.
    pub fn triangle_aabb(&self, base: u32) -> Result<Aabb, BvhError> {
        self.triangle(base).map(|corners| Aabb::from_points(&corners))
    }

    /// Bounding box of all referenced vertices.
    pub fn aabb(&self) -> Aabb {
        self.triangle_bases()
            .filter_map(|base| self.triangle_aabb(base).ok())
            .fold(Aabb::EMPTY, |acc, aabb| acc.merged(&aabb))
    }

    /// Resolves the BVH's candidate triangles to the one nearest the ray origin.
    pub fn closest_hit(&self, bvh: &Bvh, ray: &Ray) -> Option<MeshHit> {
        let mut candidates = Vec::new();
        if !bvh.traverse_ray(ray, &mut candidates) {
            return None;
        }
        self.closest_candidate(&candidates, ray)
    }

    /// Nearest triangle hit among `candidates`, as gathered by
    /// [`Bvh::traverse_ray`]. Invalid bases are skipped.
    pub fn closest_candidate(&self, candidates: &[u32], ray: &Ray) -> Option<MeshHit> {
        candidates
            .iter()
            .filter_map(|&base| {
                let corners = self.triangle(base).ok()?;
                let distance = ray_triangle_distance(ray, &corners)?;
                Some(MeshHit {
                    triangle_base: base,
                    distance,
                    point: ray.at(distance),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Two-sided Möller–Trumbore ray/triangle test.
///
/// Returns the ray parameter of the hit, or `None` for a miss, a hit behind
/// the origin, or a degenerate triangle.
pub fn ray_triangle_distance(ray: &Ray, [a, b, c]: &[Point3<f32>; 3]) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let ab = b - a;
    let ac = c - a;
    let p = ray.direction.cross(&ac);
    let det = ab.dot(&p);
    if det.abs() < EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let to_origin = ray.origin - a;
    let u = to_origin.dot(&p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = to_origin.cross(&ab);
    let v = ray.direction.dot(&q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = ac.dot(&q) * inv_det;
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_unit_square() -> Mesh {
        Mesh::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn triangle_count_ignores_trailing_indices() {
        let mut mesh = make_unit_square();
        assert_eq!(mesh.triangle_count(), 2);
        mesh.indices.push(1);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle_bases().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn check_triangle_rejects_bad_bases() {
        let mesh = make_unit_square();
        assert!(mesh.check_triangle(0).is_ok());
        assert!(mesh.check_triangle(3).is_ok());
        assert!(matches!(
            mesh.check_triangle(1),
            Err(BvhError::MisalignedTriangle { base: 1 })
        ));
        assert!(matches!(
            mesh.check_triangle(6),
            Err(BvhError::TriangleOutOfRange { base: 6, index_count: 6 })
        ));
    }

    #[test]
    fn vertex_out_of_range_is_reported() {
        let mut mesh = make_unit_square();
        mesh.indices[4] = 9;
        assert!(matches!(
            mesh.check_triangle(3),
            Err(BvhError::VertexOutOfRange { index: 9, vertex_count: 4 })
        ));
        assert!(mesh.validate_indices().is_err());
        assert!(mesh.triangle(3).is_err());
    }

    #[test]
    fn triangle_aabb_matches_corners() {
        let mesh = make_unit_square();
        let aabb = mesh.triangle_aabb(3).unwrap();
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(aabb.max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn ray_triangle_hit_and_miss() {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let hit = Ray::new(Point3::new(0.75, 0.25, -2.0), Vector3::new(0.0, 0.0, 1.0));
        let t = ray_triangle_distance(&hit, &corners).unwrap();
        assert!((t - 2.0).abs() < 1e-5);

        // Inside the square but on the other triangle's half.
        let miss = Ray::new(Point3::new(0.25, 0.75, -2.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(ray_triangle_distance(&miss, &corners).is_none());

        // Pointing away.
        let away = Ray::new(Point3::new(0.75, 0.25, -2.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ray_triangle_distance(&away, &corners).is_none());
    }

    #[test]
    fn ray_triangle_is_two_sided() {
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let from_above = Ray::new(Point3::new(0.75, 0.25, 3.0), Vector3::new(0.0, 0.0, -1.0));
        let t = ray_triangle_distance(&from_above, &corners).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn closest_hit_picks_nearest_triangle() {
        // Two parallel squares, the nearer one at z = 1.
        let mut positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        positions.extend([
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
        ]);
        let mesh = Mesh::from_positions(&positions, vec![0, 1, 2, 3, 4, 5]);

        let mut bvh = Bvh::new();
        bvh.build(&mesh).unwrap();

        let ray = Ray::new(Point3::new(0.75, 0.25, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = mesh.closest_hit(&bvh, &ray).unwrap();
        assert_eq!(hit.triangle_base, 3);
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.point.z - 1.0).abs() < 1e-5);

        let miss = Ray::new(Point3::new(5.0, 5.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(mesh.closest_hit(&bvh, &miss).is_none());
    }

    #[test]
    fn closest_candidate_uses_given_candidates() {
        let mesh = Mesh::from_positions(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(1.0, 1.0, 1.0),
            ],
            vec![0, 1, 2, 3, 4, 5],
        );
        let ray = Ray::new(Point3::new(0.75, 0.25, 5.0), Vector3::new(0.0, 0.0, -1.0));

        assert_eq!(mesh.closest_candidate(&[0, 3], &ray).unwrap().triangle_base, 3);
        // Only the far triangle offered: it wins even though a nearer one exists.
        assert_eq!(mesh.closest_candidate(&[0], &ray).unwrap().triangle_base, 0);
        // Out-of-range and misaligned bases are ignored.
        assert_eq!(mesh.closest_candidate(&[9, 1, 0], &ray).unwrap().triangle_base, 0);
        assert!(mesh.closest_candidate(&[], &ray).is_none());

        let bvh = Bvh::from_mesh(&mesh).unwrap();
        let mut candidates = Vec::new();
        bvh.traverse_ray(&ray, &mut candidates);
        assert_eq!(mesh.closest_candidate(&candidates, &ray), mesh.closest_hit(&bvh, &ray));
    }
}
