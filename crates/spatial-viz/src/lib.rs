//! Shared visualization utilities for the spatial tree viewers.

use macroquad::models::{draw_mesh, Mesh as QuadMesh, Vertex as QuadVertex};
use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};
use spatial_tree::{Aabb, BspNode, BspNodeType, BvhError, Mesh, Ray};

pub mod navigator;
pub use navigator::TreeNavigator;

/// Largest vertex count macroquad can index with `u16`.
const MAX_QUAD_VERTICES: usize = u16::MAX as usize;

#[inline]
pub fn to_vec3(p: &Point3<f32>) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

#[inline]
pub fn to_point3(v: Vec3) -> Point3<f32> {
    Point3::new(v.x, v.y, v.z)
}

/// Fixed color for each BSP node shape, so cells read the same across frames.
pub fn node_color(node_type: BspNodeType) -> Color {
    match node_type {
        BspNodeType::Cube => Color::from_rgba(230, 230, 230, 255),
        BspNodeType::XYExtended => Color::from_rgba(90, 160, 255, 255),
        BspNodeType::YZExtended => Color::from_rgba(255, 110, 90, 255),
        BspNodeType::XZExtended => Color::from_rgba(110, 230, 120, 255),
        BspNodeType::XExtended => Color::from_rgba(255, 200, 60, 255),
        BspNodeType::YExtended => Color::from_rgba(200, 110, 255, 255),
        BspNodeType::ZExtended => Color::from_rgba(60, 220, 220, 255),
    }
}

/// Draws the edges of a box. Empty boxes are skipped.
pub fn draw_aabb_wires(aabb: &Aabb, color: Color) {
    if aabb.is_empty() {
        return;
    }
    let size = aabb.size();
    draw_cube_wires(to_vec3(&aabb.center()), vec3(size.x, size.y, size.z), color);
}

/// Draws a translucent solid box. Empty boxes are skipped.
pub fn draw_aabb_solid(aabb: &Aabb, color: Color) {
    if aabb.is_empty() {
        return;
    }
    let size = aabb.size();
    draw_cube(to_vec3(&aabb.center()), vec3(size.x, size.y, size.z), None, color);
}

/// Draws the cell of a BSP node in the color of its shape.
pub fn draw_bsp_cell<P>(node: &BspNode<P>) {
    draw_aabb_wires(&node.bounds(), node_color(node.node_type()));
}

/// Converts a mesh into flat-shaded macroquad meshes.
///
/// Vertices are unshared so every triangle gets its own shade. The result is
/// split into chunks that fit macroquad's 16-bit indices.
pub fn build_mesh_models(mesh: &Mesh, color: Color) -> Result<Vec<QuadMesh>, BvhError> {
    let light = Vector3::new(0.4, 1.0, 0.3).normalize();
    let per_chunk = MAX_QUAD_VERTICES / 3;

    let bases: Vec<u32> = mesh.triangle_bases().collect();
    let mut models = Vec::with_capacity(bases.len() / per_chunk + 1);

    for chunk in bases.chunks(per_chunk) {
        let mut vertices = Vec::with_capacity(chunk.len() * 3);
        for &base in chunk {
            let triangle = mesh.triangle(base)?;
            vertices.extend(shade_triangle(triangle, &light, color));
        }
        let indices = (0..vertices.len() as u16).collect();
        models.push(QuadMesh {
            vertices,
            indices,
            texture: None,
        });
    }

    Ok(models)
}

/// Draws a single triangle of `mesh`, slightly lifted along its normal.
pub fn draw_triangle_highlight(mesh: &Mesh, triangle_base: u32, color: Color) {
    let Ok([a, b, c]) = mesh.triangle(triangle_base) else {
        return;
    };
    let lift = face_normal(&a, &b, &c) * 0.02;
    let vertices = [a, b, c]
        .iter()
        .map(|p| QuadVertex::new2(to_vec3(&(p + lift)), vec2(0.0, 0.0), color))
        .collect();

    draw_mesh(&QuadMesh {
        vertices,
        indices: vec![0, 1, 2],
        texture: None,
    });
    draw_line_3d(to_vec3(&a), to_vec3(&b), WHITE);
    draw_line_3d(to_vec3(&b), to_vec3(&c), WHITE);
    draw_line_3d(to_vec3(&c), to_vec3(&a), WHITE);
}

/// Unit normal of a triangle, zero if it is degenerate.
fn face_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    (b - a)
        .cross(&(c - a))
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

fn shade_triangle(
    triangle: [Point3<f32>; 3],
    light: &Vector3<f32>,
    color: Color,
) -> [QuadVertex; 3] {
    let [a, b, c] = triangle;
    let brightness = 0.3 + 0.7 * face_normal(&a, &b, &c).dot(light).abs();
    let shaded = Color::new(
        color.r * brightness,
        color.g * brightness,
        color.b * brightness,
        color.a,
    );
    triangle.map(|p| QuadVertex::new2(to_vec3(&p), vec2(0.0, 0.0), shaded))
}

/// Unprojects the mouse cursor into a world-space ray for `camera`.
///
/// Returns `None` when the camera matrix cannot be inverted.
pub fn mouse_ray(camera: &Camera3D) -> Option<Ray> {
    let (mx, my) = mouse_position();
    let ndc = vec2(mx / screen_width() * 2.0 - 1.0, 1.0 - my / screen_height() * 2.0);

    let matrix = camera.matrix();
    if matrix.determinant().abs() < f32::EPSILON {
        return None;
    }
    let inverse = matrix.inverse();
    let near = inverse.project_point3(vec3(ndc.x, ndc.y, -1.0));
    let far = inverse.project_point3(vec3(ndc.x, ndc.y, 1.0));

    Ray::through(to_point3(near), to_point3(far))
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    /// Minimum distance from target
    pub min_distance: f32,
    /// Maximum distance from target
    pub max_distance: f32,
}

impl OrbitCamera {
    /// Creates a new orbit camera with the given configuration.
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 5.0,
            min_distance: 10.0,
            max_distance: 200.0,
        }
    }

    /// Creates a camera looking at the center of `aabb` from far enough away
    /// to see all of it, with zoom limits scaled to its size.
    pub fn framing(aabb: &Aabb, yaw: f32, pitch: f32) -> Self {
        let radius = (aabb.size().norm() * 0.5).max(1.0);
        Self::new(radius * 2.5, yaw, pitch)
            .with_zoom(radius * 0.1, radius * 0.2, radius * 8.0)
            .with_target(to_vec3(&aabb.center()))
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Sets the camera target point.
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Updates camera state from user input (right mouse drag, scroll, arrow keys).
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Right) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        // Clamp pitch to avoid gimbal lock
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }
    }

    /// Returns the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    /// Converts to macroquad's Camera3D for rendering.
    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            ..Default::default()
        }
    }
}
