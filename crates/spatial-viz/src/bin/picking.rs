use macroquad::models::draw_mesh;
use macroquad::prelude::*;
use nalgebra::Point3;
use ::rand::rngs::StdRng;
use ::rand::{Rng, SeedableRng};
use spatial_tree::{Bvh, Mesh};
use spatial_viz::{
    build_mesh_models, draw_aabb_wires, draw_triangle_highlight, mouse_ray, OrbitCamera,
};

const GRID_CELLS: u32 = 48;
const CELL_SIZE: f32 = 1.0;
const HEIGHT_SCALE: f32 = 3.0;
const NOISE: f32 = 0.3;
const SEED: u64 = 42;

/// Generates a bumpy height field, two triangles per grid cell.
fn generate_terrain(seed: u64) -> Mesh {
    let mut rng = StdRng::seed_from_u64(seed);
    let side = GRID_CELLS + 1;
    let offset = GRID_CELLS as f32 * CELL_SIZE / 2.0;

    let mut positions = Vec::with_capacity((side * side) as usize);
    for row in 0..side {
        for col in 0..side {
            let x = col as f32 * CELL_SIZE - offset;
            let z = row as f32 * CELL_SIZE - offset;
            let y = (x * 0.3).sin() * (z * 0.25).cos() * HEIGHT_SCALE
                + rng.gen_range(-NOISE..NOISE);
            positions.push(Point3::new(x, y, z));
        }
    }

    let mut indices = Vec::with_capacity((GRID_CELLS * GRID_CELLS * 6) as usize);
    for row in 0..GRID_CELLS {
        for col in 0..GRID_CELLS {
            let i = row * side + col;
            indices.extend_from_slice(&[i, i + side, i + 1, i + 1, i + side, i + side + 1]);
        }
    }

    Mesh::from_positions(&positions, indices)
}

/// Draws the boxes of every BVH node at `depth` (root is depth 0).
fn draw_bvh_level(bvh: &Bvh, depth: usize) {
    let Some(root) = bvh.root() else {
        return;
    };

    let color = Color::from_rgba(80, 200, 255, 180);
    let mut stack = vec![(root, 0)];
    while let Some((index, level)) = stack.pop() {
        let Some(node) = bvh.node(index) else {
            continue;
        };
        if level == depth || node.is_leaf() {
            draw_aabb_wires(node.aabb(), color);
            continue;
        }
        if let Some((child1, child2)) = node.children() {
            stack.push((child1, level + 1));
            stack.push((child2, level + 1));
        }
    }
}

#[macroquad::main("BVH Picking")]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mesh = generate_terrain(SEED);
    let bvh = match Bvh::from_mesh(&mesh) {
        Ok(bvh) => bvh,
        Err(err) => {
            log::error!("failed to build BVH: {err}");
            return;
        }
    };
    let models = match build_mesh_models(&mesh, Color::from_rgba(120, 170, 110, 255)) {
        Ok(models) => models,
        Err(err) => {
            log::error!("failed to convert mesh: {err}");
            return;
        }
    };
    log::info!(
        "BVH over {} triangles: {} nodes, depth {}, cost {:.1}",
        mesh.triangle_count(),
        bvh.node_count(),
        bvh.depth(),
        bvh.cost()
    );

    let mut camera = OrbitCamera::framing(&bvh.root_aabb(), 0.5, 0.7);
    let mut show_boxes = false;
    let mut box_depth = 0;
    let mut candidates = Vec::new();

    loop {
        camera.update();

        if is_key_pressed(KeyCode::B) {
            show_boxes = !show_boxes;
        }
        if is_key_pressed(KeyCode::RightBracket) && box_depth + 1 < bvh.depth() {
            box_depth += 1;
        }
        if is_key_pressed(KeyCode::LeftBracket) {
            box_depth = box_depth.saturating_sub(1);
        }

        let camera3d = camera.to_camera3d();
        let ray = mouse_ray(&camera3d);

        candidates.clear();
        let hit = ray.and_then(|ray| {
            bvh.traverse_ray(&ray, &mut candidates);
            mesh.closest_candidate(&candidates, &ray)
        });
        if is_mouse_button_pressed(MouseButton::Left) {
            match hit {
                Some(hit) => log::info!(
                    "picked triangle {} at {} (distance {:.2}, {} candidates)",
                    hit.triangle_base / 3,
                    hit.point,
                    hit.distance,
                    candidates.len()
                ),
                None => log::debug!("no triangle under the cursor"),
            }
        }

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera3d);

        for model in &models {
            draw_mesh(model);
        }
        if show_boxes {
            draw_bvh_level(&bvh, box_depth);
        }
        for &base in &candidates {
            draw_triangle_highlight(&mesh, base, Color::from_rgba(255, 230, 80, 90));
        }
        if let Some(hit) = hit {
            draw_triangle_highlight(&mesh, hit.triangle_base, RED);
        }

        set_default_camera();

        draw_text(
            &format!(
                "BVH Picking - {} triangles | {} nodes | depth {}",
                mesh.triangle_count(),
                bvh.node_count(),
                bvh.depth()
            ),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        let status = match hit {
            Some(hit) => format!(
                "Triangle {} | distance {:.2} | {} candidates",
                hit.triangle_base / 3,
                hit.distance,
                candidates.len()
            ),
            None => format!("No hit | {} candidates", candidates.len()),
        };
        draw_text(&status, 10.0, 45.0, 18.0, YELLOW);
        draw_text(
            &format!(
                "[B]oxes: {} | [ ] box depth: {}",
                if show_boxes { "on" } else { "off" },
                box_depth
            ),
            10.0,
            65.0,
            18.0,
            GRAY,
        );
        draw_text(
            "Right drag to rotate, scroll to zoom, left click to log pick",
            10.0,
            155.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 175.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
