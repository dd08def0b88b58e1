use macroquad::prelude::*;
use nalgebra::Point3;
use ::rand::rngs::StdRng;
use ::rand::{Rng, SeedableRng};
use spatial_tree::bsp::{FewestIntersected, MostIntersected, PlaneSelector};
use spatial_tree::{Aabb, Bsp, BspOptions, Primitive};
use spatial_viz::{draw_aabb_wires, OrbitCamera, TreeNavigator};

const NUM_BOXES: usize = 120;
const NUM_BILLBOARDS: usize = 8;
const WORLD_SIZE: f32 = 60.0;
const MIN_BOX_SIZE: f32 = 0.5;
const MAX_BOX_SIZE: f32 = 6.0;
const MAX_SUBDIVISION_LEVELS: u32 = 8;
const SEED: u64 = 7;

/// A level component: a box, or a billboard without one.
#[derive(Debug, Clone)]
struct Prop {
    aabb: Aabb,
    location: Point3<f32>,
}

impl Primitive for Prop {
    fn world_aabb(&self) -> Aabb {
        self.aabb
    }

    fn relative_location(&self) -> Point3<f32> {
        self.location
    }
}

/// Generates random boxes in the world space, flattened like level geometry.
fn generate_props(seed: u64) -> Vec<Prop> {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = WORLD_SIZE / 2.0;
    let mut props = Vec::with_capacity(NUM_BOXES + NUM_BILLBOARDS);

    for _ in 0..NUM_BOXES {
        let min = Point3::new(
            rng.gen_range(-half..half),
            rng.gen_range(-half * 0.25..half * 0.25),
            rng.gen_range(-half..half),
        );
        let max = min
            + nalgebra::Vector3::new(
                rng.gen_range(MIN_BOX_SIZE..MAX_BOX_SIZE),
                rng.gen_range(MIN_BOX_SIZE..MAX_BOX_SIZE * 0.5),
                rng.gen_range(MIN_BOX_SIZE..MAX_BOX_SIZE),
            );
        let aabb = Aabb::new(min, max);
        props.push(Prop {
            aabb,
            location: aabb.center(),
        });
    }

    for _ in 0..NUM_BILLBOARDS {
        props.push(Prop {
            aabb: Aabb::EMPTY,
            location: Point3::new(rng.gen_range(-half..half), 0.0, rng.gen_range(-half..half)),
        });
    }

    props
}

fn build<S: PlaneSelector + Default>(props: &[Prop], levels: u32, name: &str) -> Bsp<Prop, S> {
    let options = BspOptions::default().with_subdivision_levels(levels);
    let mut bsp = Bsp::default().with_options(options);
    bsp.initialize(props);
    log::info!(
        "{name}: {} nodes, depth {}, minimum extent {:.2}",
        bsp.node_count(),
        bsp.depth(),
        bsp.minimum_extent()
    );
    bsp
}

/// Draws one frame of the scene for whichever tree is active.
fn draw_tree<S>(bsp: &Bsp<Prop, S>, navigator: &TreeNavigator, props: &[Prop], title: &str) {
    for prop in props {
        draw_aabb_wires(&prop.aabb, Color::from_rgba(60, 60, 70, 255));
    }
    navigator.render(bsp, Color::from_rgba(255, 120, 40, 120));

    set_default_camera();

    draw_text(
        &format!("BSP Level - {title} | {} primitives", bsp.primitive_count()),
        10.0,
        25.0,
        20.0,
        WHITE,
    );
    draw_text(
        &format!(
            "Nodes: {} | depth: {} | subdivision levels: {}",
            bsp.node_count(),
            bsp.depth(),
            bsp.options().subdivision_levels
        ),
        10.0,
        45.0,
        18.0,
        GRAY,
    );
    navigator.draw_ui(bsp, 70.0);
}

#[macroquad::main("BSP Level")]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let props = generate_props(SEED);
    log::info!("generated {} props", props.len());

    let mut levels = BspOptions::default().subdivision_levels;
    let mut most: Bsp<Prop, MostIntersected> = build(&props, levels, "most intersected");
    let mut fewest: Bsp<Prop, FewestIntersected> = build(&props, levels, "fewest intersected");
    let mut use_fewest = false;

    let bounds = most
        .root()
        .map_or(Aabb::new(Point3::origin(), Point3::origin()), |root| root.bounds());
    let mut camera = OrbitCamera::framing(&bounds, 0.6, 0.5);
    let mut navigator = TreeNavigator::new();

    loop {
        camera.update();

        let mut rebuild = false;
        if is_key_pressed(KeyCode::Tab) {
            use_fewest = !use_fewest;
            navigator.go_root();
        }
        if is_key_pressed(KeyCode::RightBracket) && levels < MAX_SUBDIVISION_LEVELS {
            levels += 1;
            rebuild = true;
        }
        if is_key_pressed(KeyCode::LeftBracket) && levels > 0 {
            levels -= 1;
            rebuild = true;
        }
        if rebuild {
            most = build(&props, levels, "most intersected");
            fewest = build(&props, levels, "fewest intersected");
            navigator.go_root();
        }

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        if use_fewest {
            navigator.update(&fewest);
            draw_tree(&fewest, &navigator, &props, "fewest intersected");
        } else {
            navigator.update(&most);
            draw_tree(&most, &navigator, &props, "most intersected");
        }

        draw_text(
            "Tab: switch plane selector | [ ]: subdivision levels | right drag: rotate",
            10.0,
            155.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 175.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
