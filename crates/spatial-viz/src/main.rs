use macroquad::prelude::*;

const VIEWERS: [(&str, &str); 2] = [
    ("level", "random level boxes in a BSP, navigate cells with L / R / P / T"),
    ("picking", "height-field mesh in a BVH, pick triangles with the mouse"),
];

#[macroquad::main("Spatial Tree Visualization")]
async fn main() {
    loop {
        clear_background(BLACK);

        draw_text("Spatial Tree Visualization", 20.0, 40.0, 30.0, WHITE);
        for (i, (name, description)) in VIEWERS.iter().enumerate() {
            let y = 80.0 + i as f32 * 24.0;
            draw_text(
                &format!("cargo run --bin {name}"),
                20.0,
                y,
                20.0,
                YELLOW,
            );
            draw_text(description, 300.0, y, 18.0, GRAY);
        }

        next_frame().await
    }
}
