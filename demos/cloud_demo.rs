// demos/cloud_demo.rs
// Bake a noise atlas, raymarch one frame of the cloud volume, and write the
// composited result to cloud_demo.png.
//
// Run with: cargo run --release --example cloud_demo

use anyhow::{Context, Result};
use glam::Vec3;
use nimbus3d::{Camera, CloudParams, CloudRenderer, NoiseBakeParams};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;
const SKY: Vec3 = Vec3::new(0.53, 0.70, 0.92);

fn main() -> Result<()> {
    env_logger::init();

    let bake = NoiseBakeParams {
        resolution: 32,
        columns: 8,
        rows: 8,
        ..Default::default()
    };
    let mut renderer = CloudRenderer::new(CloudParams::default(), bake)?;

    let started = std::time::Instant::now();
    renderer.ensure_baked()?;
    let bake_ms = started.elapsed().as_secs_f32() * 1e3;

    let camera = Camera::look_at(Vec3::new(-90.0, 110.0, -90.0), Vec3::ZERO);
    let started = std::time::Instant::now();
    let frame = renderer.render(&camera, WIDTH, HEIGHT)?;
    let render_ms = started.elapsed().as_secs_f32() * 1e3;

    let rgba = frame.to_rgba8_over(SKY);
    let image = image::RgbaImage::from_raw(WIDTH, HEIGHT, rgba)
        .context("frame bytes did not fill the image")?;
    image
        .save("cloud_demo.png")
        .context("failed to write cloud_demo.png")?;

    let atlas = renderer.atlas().expect("atlas published after bake");
    println!(
        "atlas: {}x{} ({} slices of {}^2 texels)",
        atlas.width(),
        atlas.height(),
        atlas.slice_count(),
        atlas.resolution()
    );
    println!("bake:   {bake_ms:.1} ms");
    println!("render: {render_ms:.1} ms for {WIDTH}x{HEIGHT}");
    println!("wrote cloud_demo.png");
    Ok(())
}
