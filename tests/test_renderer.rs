// tests/test_renderer.rs
// Renderer lifecycle: bake sequencing through the generation counter, frame
// output sanity, and RGBA8 compositing.

use glam::Vec3;
use nimbus3d::{Camera, CloudError, CloudParams, CloudRenderer, NoiseBakeParams};

fn small_bake() -> NoiseBakeParams {
    NoiseBakeParams {
        resolution: 8,
        columns: 2,
        rows: 2,
        frequencies: [3.0, 8.0, 40.0, 1.0],
    }
}

fn cloud_camera() -> Camera {
    Camera::look_at(Vec3::new(-90.0, 110.0, -90.0), Vec3::ZERO)
}

#[test]
fn render_before_bake_is_an_error() {
    let renderer = CloudRenderer::new(CloudParams::default(), small_bake()).expect("valid setup");
    let err = renderer.render(&cloud_camera(), 8, 6).unwrap_err();
    assert!(matches!(err, CloudError::Render(_)));
}

#[test]
fn baked_renderer_produces_a_sane_frame() {
    let mut renderer =
        CloudRenderer::new(CloudParams::default(), small_bake()).expect("valid setup");
    renderer.ensure_baked().expect("bake succeeds");

    let frame = renderer.render(&cloud_camera(), 16, 12).expect("render succeeds");
    assert_eq!(frame.width(), 16);
    assert_eq!(frame.height(), 12);
    assert_eq!(frame.pixels().len(), 16 * 12);
    // 16 bytes per RGBA f32 pixel.
    assert_eq!(frame.as_bytes().len(), 16 * 12 * 16);

    for px in frame.pixels() {
        for c in px {
            assert!(c.is_finite(), "non-finite channel in {:?}", px);
        }
        assert!((0.0..=1.0).contains(&px[3]), "opacity {} out of range", px[3]);
    }
}

#[test]
fn changing_bake_params_invalidates_the_atlas() {
    let mut renderer =
        CloudRenderer::new(CloudParams::default(), small_bake()).expect("valid setup");
    renderer.ensure_baked().expect("bake succeeds");
    assert!(!renderer.needs_bake());

    // No-op change keeps the atlas fresh.
    renderer.set_bake_params(small_bake()).expect("valid params");
    assert!(!renderer.needs_bake());
    renderer.render(&cloud_camera(), 4, 4).expect("render still allowed");

    // A real change makes rendering fail until the next bake.
    let mut changed = small_bake();
    changed.resolution = 16;
    renderer.set_bake_params(changed).expect("valid params");
    assert!(renderer.needs_bake());
    assert!(renderer.render(&cloud_camera(), 4, 4).is_err());

    renderer.ensure_baked().expect("rebake succeeds");
    renderer.render(&cloud_camera(), 4, 4).expect("render after rebake");
}

#[test]
fn shading_edits_need_no_rebake() {
    let mut renderer =
        CloudRenderer::new(CloudParams::default(), small_bake()).expect("valid setup");
    renderer.ensure_baked().expect("bake succeeds");

    renderer.params_mut().density_scale = 3.5;
    assert!(!renderer.needs_bake());
    renderer.render(&cloud_camera(), 4, 4).expect("render succeeds");
}

#[test]
fn rgba8_composite_blends_over_the_background() {
    let mut renderer =
        CloudRenderer::new(CloudParams::default(), small_bake()).expect("valid setup");
    renderer.ensure_baked().expect("bake succeeds");

    let frame = renderer.render(&cloud_camera(), 8, 6).expect("render succeeds");
    let sky = Vec3::new(0.53, 0.70, 0.92);
    let rgba = frame.to_rgba8_over(sky);
    assert_eq!(rgba.len(), 8 * 6 * 4);
    for px in rgba.chunks_exact(4) {
        assert_eq!(px[3], 255);
    }

    // A transparent pixel reproduces the background exactly.
    let empty = nimbus3d::Framebuffer::new(1, 1);
    let out = empty.to_rgba8_over(sky);
    assert_eq!(out[0], (0.53f32 * 255.0 + 0.5) as u8);
    assert_eq!(out[1], (0.70f32 * 255.0 + 0.5) as u8);
    assert_eq!(out[2], (0.92f32 * 255.0 + 0.5) as u8);
}
