// src/core/sun.rs
// Directional-light marker: a screen-facing billboard along the light
// direction, shaded as a bright core plus soft glow with a hard cutoff, and
// blended additively into the frame (no depth interaction). Marker coverage
// is carried in the alpha channel so the RGBA8 composite keeps the marker
// over otherwise empty sky.

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::renderer::Framebuffer;

/// World-space distance of the marker from the volume's center.
pub const SUN_OFFSET: f32 = 300.0;

/// World-space billboard edge length.
pub const SUN_QUAD_SIZE: f32 = 50.0;

const SUN_TINT: Vec3 = Vec3::new(1.0, 0.95, 0.85);

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Additively blend the light marker into `frame`. Does nothing when the
/// marker projects behind the camera or off to a degenerate size.
pub fn render_sun(frame: &mut Framebuffer, camera: &Camera, light_direction: Vec3) {
    let dir = light_direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return;
    }

    let width = frame.width();
    let height = frame.height();
    let aspect = width as f32 / height as f32;
    let view_proj = camera.view_proj(aspect);

    let center_world = dir * SUN_OFFSET;
    let clip = view_proj * center_world.extend(1.0);
    if clip.w <= 0.0 {
        return;
    }
    let ndc = clip.truncate() / clip.w;
    if ndc.z > 1.0 {
        return;
    }
    let center = Vec2::new(
        (ndc.x * 0.5 + 0.5) * width as f32,
        (0.5 - ndc.y * 0.5) * height as f32,
    );

    // Billboard always faces the camera: project a half-quad offset along
    // the camera's right axis to get the screen radius.
    let right = camera.view_matrix().row(0).truncate();
    let edge_clip = view_proj * (center_world + right * (SUN_QUAD_SIZE * 0.5)).extend(1.0);
    if edge_clip.w <= 0.0 {
        return;
    }
    let edge_ndc = edge_clip.truncate() / edge_clip.w;
    let edge = Vec2::new(
        (edge_ndc.x * 0.5 + 0.5) * width as f32,
        (0.5 - edge_ndc.y * 0.5) * height as f32,
    );
    let radius = center.distance(edge);
    if radius < 0.5 {
        return;
    }

    let x_min = ((center.x - radius).floor().max(0.0)) as u32;
    let x_max = ((center.x + radius).ceil().min(width as f32 - 1.0)) as u32;
    let y_min = ((center.y - radius).floor().max(0.0)) as u32;
    let y_max = ((center.y + radius).ceil().min(height as f32 - 1.0)) as u32;
    if x_min > x_max || y_min > y_max {
        return;
    }

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let r = p.distance(center) / radius;
            if r > 1.0 {
                // Hard circle cut.
                continue;
            }
            let core = (r * -80.0).exp() * 100.0;
            let glow = (r * -8.0).exp() * 4.0;
            let alpha = 1.0 - smoothstep(0.85, 1.0, r);
            let sun = SUN_TINT * (core + glow) * alpha;

            let pixel = frame.pixel_mut(x, y);
            pixel[0] += sun.x;
            pixel[1] += sun.y;
            pixel[2] += sun.z;
            // Without coverage the composite would swap a clear-sky marker
            // pixel for the background wholesale.
            pixel[3] = pixel[3].max(alpha);
        }
    }
}
