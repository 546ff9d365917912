// src/core/sampler.rs
// Tiled volume sampler: approximates trilinear filtering of the logical 3-D
// field with two bilinear 2-D fetches, the trick that lets a tiled atlas
// stand in for a true 3-D texture.

use glam::{Vec3, Vec4};

use crate::core::atlas::AtlasBuffer;

/// Sample the atlas as a 3-D field at `uvw`. Coordinates are clamped into
/// [0,1]^3 (edge-clamp addressing, matching the GPU sampler the layout was
/// designed for); the top slice blends with itself rather than wrapping.
pub fn sample_volume(atlas: &AtlasBuffer, uvw: Vec3) -> Vec4 {
    let uvw = uvw.clamp(Vec3::ZERO, Vec3::ONE);
    let last_slice = atlas.slice_count() - 1;

    let slice_z = uvw.z * last_slice as f32;
    let slice0 = slice_z.floor();
    let frac = slice_z - slice0;
    let slice0 = (slice0 as u32).min(last_slice);
    let slice1 = (slice0 + 1).min(last_slice);

    let s0 = sample_slice(atlas, uvw, slice0);
    let s1 = sample_slice(atlas, uvw, slice1);
    s0.lerp(s1, frac)
}

/// Bilinear fetch of one z-slice at in-tile coordinate (uvw.x, uvw.y).
fn sample_slice(atlas: &AtlasBuffer, uvw: Vec3, slice: u32) -> Vec4 {
    let col = slice % atlas.columns();
    let row = slice / atlas.columns();
    let u = (uvw.x + col as f32) / atlas.columns() as f32;
    let v = (uvw.y + row as f32) / atlas.rows() as f32;
    bilinear(atlas, u, v)
}

/// Standard bilinear filtering with half-texel centering and edge clamping
/// at the atlas bounds.
fn bilinear(atlas: &AtlasBuffer, u: f32, v: f32) -> Vec4 {
    let width = atlas.width() as i32;
    let height = atlas.height() as i32;

    let x = u * width as f32 - 0.5;
    let y = v * height as f32 - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;

    let x0i = (x0 as i32).clamp(0, width - 1) as u32;
    let x1i = (x0 as i32 + 1).clamp(0, width - 1) as u32;
    let y0i = (y0 as i32).clamp(0, height - 1) as u32;
    let y1i = (y0 as i32 + 1).clamp(0, height - 1) as u32;

    let t00 = atlas.texel(x0i, y0i).to_vec4();
    let t10 = atlas.texel(x1i, y0i).to_vec4();
    let t01 = atlas.texel(x0i, y1i).to_vec4();
    let t11 = atlas.texel(x1i, y1i).to_vec4();

    let top = t00.lerp(t10, tx);
    let bottom = t01.lerp(t11, tx);
    top.lerp(bottom, ty)
}
