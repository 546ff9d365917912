// src/core/noise.rs
// Deterministic 3-D gradient (Perlin) and cellular (Worley) noise primitives.
// These feed the atlas baker; both are seedless pure functions so a bake with
// identical parameters reproduces bit-for-bit.

use glam::Vec3;

/// Integer lattice hash. Fixed constants keep every bake reproducible.
fn hash3(x: i32, y: i32, z: i32) -> u32 {
    let mut h = x
        .wrapping_mul(374_761_393)
        .wrapping_add(y.wrapping_mul(668_265_263))
        .wrapping_add(z.wrapping_mul(1_911_520_717));
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    (h ^ (h >> 16)) as u32
}

/// Quintic fade curve: 6t^5 - 15t^4 + 10t^3
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Gradient dot product over the 16 classic edge directions.
fn grad_dot(hash: u32, x: f32, y: f32, z: f32) -> f32 {
    match hash & 15 {
        0 => x + y,
        1 => -x + y,
        2 => x - y,
        3 => -x - y,
        4 => x + z,
        5 => -x + z,
        6 => x - z,
        7 => -x - z,
        8 => y + z,
        9 => -y + z,
        10 => y - z,
        11 => -y - z,
        12 => y + x,
        13 => -y + z,
        14 => y - x,
        _ => -y - z,
    }
}

/// Classic 3-D gradient noise, output approximately in [-1, 1].
pub fn perlin3(p: Vec3) -> f32 {
    let xi = p.x.floor() as i32;
    let yi = p.y.floor() as i32;
    let zi = p.z.floor() as i32;

    let fx = p.x - p.x.floor();
    let fy = p.y - p.y.floor();
    let fz = p.z - p.z.floor();

    let u = fade(fx);
    let v = fade(fy);
    let w = fade(fz);

    let n000 = grad_dot(hash3(xi, yi, zi), fx, fy, fz);
    let n100 = grad_dot(hash3(xi + 1, yi, zi), fx - 1.0, fy, fz);
    let n010 = grad_dot(hash3(xi, yi + 1, zi), fx, fy - 1.0, fz);
    let n110 = grad_dot(hash3(xi + 1, yi + 1, zi), fx - 1.0, fy - 1.0, fz);
    let n001 = grad_dot(hash3(xi, yi, zi + 1), fx, fy, fz - 1.0);
    let n101 = grad_dot(hash3(xi + 1, yi, zi + 1), fx - 1.0, fy, fz - 1.0);
    let n011 = grad_dot(hash3(xi, yi + 1, zi + 1), fx, fy - 1.0, fz - 1.0);
    let n111 = grad_dot(hash3(xi + 1, yi + 1, zi + 1), fx - 1.0, fy - 1.0, fz - 1.0);

    let nx00 = lerp(n000, n100, u);
    let nx10 = lerp(n010, n110, u);
    let nx01 = lerp(n001, n101, u);
    let nx11 = lerp(n011, n111, u);

    let nxy0 = lerp(nx00, nx10, v);
    let nxy1 = lerp(nx01, nx11, v);
    lerp(nxy0, nxy1, w)
}

/// Cellular (Worley) noise: F1 euclidean distance to the nearest feature
/// point, one feature per unit cell, clamped to [0, 1].
pub fn worley3(p: Vec3) -> f32 {
    let xi = p.x.floor() as i32;
    let yi = p.y.floor() as i32;
    let zi = p.z.floor() as i32;

    let mut min_d2 = f32::MAX;
    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                let cx = xi + dx;
                let cy = yi + dy;
                let cz = zi + dz;
                let h = hash3(cx, cy, cz);
                let feature = Vec3::new(
                    cx as f32 + (h & 0xff) as f32 / 255.0,
                    cy as f32 + ((h >> 8) & 0xff) as f32 / 255.0,
                    cz as f32 + ((h >> 16) & 0xff) as f32 / 255.0,
                );
                min_d2 = min_d2.min((p - feature).length_squared());
            }
        }
    }
    min_d2.sqrt().min(1.0)
}
