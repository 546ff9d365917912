// src/core/raymarch.rs
// Volume raymarcher: slab-test box intersection, fixed-step density
// integration with a shadow sub-march toward the light, Henyey-Greenstein
// scattering, Beer-Lambert extinction, and the empirical powder term.

use glam::{Mat4, Vec3};

use crate::core::atlas::AtlasBuffer;
use crate::core::params::ParamsSnapshot;
use crate::core::sampler::sample_volume;

/// Fixed step counts bound worst-case cost per pixel deterministically.
pub const MARCH_STEPS: u32 = 64;
pub const SHADOW_STEPS: u32 = 8;

/// Travel distance ceiling inside the box.
const MAX_TRAVEL: f32 = 9999.0;

/// Below this magnitude a direction component is treated as parallel to the
/// slab instead of dividing through to a NaN.
const DIR_EPSILON: f32 = 1e-8;

/// Floor for the Henyey-Greenstein denominator before exponentiation.
const HG_EPSILON: f32 = 1e-6;

/// Per-pixel raymarch result: straight RGB plus opacity. Opacity 0 means the
/// ray never touched visible density and the caller should skip the pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchOutput {
    pub color: Vec3,
    pub opacity: f32,
}

impl MarchOutput {
    pub const TRANSPARENT: Self = Self {
        color: Vec3::ZERO,
        opacity: 0.0,
    };
}

/// Slab-method intersection of a ray with an axis-aligned box.
/// Returns (t_enter, t_exit); the ray hits iff t_enter < t_exit (and the
/// interval overlaps t > 0 for a forward hit).
pub fn intersect_box(origin: Vec3, dir: Vec3, box_min: Vec3, box_max: Vec3) -> (f32, f32) {
    let (tx0, tx1) = slab_axis(origin.x, dir.x, box_min.x, box_max.x);
    let (ty0, ty1) = slab_axis(origin.y, dir.y, box_min.y, box_max.y);
    let (tz0, tz1) = slab_axis(origin.z, dir.z, box_min.z, box_max.z);

    let t_enter = tx0.max(ty0).max(tz0);
    let t_exit = tx1.min(ty1).min(tz1);
    (t_enter, t_exit)
}

fn slab_axis(origin: f32, dir: f32, min: f32, max: f32) -> (f32, f32) {
    if dir.abs() < DIR_EPSILON {
        // Parallel to the slab: either always inside it or never.
        if origin < min || origin > max {
            (f32::INFINITY, f32::NEG_INFINITY)
        } else {
            (f32::NEG_INFINITY, f32::INFINITY)
        }
    } else {
        let inv = 1.0 / dir;
        let t0 = (min - origin) * inv;
        let t1 = (max - origin) * inv;
        (t0.min(t1), t0.max(t1))
    }
}

/// Henyey-Greenstein phase value softened by p/(1+p) to keep strong forward
/// scattering from spiking unbounded.
pub fn henyey_greenstein_soft(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let numerator = 1.0 - g2;
    let denom_base = (1.0 + g2 - 2.0 * g * cos_theta).max(HG_EPSILON);
    let denom = denom_base.powf(1.5);
    let phase = numerator / (4.0 * std::f32::consts::PI * denom);
    phase / (1.0 + phase)
}

/// March one world-space ray through the volume.
///
/// `local_from_world` is the inverse of the volume's world transform; the
/// box test runs axis-aligned in local space regardless of placement.
pub fn march_ray(
    atlas: &AtlasBuffer,
    params: &ParamsSnapshot,
    local_from_world: Mat4,
    ray_origin_world: Vec3,
    ray_dir_world: Vec3,
) -> MarchOutput {
    let origin = (local_from_world * ray_origin_world.extend(1.0)).truncate();
    let dir = (local_from_world * ray_dir_world.extend(0.0))
        .truncate()
        .normalize_or_zero();
    if dir == Vec3::ZERO {
        return MarchOutput::TRANSPARENT;
    }

    let box_min = -0.5 * params.box_extents;
    let box_max = 0.5 * params.box_extents;
    let extent = box_max - box_min;
    if extent.min_element() <= 0.0 {
        // A collapsed axis leaves no interior to march.
        return MarchOutput::TRANSPARENT;
    }

    let (t_enter, t_exit) = intersect_box(origin, dir, box_min, box_max);
    if t_enter >= t_exit || t_exit <= 0.0 {
        return MarchOutput::TRANSPARENT;
    }

    let dst_to_box = t_enter.max(0.0);
    let dst_inside = (t_exit - dst_to_box).clamp(0.0, MAX_TRAVEL);
    let step_size = dst_inside / MARCH_STEPS as f32;

    // Phase and light geometry are constant along the ray; evaluated once,
    // in world space.
    let to_sun = -params.light_direction;
    let sun_step = params.box_extents.z / SHADOW_STEPS as f32;
    let cos_theta = ray_dir_world.normalize_or_zero().dot(params.light_direction);
    let phase_soft = henyey_greenstein_soft(cos_theta, params.asymmetry);

    let mut total_density = 0.0f32;
    // Carried across main-loop steps, not reset per sample: shadowing
    // deepens monotonically along the view ray.
    let mut density_to_sun = 0.0f32;
    let mut light_accum = 0.0f32;
    let mut traveled = 0.0f32;

    for _ in 0..MARCH_STEPS {
        let p = origin + dir * (dst_to_box + traveled);
        let uvw = (p - box_min) / extent;
        let sample = sample_volume(atlas, uvw);

        // 3-octave fractal blend of the first three channels.
        let wfbm =
            (sample.x * 0.625 + sample.y * 0.25 + sample.z * 0.125) * params.density_scale;

        if wfbm > params.visibility_threshold {
            for i in 0..SHADOW_STEPS {
                let p_sun = p + to_sun * (sun_step * i as f32);
                let uvw_sun = (p_sun - box_min) / extent;
                density_to_sun += sample_volume(atlas, uvw_sun).x * params.density_scale;
            }
            let sun_trans = (-density_to_sun * params.light_absorption).exp()
                * params.sun_transmittance_scale;
            let shadow =
                params.darkness_threshold + sun_trans * (1.0 - params.darkness_threshold);
            let powder = (-2.0 * wfbm).exp();
            light_accum += wfbm * phase_soft * shadow * powder;

            total_density += wfbm;
        }

        traveled += step_size;
    }

    let transmittance = (-total_density / params.intensity).exp();
    let opacity = 1.0 - transmittance;
    // Inverted/subtractive base blend: dense regions pull toward base_color.
    let base = Vec3::ONE - params.base_color * transmittance;
    let color = base + Vec3::splat(light_accum * params.light_intensity);
    MarchOutput { color, opacity }
}
