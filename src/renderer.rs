// src/renderer.rs
// Frame driver boundary: owns the parameter sets, the volume placement, and
// the published atlas; issues one raymarch per pixel per frame across the
// worker pool. A generation counter tracks bake-parameter edits so a stale
// atlas is never sampled.

use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};

use crate::camera::{Camera, RayGenerator};
use crate::core::atlas::{self, AtlasBuffer};
use crate::core::params::{CloudParams, NoiseBakeParams};
use crate::core::raymarch::march_ray;
use crate::core::{parallel, sun};
use crate::error::{CloudError, CloudResult};

/// RGBA float render target produced by one raymarch pass. The alpha channel
/// carries coverage (raymarch opacity, plus marker coverage where the sun
/// overlay draws); 0 means "nothing here, skip".
#[derive(Debug)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [f32; 4] {
        &mut self.pixels[(y * self.width + x) as usize]
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub(crate) fn set_row(&mut self, y: u32, row: Vec<[f32; 4]>) {
        debug_assert_eq!(row.len(), self.width as usize);
        let start = (y * self.width) as usize;
        self.pixels[start..start + row.len()].copy_from_slice(&row);
    }

    /// Composite over a flat background color and quantize to RGBA8.
    /// Zero-opacity pixels pass the background through untouched.
    pub fn to_rgba8_over(&self, background: Vec3) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for px in &self.pixels {
            let alpha = px[3].clamp(0.0, 1.0);
            let rgb = if alpha <= 0.0 {
                background
            } else {
                background * (1.0 - alpha) + Vec3::new(px[0], px[1], px[2]) * alpha
            };
            out.push(float_to_u8(rgb.x));
            out.push(float_to_u8(rgb.y));
            out.push(float_to_u8(rgb.z));
            out.push(255);
        }
        out
    }
}

fn float_to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

/// Main cloud rendering system: bake sequencing plus the per-frame raymarch
/// dispatch.
pub struct CloudRenderer {
    params: CloudParams,
    bake_params: NoiseBakeParams,
    world_from_local: Mat4,
    atlas: Option<Arc<AtlasBuffer>>,
    bake_generation: u64,
    baked_generation: u64,
}

impl CloudRenderer {
    pub fn new(params: CloudParams, bake_params: NoiseBakeParams) -> CloudResult<Self> {
        params.validate()?;
        bake_params.validate()?;
        Ok(Self {
            params,
            bake_params,
            world_from_local: Mat4::IDENTITY,
            atlas: None,
            bake_generation: 1,
            baked_generation: 0,
        })
    }

    pub fn params(&self) -> &CloudParams {
        &self.params
    }

    /// Shading and geometry edits take effect on the very next render; no
    /// rebake involved.
    pub fn params_mut(&mut self) -> &mut CloudParams {
        &mut self.params
    }

    pub fn bake_params(&self) -> &NoiseBakeParams {
        &self.bake_params
    }

    /// Replace the bake parameters. A real change invalidates the published
    /// atlas until the next `ensure_baked`.
    pub fn set_bake_params(&mut self, bake_params: NoiseBakeParams) -> CloudResult<()> {
        bake_params.validate()?;
        if bake_params != self.bake_params {
            self.bake_params = bake_params;
            self.bake_generation += 1;
        }
        Ok(())
    }

    /// Place the volume in the world.
    pub fn set_world_transform(&mut self, world_from_local: Mat4) {
        self.world_from_local = world_from_local;
    }

    pub fn world_transform(&self) -> Mat4 {
        self.world_from_local
    }

    pub fn needs_bake(&self) -> bool {
        self.baked_generation != self.bake_generation
    }

    /// Bake if the published atlas is stale. The fresh buffer is built in
    /// full, then published atomically; the previous buffer is released only
    /// afterwards, so a concurrent reader holding the old `Arc` stays valid.
    pub fn ensure_baked(&mut self) -> CloudResult<()> {
        if !self.needs_bake() {
            return Ok(());
        }
        let generation = self.bake_generation;
        let fresh = atlas::bake(&self.bake_params)?;
        self.atlas = Some(Arc::new(fresh));
        self.baked_generation = generation;
        Ok(())
    }

    pub fn atlas(&self) -> Option<&Arc<AtlasBuffer>> {
        self.atlas.as_ref()
    }

    /// Raymarch one frame. Fails if no up-to-date atlas is published; the
    /// caller sequences `ensure_baked` ahead of rendering.
    pub fn render(&self, camera: &Camera, width: u32, height: u32) -> CloudResult<Framebuffer> {
        let atlas = match &self.atlas {
            Some(atlas) if !self.needs_bake() => Arc::clone(atlas),
            _ => {
                return Err(CloudError::render(
                    "atlas is stale or missing; call ensure_baked() before rendering",
                ))
            }
        };

        let snapshot = self.params.snapshot()?;
        let rays = RayGenerator::new(camera, width, height)?;
        let local_from_world = self.world_from_local.inverse();
        let started = Instant::now();

        let rows = parallel::run_rows(height as usize, move |y| {
            let mut row = Vec::with_capacity(width as usize);
            for x in 0..width {
                let (origin, dir) = rays.ray(x, y as u32);
                let out = march_ray(&atlas, &snapshot, local_from_world, origin, dir);
                row.push([out.color.x, out.color.y, out.color.z, out.opacity]);
            }
            row
        })?;

        let mut frame = Framebuffer::new(width, height);
        for (y, row) in rows.into_iter().enumerate() {
            frame.set_row(y as u32, row);
        }

        sun::render_sun(&mut frame, camera, self.params.light_direction);

        log::debug!(
            "raymarched {}x{} frame in {:.1} ms",
            width,
            height,
            started.elapsed().as_secs_f32() * 1e3
        );
        Ok(frame)
    }
}
