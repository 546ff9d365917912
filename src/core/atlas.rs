// src/core/atlas.rs
// Noise field baker: synthesizes a 3-D density field and packs it into a
// tiled 2-D texture atlas. Tile (col, row) holds z-slice row*columns+col;
// every texel is a pure function of its own coordinates and the bake
// parameters, so rows bake in parallel with no ordering requirement.

use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::core::noise::{perlin3, worley3};
use crate::core::parallel;
use crate::core::params::NoiseBakeParams;
use crate::error::{CloudError, CloudResult};

/// One 4-channel atlas texel. R/G carry cellular noise, B/A gradient noise,
/// all inverted so higher values mean denser regions.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Texel(pub [f32; 4]);

impl Texel {
    pub fn to_vec4(self) -> Vec4 {
        Vec4::from_array(self.0)
    }
}

/// Immutable tiled atlas produced by one bake. Replaced wholesale on
/// re-bake, never mutated in place.
pub struct AtlasBuffer {
    resolution: u32,
    columns: u32,
    rows: u32,
    texels: Vec<Texel>,
}

impl AtlasBuffer {
    /// Wrap pre-baked texel data. `texels` must be row-major over the full
    /// atlas (`columns*resolution` by `rows*resolution`).
    pub fn from_texels(
        resolution: u32,
        columns: u32,
        rows: u32,
        texels: Vec<Texel>,
    ) -> CloudResult<Self> {
        let params = NoiseBakeParams {
            resolution,
            columns,
            rows,
            ..Default::default()
        };
        params.validate()?;
        let expected = (params.atlas_width() * params.atlas_height()) as usize;
        if texels.len() != expected {
            return Err(CloudError::bake(format!(
                "texel buffer holds {} entries, atlas needs {expected}",
                texels.len()
            )));
        }
        Ok(Self {
            resolution,
            columns,
            rows,
            texels,
        })
    }

    pub fn width(&self) -> u32 {
        self.columns * self.resolution
    }

    pub fn height(&self) -> u32 {
        self.rows * self.resolution
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn slice_count(&self) -> u32 {
        self.columns * self.rows
    }

    /// Fetch the texel at atlas coordinate (x, y). Coordinates are clamped
    /// to the atlas bounds (edge-clamp addressing).
    pub fn texel(&self, x: u32, y: u32) -> Texel {
        let x = x.min(self.width() - 1);
        let y = y.min(self.height() - 1);
        self.texels[(y * self.width() + x) as usize]
    }

    pub fn texels(&self) -> &[Texel] {
        &self.texels
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }
}

/// Bake a fresh atlas. Pure function of the parameters: identical inputs
/// produce bit-for-bit identical buffers.
pub fn bake(params: &NoiseBakeParams) -> CloudResult<AtlasBuffer> {
    params.validate()?;
    let started = Instant::now();
    let height = params.atlas_height();

    let bake_params = *params;
    let baked_rows = parallel::run_rows(height as usize, move |y| {
        bake_row(&bake_params, y as u32)
    })?;

    let mut texels = Vec::with_capacity((params.atlas_width() * height) as usize);
    for row in baked_rows {
        texels.extend_from_slice(&row);
    }

    log::info!(
        "baked {}x{} atlas ({} slices of {}^2) in {:.1} ms",
        params.atlas_width(),
        height,
        params.slice_count(),
        params.resolution,
        started.elapsed().as_secs_f32() * 1e3
    );

    AtlasBuffer::from_texels(params.resolution, params.columns, params.rows, texels)
}

fn bake_row(params: &NoiseBakeParams, y: u32) -> Vec<Texel> {
    let width = params.atlas_width();
    let mut row = Vec::with_capacity(width as usize);
    for x in 0..width {
        row.push(bake_texel(params, x, y));
    }
    row
}

/// Evaluate the four noise channels for atlas texel (x, y).
fn bake_texel(params: &NoiseBakeParams, x: u32, y: u32) -> Texel {
    let res = params.resolution;
    let col = x / res;
    let row = y / res;
    let slice = row * params.columns + col;

    let local_x = x - col * res;
    let local_y = y - row * res;

    let p = Vec3::new(
        local_x as f32 / res as f32,
        local_y as f32 / res as f32,
        slice as f32 / params.slice_count() as f32,
    );

    let [f1, f2, f3, f4] = params.frequencies;
    let r = 1.0 - worley3(p * f1);
    let g = 1.0 - worley3(p * f2);
    let b = 1.0 - perlin3(p * f3);
    let a = 1.0 - perlin3(p * f4);
    Texel([r, g, b, a])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_params() -> NoiseBakeParams {
        NoiseBakeParams {
            resolution: 8,
            columns: 3,
            rows: 2,
            frequencies: [3.0, 8.0, 40.0, 1.0],
        }
    }

    #[test]
    fn atlas_dimensions_follow_tile_grid() {
        let atlas = bake(&small_params()).expect("bake succeeds");
        assert_eq!(atlas.width(), 24);
        assert_eq!(atlas.height(), 16);
        assert_eq!(atlas.slice_count(), 6);
        assert_eq!(atlas.texels().len(), 24 * 16);
    }

    #[test]
    fn texel_matches_its_tile_slice() {
        // Atlas texel (18, 13) lies in tile (2, 1) -> slice 5, local (2, 5).
        let params = small_params();
        let atlas = bake(&params).expect("bake succeeds");

        let p = Vec3::new(2.0 / 8.0, 5.0 / 8.0, 5.0 / 6.0);
        let expected = Texel([
            1.0 - worley3(p * 3.0),
            1.0 - worley3(p * 8.0),
            1.0 - perlin3(p * 40.0),
            1.0 - perlin3(p * 1.0),
        ]);
        assert_eq!(atlas.texel(18, 13), expected);
    }

    #[test]
    fn bake_is_idempotent() {
        let params = small_params();
        let first = bake(&params).expect("bake succeeds");
        let second = bake(&params).expect("bake succeeds");
        assert_eq!(first.texels(), second.texels(), "bakes must be bit-identical");
    }

    #[test]
    fn invalid_bake_params_are_rejected() {
        let params = NoiseBakeParams {
            resolution: 0,
            ..small_params()
        };
        assert!(bake(&params).is_err());
    }

    #[test]
    fn from_texels_checks_length() {
        let result = AtlasBuffer::from_texels(8, 3, 2, vec![Texel([0.0; 4]); 10]);
        assert!(result.is_err());
    }

    #[test]
    fn byte_view_covers_whole_buffer() {
        let atlas = bake(&small_params()).expect("bake succeeds");
        assert_eq!(atlas.as_bytes().len(), 24 * 16 * 16);
    }
}
