// src/core/mod.rs
// Volumetric cloud core: procedural noise, the tiled atlas bake, volume
// sampling, the raymarcher, and the worker pool that drives both stages.

pub mod atlas;
pub mod noise;
pub mod parallel;
pub mod params;
pub mod raymarch;
pub mod sampler;
pub mod sun;
