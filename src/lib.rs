//! nimbus3d: CPU volumetric cloud renderer.
//!
//! A 3-D density field is baked from layered Worley and Perlin noise into a
//! tiled 2-D RGBA atlas, then raymarched per pixel with single scattering:
//! slab box intersection, Beer-Lambert extinction, a softened
//! Henyey-Greenstein phase, a powder darkening term, and a short shadow
//! sub-march toward the light. Both the bake and the per-frame march are
//! dispatched row-by-row across a worker pool.

pub mod camera;
pub mod core;
pub mod error;
pub mod renderer;
pub mod transforms;

pub use crate::core::atlas::{bake, AtlasBuffer, Texel};
pub use crate::core::params::{CloudParams, NoiseBakeParams, ParamsSnapshot, MAX_ASYMMETRY};
pub use crate::core::raymarch::{intersect_box, march_ray, MarchOutput};
pub use crate::core::sampler::sample_volume;
pub use camera::{Camera, RayGenerator};
pub use error::{CloudError, CloudResult};
pub use renderer::{CloudRenderer, Framebuffer};
pub use transforms::compose_trs;
