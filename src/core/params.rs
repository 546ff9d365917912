// src/core/params.rs
// Tunable cloud parameters: shading/geometry knobs read every frame, and the
// bake parameters that shape the noise atlas. Both serialize so presets can
// round-trip through JSON.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{CloudError, CloudResult};

/// Practical ceiling for the scattering asymmetry; the Henyey-Greenstein
/// denominator collapses as |g| approaches 1.
pub const MAX_ASYMMETRY: f32 = 0.95;

/// Cloud shading and geometry parameters, owned by the caller and read each
/// frame. Edits take effect on the next raymarch pass without a rebake.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudParams {
    /// Full box extents along each local axis.
    pub box_extents: Vec3,
    pub density_scale: f32,
    /// Density below this threshold contributes nothing.
    pub visibility_threshold: f32,
    /// Normalization divisor for accumulated density.
    pub intensity: f32,
    pub base_color: Vec3,
    /// May be supplied unnormalized; normalized at snapshot time.
    pub light_direction: Vec3,
    pub light_absorption: f32,
    /// Shadow floor in [0, 1]; density never goes fully black.
    pub darkness_threshold: f32,
    pub sun_transmittance_scale: f32,
    /// Henyey-Greenstein asymmetry g in [-1, 1].
    pub asymmetry: f32,
    pub light_intensity: f32,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            box_extents: Vec3::new(100.0, 100.0, 100.0),
            density_scale: 2.0,
            visibility_threshold: 1.52,
            intensity: 35.0,
            base_color: Vec3::ONE,
            light_direction: Vec3::new(-0.4, 1.0, 0.2),
            light_absorption: 0.025,
            darkness_threshold: 0.74,
            sun_transmittance_scale: 4.0,
            asymmetry: 0.6,
            light_intensity: 0.3,
        }
    }
}

impl CloudParams {
    pub fn validate(&self) -> CloudResult<()> {
        if !self.box_extents.is_finite() || self.box_extents.min_element() < 0.0 {
            return Err(CloudError::config(
                "box_extents components must be finite and >= 0",
            ));
        }
        if !self.intensity.is_finite() || self.intensity <= 0.0 {
            return Err(CloudError::config("intensity must be finite and > 0"));
        }
        if !self.darkness_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.darkness_threshold)
        {
            return Err(CloudError::config(
                "darkness_threshold must be finite and in [0, 1]",
            ));
        }
        if !self.asymmetry.is_finite() || self.asymmetry.abs() > 1.0 {
            return Err(CloudError::config("asymmetry must be finite and in [-1, 1]"));
        }
        if !self.light_direction.is_finite() || self.light_direction == Vec3::ZERO {
            return Err(CloudError::config(
                "light_direction must be finite and non-zero",
            ));
        }
        for (name, value) in [
            ("density_scale", self.density_scale),
            ("visibility_threshold", self.visibility_threshold),
            ("light_absorption", self.light_absorption),
            ("sun_transmittance_scale", self.sun_transmittance_scale),
            ("light_intensity", self.light_intensity),
        ] {
            if !value.is_finite() {
                return Err(CloudError::config(format!("{name} must be finite")));
            }
        }
        if !self.base_color.is_finite() {
            return Err(CloudError::config("base_color components must be finite"));
        }
        Ok(())
    }

    /// Validate and freeze the parameter set for one stage invocation.
    pub fn snapshot(&self) -> CloudResult<ParamsSnapshot> {
        self.validate()?;
        Ok(ParamsSnapshot {
            box_extents: self.box_extents,
            density_scale: self.density_scale,
            visibility_threshold: self.visibility_threshold,
            intensity: self.intensity,
            base_color: self.base_color,
            light_direction: self.light_direction.normalize(),
            light_absorption: self.light_absorption,
            darkness_threshold: self.darkness_threshold,
            sun_transmittance_scale: self.sun_transmittance_scale,
            asymmetry: self.asymmetry.clamp(-MAX_ASYMMETRY, MAX_ASYMMETRY),
            light_intensity: self.light_intensity,
        })
    }
}

/// Immutable per-invocation snapshot of [`CloudParams`] with derived
/// quantities resolved: the light direction is unit length and the asymmetry
/// is clamped away from the phase-function singularity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamsSnapshot {
    pub box_extents: Vec3,
    pub density_scale: f32,
    pub visibility_threshold: f32,
    pub intensity: f32,
    pub base_color: Vec3,
    pub light_direction: Vec3,
    pub light_absorption: f32,
    pub darkness_threshold: f32,
    pub sun_transmittance_scale: f32,
    pub asymmetry: f32,
    pub light_intensity: f32,
}

/// Parameters for one atlas bake. Any change requires a rebake before it
/// takes visual effect.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseBakeParams {
    /// Texels per tile edge (power of two recommended).
    pub resolution: u32,
    /// Tile grid width; columns * rows is the slice count.
    pub columns: u32,
    /// Tile grid height.
    pub rows: u32,
    /// Frequencies for channels R, G, B, A in order.
    pub frequencies: [f32; 4],
}

impl Default for NoiseBakeParams {
    fn default() -> Self {
        Self {
            resolution: 64,
            columns: 16,
            rows: 16,
            frequencies: [3.0, 8.0, 40.0, 1.0],
        }
    }
}

impl NoiseBakeParams {
    pub fn slice_count(&self) -> u32 {
        self.columns * self.rows
    }

    pub fn atlas_width(&self) -> u32 {
        self.columns * self.resolution
    }

    pub fn atlas_height(&self) -> u32 {
        self.rows * self.resolution
    }

    pub fn validate(&self) -> CloudResult<()> {
        if self.resolution == 0 {
            return Err(CloudError::config("resolution must be >= 1"));
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(CloudError::config("tile grid dimensions must be >= 1"));
        }
        // Slice interpolation divides by slice_count - 1.
        if self.slice_count() < 2 {
            return Err(CloudError::config("slice count (columns * rows) must be >= 2"));
        }
        for f in self.frequencies {
            if !f.is_finite() || f < 0.0 {
                return Err(CloudError::config("frequencies must be finite and >= 0"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        CloudParams::default().validate().expect("defaults are valid");
        NoiseBakeParams::default().validate().expect("defaults are valid");
    }

    #[test]
    fn snapshot_normalizes_light_and_clamps_asymmetry() {
        let mut params = CloudParams::default();
        params.light_direction = Vec3::new(0.0, 10.0, 0.0);
        params.asymmetry = 0.99;
        let snap = params.snapshot().expect("valid params");
        assert!((snap.light_direction.length() - 1.0).abs() < 1e-6);
        assert_eq!(snap.asymmetry, MAX_ASYMMETRY);
    }

    #[test]
    fn degenerate_slice_grid_is_rejected() {
        let params = NoiseBakeParams {
            columns: 1,
            rows: 1,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(CloudError::Config(_))));
    }

    #[test]
    fn bad_shading_params_are_rejected() {
        let mut params = CloudParams::default();
        params.darkness_threshold = 1.5;
        assert!(params.validate().is_err());

        let mut params = CloudParams::default();
        params.light_direction = Vec3::ZERO;
        assert!(params.validate().is_err());

        let mut params = CloudParams::default();
        params.intensity = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn params_round_trip_through_json() {
        let params = CloudParams::default();
        let json = serde_json::to_string(&params).expect("serialize");
        let back: CloudParams = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(params, back);

        // Missing fields fall back to defaults.
        let sparse: NoiseBakeParams = serde_json::from_str("{\"resolution\": 32}").expect("parse");
        assert_eq!(sparse.resolution, 32);
        assert_eq!(sparse.columns, 16);
    }
}
