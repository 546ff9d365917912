//! Camera pose and primary ray generation
//!
//! Builds validated view/projection matrices (right-handed, GL clip space)
//! and unprojects pixel centers through the inverse view-projection to get
//! world-space rays for the raymarcher.

use glam::{Mat4, Vec3, Vec4};

use crate::error::{CloudError, CloudResult};

pub const ERROR_FOVY: &str = "fovy_deg must be finite and in (0, 180)";
pub const ERROR_NEAR: &str = "znear must be finite and > 0";
pub const ERROR_FAR: &str = "zfar must be finite and > znear";
pub const ERROR_VECFINITE: &str = "eye/target/up components must be finite";
pub const ERROR_UPCOLINEAR: &str = "up vector must not be colinear with view direction";
pub const ERROR_TARGET_SIZE: &str = "render target dimensions must be >= 1";

/// Perspective camera pose supplied by the frame driver.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fovy_deg: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Camera at `eye` looking at `target` with Y up and a 45 degree fov.
    pub fn look_at(eye: Vec3, target: Vec3) -> Self {
        Self {
            eye,
            target,
            up: Vec3::Y,
            fovy_deg: 45.0,
            znear: 0.1,
            zfar: 2000.0,
        }
    }

    pub fn validate(&self) -> CloudResult<()> {
        if !self.eye.is_finite() || !self.target.is_finite() || !self.up.is_finite() {
            return Err(CloudError::config(ERROR_VECFINITE));
        }
        if !self.fovy_deg.is_finite() || self.fovy_deg <= 0.0 || self.fovy_deg >= 180.0 {
            return Err(CloudError::config(ERROR_FOVY));
        }
        if !self.znear.is_finite() || self.znear <= 0.0 {
            return Err(CloudError::config(ERROR_NEAR));
        }
        if !self.zfar.is_finite() || self.zfar <= self.znear {
            return Err(CloudError::config(ERROR_FAR));
        }
        let view_dir = (self.target - self.eye).normalize_or_zero();
        if view_dir == Vec3::ZERO
            || view_dir.cross(self.up.normalize_or_zero()).length_squared() < 1e-8
        {
            return Err(CloudError::config(ERROR_UPCOLINEAR));
        }
        Ok(())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fovy_deg.to_radians(), aspect, self.znear, self.zfar)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Per-pixel primary ray generator for one render target.
#[derive(Clone, Copy, Debug)]
pub struct RayGenerator {
    eye: Vec3,
    inv_view_proj: Mat4,
    width: u32,
    height: u32,
}

impl RayGenerator {
    pub fn new(camera: &Camera, width: u32, height: u32) -> CloudResult<Self> {
        camera.validate()?;
        if width == 0 || height == 0 {
            return Err(CloudError::config(ERROR_TARGET_SIZE));
        }
        let aspect = width as f32 / height as f32;
        Ok(Self {
            eye: camera.eye,
            inv_view_proj: camera.view_proj(aspect).inverse(),
            width,
            height,
        })
    }

    /// World-space (origin, direction) through the center of pixel (x, y).
    /// y runs downward, matching the framebuffer layout.
    pub fn ray(&self, x: u32, y: u32) -> (Vec3, Vec3) {
        let ndc_x = (x as f32 + 0.5) / self.width as f32 * 2.0 - 1.0;
        let ndc_y = 1.0 - (y as f32 + 0.5) / self.height as f32 * 2.0;
        let far = self.inv_view_proj * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let point = far.truncate() / far.w;
        (self.eye, (point - self.eye).normalize_or_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn central_ray_points_at_the_target() {
        let camera = Camera::look_at(Vec3::new(-90.0, 110.0, -90.0), Vec3::ZERO);
        let rays = RayGenerator::new(&camera, 101, 101).expect("valid camera");
        let (origin, dir) = rays.ray(50, 50);
        assert_eq!(origin, camera.eye);

        let expected = (camera.target - camera.eye).normalize();
        assert!(
            dir.dot(expected) > 0.9999,
            "central ray {dir:?} diverges from {expected:?}"
        );
    }

    #[test]
    fn corner_rays_diverge_from_center() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO);
        let rays = RayGenerator::new(&camera, 64, 64).expect("valid camera");
        let (_, center) = rays.ray(32, 32);
        let (_, corner) = rays.ray(0, 0);
        assert!(center.dot(corner) < 0.9999);
        assert!((corner.length() - 1.0).abs() < 1e-5, "rays are unit length");
    }

    #[test]
    fn bad_poses_are_rejected() {
        let mut camera = Camera::look_at(Vec3::ZERO, Vec3::Y);
        // Up colinear with the view direction.
        assert!(camera.validate().is_err());

        camera = Camera::look_at(Vec3::ZERO, Vec3::X);
        camera.fovy_deg = 200.0;
        assert!(camera.validate().is_err());

        camera = Camera::look_at(Vec3::ZERO, Vec3::X);
        camera.zfar = camera.znear;
        assert!(camera.validate().is_err());

        assert!(RayGenerator::new(&Camera::look_at(Vec3::ZERO, Vec3::X), 0, 10).is_err());
    }
}
