//! Transform utilities for placing the cloud volume in the world
//!
//! Model matrices compose as T * R * S (scale first, then rotate, then
//! translate) following right-handed conventions.

use glam::{Mat4, Quat, Vec3};

/// Compose a model matrix from translation, Euler rotation (degrees), and
/// scale. Rotations apply in Z * Y * X order.
pub fn compose_trs(translation: Vec3, rotation_degrees: Vec3, scale: Vec3) -> Mat4 {
    let rx = Quat::from_rotation_x(rotation_degrees.x.to_radians());
    let ry = Quat::from_rotation_y(rotation_degrees.y.to_radians());
    let rz = Quat::from_rotation_z(rotation_degrees.z.to_radians());
    let rotation = rz * ry * rx;
    Mat4::from_scale_rotation_translation(scale, rotation, translation)
}
