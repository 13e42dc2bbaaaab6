//! Local transformation data for scene nodes.
//!
//! A node stores its transform relative to its parent as position, rotation
//! and scale. The scene graph turns these into 4x4 matrices and chains them
//! down the hierarchy to get a node's local-to-world matrix.

use cgmath::One;

/// Per-node transformation: position, rotation (as quaternion), and scale.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Create a new instance with identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_rotation(mut self, rotation: cgmath::Quaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: cgmath::Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// Translation * rotation * scale, i.e. scale is applied first.
    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Rotation3, SquareMatrix, Vector3, Vector4};

    use super::*;

    #[test]
    fn default_is_identity() {
        assert_eq!(Instance::default().to_matrix(), cgmath::Matrix4::identity());
    }

    #[test]
    fn scale_applies_before_translation() {
        let instance = Instance::from(Vector3::new(1.0, 0.0, 0.0))
            .with_scale(Vector3::new(2.0, 2.0, 2.0));
        let p = instance.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vector4::new(3.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn rotation_turns_x_into_y() {
        let instance = Instance::new()
            .with_rotation(cgmath::Quaternion::from_angle_z(Deg(90.0)));
        let p = instance.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((p.x).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }
}
