use std::sync::Arc;

use crate::vector::Vec3;

use super::{error::GeometryError, height_field::HeightField};

/// Placement of a height field collider in the world. Scale is per-axis;
/// `z` scales heights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderPose {
    pub translation: Vec3,
    pub scale: Vec3,
}

impl ColliderPose {
    pub fn new(translation: Vec3, scale: Vec3) -> Self {
        Self { translation, scale }
    }

    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Vec3::new(1.0, 1.0, 1.0))
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !self.translation.is_finite() {
            return Err(GeometryError::InvalidPose {
                reason: "translation is not finite",
            });
        }
        let scale = self.scale;
        if !scale.is_finite() || scale.x <= 0.0 || scale.y <= 0.0 || scale.z <= 0.0 {
            return Err(GeometryError::InvalidPose {
                reason: "scale must be finite and positive",
            });
        }
        Ok(())
    }

    pub fn to_local(&self, world: &Vec3) -> Vec3 {
        let offset = *world - self.translation;
        Vec3::new(
            offset.x / self.scale.x,
            offset.y / self.scale.y,
            offset.z / self.scale.z,
        )
    }
}

/// One terrain collider as reported by the host world: pose plus a shared
/// handle to its height samples
#[derive(Clone, Debug)]
pub struct TerrainCollider {
    pub pose: ColliderPose,
    pub height_field: Arc<HeightField>,
}

impl TerrainCollider {
    pub fn new(pose: ColliderPose, height_field: Arc<HeightField>) -> Self {
        Self { pose, height_field }
    }

    /// World-space terrain height under world `(x, y)`, `None` off the collider
    pub fn height_at(&self, x: f32, y: f32) -> Option<f32> {
        let local = self.pose.to_local(&Vec3::new(x, y, 0.0));
        self.height_field
            .height_at(local.x, local.y)
            .map(|height| height * self.pose.scale.z + self.pose.translation.z)
    }
}
