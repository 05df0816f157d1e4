use crate::vector::Vec3;

/// Upright character capsule used by precise visibility tests.
///
/// `height` is the full height including both caps, `base_offset` is the
/// height of the capsule bottom above the entity's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    pub height: f32,
    pub base_offset: f32,
}

impl CapsuleShape {
    pub fn new(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            base_offset: 0.0,
        }
    }

    pub fn with_base_offset(mut self, base_offset: f32) -> Self {
        self.base_offset = base_offset;
        self
    }

    pub fn vertical_center(&self, position: &Vec3) -> Vec3 {
        *position + Vec3::UP * (self.base_offset + self.height * 0.5)
    }

    /// Center of the upper cap sphere
    pub fn head(&self, position: &Vec3) -> Vec3 {
        let top = self.base_offset + (self.height - self.radius).max(self.height * 0.5);
        *position + Vec3::UP * top
    }

    pub fn contains(&self, position: &Vec3, point: &Vec3) -> bool {
        let bottom = self.base_offset + self.radius;
        let top = self.base_offset + (self.height - self.radius).max(self.radius);
        let local = *point - *position;
        let axis_z = local.z.clamp(bottom, top);
        let closest = Vec3::new(0.0, 0.0, axis_z);
        local.distance_squared(&closest) <= self.radius * self.radius
    }
}
