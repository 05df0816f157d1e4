use crate::vector::Vec3;

use super::{collider::TerrainCollider, geometry_cache::GeometrySnapshot};

/// Outcome of a line-of-sight query
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RaycastHit {
    Clear,
    /// `fraction` is the position of the first blocking sample along the
    /// segment, in `(0, 1)`
    Blocked { point: Vec3, fraction: f32 },
}

impl RaycastHit {
    pub fn is_blocked(&self) -> bool {
        matches!(self, RaycastHit::Blocked { .. })
    }
}

/// Tests a segment against the static geometry captured for this tick
pub trait Raycaster {
    fn raycast(&self, origin: &Vec3, target: &Vec3, geometry: &GeometrySnapshot) -> RaycastHit;
}

/// Marches the segment through every height field, reporting the first
/// sample which lies below the terrain surface.
#[derive(Clone, Copy, Debug)]
pub struct HeightFieldRaycaster {
    /// Distance between samples, as a fraction of each field's cell size
    step_in_cells: f32,
    max_samples: usize,
}

impl HeightFieldRaycaster {
    pub fn new(step_in_cells: f32, max_samples: usize) -> Self {
        Self {
            step_in_cells: step_in_cells.max(0.01),
            max_samples: max_samples.max(2),
        }
    }

    fn raycast_collider(
        &self,
        origin: &Vec3,
        target: &Vec3,
        collider: &TerrainCollider,
    ) -> Option<f32> {
        let pose = &collider.pose;
        let field = &collider.height_field;
        let local_origin = pose.to_local(origin);
        let local_target = pose.to_local(target);

        // entirely above the highest sample
        if local_origin.z > field.max_height() && local_target.z > field.max_height() {
            return None;
        }
        let (width, depth) = field.extent();
        if local_origin.x.max(local_target.x) < 0.0
            || local_origin.x.min(local_target.x) > width
            || local_origin.y.max(local_target.y) < 0.0
            || local_origin.y.min(local_target.y) > depth
        {
            return None;
        }

        let horizontal = Vec3::new(
            local_target.x - local_origin.x,
            local_target.y - local_origin.y,
            0.0,
        )
        .length();
        let step = field.cell_size() * self.step_in_cells;
        let samples = ((horizontal / step).ceil() as usize).clamp(2, self.max_samples);

        // endpoints are excluded: the observer's eye and the target point
        // are never considered buried
        for i in 1..samples {
            let fraction = i as f32 / samples as f32;
            let point = local_origin.lerp(&local_target, fraction);
            let Some(height) = field.height_at(point.x, point.y) else {
                continue;
            };
            if point.z < height {
                return Some(fraction);
            }
        }
        None
    }
}

impl Default for HeightFieldRaycaster {
    fn default() -> Self {
        Self::new(0.5, 4096)
    }
}

impl Raycaster for HeightFieldRaycaster {
    fn raycast(&self, origin: &Vec3, target: &Vec3, geometry: &GeometrySnapshot) -> RaycastHit {
        let nearest = geometry
            .colliders()
            .iter()
            .filter_map(|collider| self.raycast_collider(origin, target, collider))
            .fold(None, |nearest: Option<f32>, fraction| {
                Some(nearest.map_or(fraction, |nearest| nearest.min(fraction)))
            });

        match nearest {
            Some(fraction) => RaycastHit::Blocked {
                point: origin.lerp(target, fraction),
                fraction,
            },
            None => RaycastHit::Clear,
        }
    }
}
