use log::warn;

use super::collider::TerrainCollider;

/// Per-tick snapshot of every terrain collider.
///
/// Rebuilt once at the start of a tick and then only read, so all raycasts
/// in a tick see the same world. The backing vector is reused between ticks.
pub struct GeometryCache {
    colliders: Vec<TerrainCollider>,
    rebuilt_at: Option<u32>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self {
            colliders: Vec::new(),
            rebuilt_at: None,
        }
    }

    pub fn rebuild<I: IntoIterator<Item = TerrainCollider>>(&mut self, tick: u32, colliders: I) {
        self.colliders.clear();
        for collider in colliders {
            if let Err(error) = collider.pose.validate() {
                warn!("skipping terrain collider: {}", error);
                continue;
            }
            self.colliders.push(collider);
        }
        self.rebuilt_at = Some(tick);
    }

    pub fn snapshot(&self) -> GeometrySnapshot<'_> {
        GeometrySnapshot {
            colliders: &self.colliders,
            tick: self.rebuilt_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn rebuilt_at(&self) -> Option<u32> {
        self.rebuilt_at
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the cache handed to every raycast in a tick
#[derive(Clone, Copy)]
pub struct GeometrySnapshot<'a> {
    colliders: &'a [TerrainCollider],
    tick: Option<u32>,
}

impl<'a> GeometrySnapshot<'a> {
    pub fn colliders(&self) -> &'a [TerrainCollider] {
        self.colliders
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn tick(&self) -> Option<u32> {
        self.tick
    }

    /// Highest terrain surface under world `(x, y)` across all colliders
    pub fn height_at(&self, x: f32, y: f32) -> Option<f32> {
        self.colliders
            .iter()
            .filter_map(|collider| collider.height_at(x, y))
            .fold(None, |highest: Option<f32>, height| {
                Some(highest.map_or(height, |highest| highest.max(height)))
            })
    }
}
