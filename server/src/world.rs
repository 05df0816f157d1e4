use sightline_shared::{SendPeriod, TerrainCollider, Vec3};

/// Read-only view of the host simulation, implemented by the entity
/// framework adapter. The server never stores anything it reads here past
/// the end of a tick.
pub trait WorldRefType<E> {
    /// World position of an observer or observable
    fn position(&self, entity: &E) -> Option<Vec3>;

    /// Last known velocity, used to extrapolate an observer's point of view
    fn velocity(&self, _entity: &E) -> Option<Vec3> {
        None
    }

    /// Whether an observer currently has an active player connection.
    /// Observers without one are not evaluated.
    fn has_connection(&self, _entity: &E) -> bool {
        true
    }

    /// Every terrain collider in the world, captured once per tick
    fn terrain_colliders(&self) -> Vec<TerrainCollider> {
        Vec::new()
    }
}

/// Receives send-period changes for (observer, observable) pairs. Called
/// only when the period actually differs from the last one reported.
pub trait ReplicationSink<E> {
    fn set_send_period(&mut self, observer: &E, observable: &E, period: SendPeriod);
}

impl<E: Copy> ReplicationSink<E> for Vec<(E, E, SendPeriod)> {
    fn set_send_period(&mut self, observer: &E, observable: &E, period: SendPeriod) {
        self.push((*observer, *observable, period));
    }
}
