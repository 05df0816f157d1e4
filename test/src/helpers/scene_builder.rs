use sightline_server::{InterestServer, ObservableKind, ObserverConfig};
use sightline_shared::{CapsuleShape, Vec3};

use crate::{TestEntity, TestWorld};

/// Entities spawned by a `SceneBuilder`
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub observers: Vec<TestEntity>,
    pub observables: Vec<TestEntity>,
}

/// Seeded random scenes, so a failing run can be replayed
pub struct SceneBuilder {
    rng: fastrand::Rng,
    size: f32,
    next_entity: u64,
}

impl SceneBuilder {
    /// Entities are scattered on the ground plane over `[0, size]` on X and Y
    pub fn new(seed: u64, size: f32) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            size,
            next_entity: 1,
        }
    }

    pub fn next_entity(&mut self) -> TestEntity {
        let entity = TestEntity::new(self.next_entity);
        self.next_entity += 1;
        entity
    }

    pub fn random_position(&mut self) -> Vec3 {
        Vec3::new(self.rng.f32() * self.size, self.rng.f32() * self.size, 0.0)
    }

    pub fn random_kind(&mut self) -> ObservableKind {
        match self.rng.u8(0..3) {
            0 => ObservableKind::Plain,
            1 => ObservableKind::Precise(CapsuleShape::new(0.5, 2.0)),
            _ => ObservableKind::Simple,
        }
    }

    /// Attaches observers and observables of random kinds at random
    /// positions. Takes effect on the server's next update.
    pub fn populate(
        &mut self,
        server: &mut InterestServer<TestEntity>,
        world: &mut TestWorld,
        observers: usize,
        observables: usize,
        observer_config: ObserverConfig,
    ) -> Scene {
        let mut scene = Scene::default();
        for _ in 0..observers {
            let entity = self.next_entity();
            let position = self.random_position();
            world.set_position(entity, position);
            server.attach_observer(entity, observer_config);
            scene.observers.push(entity);
        }
        for _ in 0..observables {
            let entity = self.next_entity();
            let position = self.random_position();
            let kind = self.random_kind();
            world.set_position(entity, position);
            server.attach_observable(entity, kind);
            scene.observables.push(entity);
        }
        scene
    }

    /// Moves every entity by up to `step` on X and Y, staying on the map
    pub fn wander(&mut self, world: &mut TestWorld, entities: &[TestEntity], step: f32) {
        for entity in entities {
            let Some(position) = sightline_server::WorldRefType::position(world, entity) else {
                continue;
            };
            let offset = Vec3::new(
                (self.rng.f32() * 2.0 - 1.0) * step,
                (self.rng.f32() * 2.0 - 1.0) * step,
                0.0,
            );
            let moved = position + offset;
            world.set_position(
                *entity,
                Vec3::new(moved.x.clamp(0.0, self.size), moved.y.clamp(0.0, self.size), 0.0),
            );
        }
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.rng.f32() < probability
    }

    pub fn pick<'a>(&mut self, entities: &'a [TestEntity]) -> Option<&'a TestEntity> {
        if entities.is_empty() {
            return None;
        }
        entities.get(self.rng.usize(0..entities.len()))
    }
}
