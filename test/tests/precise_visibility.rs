/// Occlusion tested visibility for capsule observables.
///
/// Scenes use a 200x200 ground with a wall along x = 100. The observer
/// stands west of the wall at (20, 100).
///
/// Key invariants:
/// 1. No tick issues more raycasts than the per-frame budget
/// 2. Pairs deferred by the budget are resolved on the following ticks
/// 3. Within the unconditional radius a pair is visible whatever blocks it
///    and beyond the max radius it is hidden, both measured from the body
/// 4. Without terrain the evaluator degrades to distance only

use std::time::Duration;

use sightline_server::{HideEvent, InterestConfig, InterestServer, ObservableKind, ObserverConfig};
use sightline_shared::{CapsuleShape, Vec3};
use sightline_test::{assert_pair, CountingRaycaster, RecordingReplication, TestEntity, TestWorld};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const OBSERVER: TestEntity = TestEntity::new(1);

fn capsule() -> ObservableKind {
    ObservableKind::Precise(CapsuleShape::new(0.5, 2.0))
}

fn every_tick_config() -> InterestConfig {
    InterestConfig {
        update_period: 1,
        ..Default::default()
    }
}

fn scene(server: &mut InterestServer<TestEntity>, world: &mut TestWorld) {
    world.set_position(OBSERVER, Vec3::new(20.0, 100.0, 0.0));
    server.attach_observer(OBSERVER, ObserverConfig::new(400.0, 5.0));
}

fn spawn(
    server: &mut InterestServer<TestEntity>,
    world: &mut TestWorld,
    id: u64,
    position: Vec3,
) -> TestEntity {
    let entity = TestEntity::new(id);
    world.set_position(entity, position);
    server.attach_observable(entity, capsule());
    entity
}

#[test]
fn wall_hides_observable_behind_it() {
    init_logger();
    let mut server = InterestServer::new(every_tick_config());
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    world.add_walled_ground(200.0, 10.0, 100.0, 50.0);
    scene(&mut server, &mut world);

    let in_front = spawn(&mut server, &mut world, 2, Vec3::new(60.0, 100.0, 0.0));
    let behind = spawn(&mut server, &mut world, 3, Vec3::new(180.0, 100.0, 0.0));
    server.update(&world, &mut replication);

    assert_pair!(server, OBSERVER, in_front, true, 1);
    assert_pair!(server, OBSERVER, behind, false, 0);
    // one clear ray, then a blocked center and a blocked head
    assert_eq!(server.raycasts_last_tick(), 3);
    assert_eq!(server.deferred_raycasts_last_tick(), 0);
    assert_eq!(replication.active_pairs_of(&OBSERVER), vec![in_front]);
}

#[test]
fn head_probe_sees_over_low_wall() {
    init_logger();
    let mut server = InterestServer::new(every_tick_config());
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    world.add_walled_ground(200.0, 10.0, 100.0, 1.5);
    scene(&mut server, &mut world);

    let behind = spawn(&mut server, &mut world, 2, Vec3::new(180.0, 100.0, 0.0));
    server.update(&world, &mut replication);
    assert!(server.is_visible(&OBSERVER, &behind));
    assert_eq!(server.raycasts_last_tick(), 2);

    server.set_capsule_head_probe(false);
    server.take_events();
    server.update(&world, &mut replication);
    assert_pair!(server, OBSERVER, behind, false, 0);
    assert_eq!(server.raycasts_last_tick(), 1);
    assert_eq!(
        server.take_events().read::<HideEvent>().collect::<Vec<_>>(),
        vec![(OBSERVER, behind)]
    );
}

#[test]
fn raycasts_stay_within_budget() {
    init_logger();
    let (raycaster, counter) = CountingRaycaster::height_field();
    let mut server = InterestServer::new(InterestConfig {
        max_raycast_count_per_frame: 4,
        ..every_tick_config()
    })
    .with_raycaster(Box::new(raycaster));
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    world.add_walled_ground(200.0, 10.0, 100.0, 50.0);
    scene(&mut server, &mut world);

    for k in 0..6u64 {
        spawn(
            &mut server,
            &mut world,
            10 + k,
            Vec3::new(180.0, 20.0 + 30.0 * k as f32, 0.0),
        );
    }

    server.update(&world, &mut replication);
    // two pairs with center and head rays, four left for later
    assert_eq!(counter.take(), 4);
    assert_eq!(server.deferred_raycasts_last_tick(), 4);

    for _ in 0..12 {
        server.update(&world, &mut replication);
        let issued = counter.take();
        assert!(issued <= 4, "{} raycasts issued in one tick", issued);
        assert_eq!(issued, server.raycasts_last_tick());
    }
    assert_eq!(server.observer(&OBSERVER).visible_count(), 0);
}

#[test]
fn deferred_pairs_resolve_on_following_ticks() {
    init_logger();
    let mut server = InterestServer::new(InterestConfig {
        update_period: 8,
        max_raycast_count_per_frame: 2,
        ..Default::default()
    });
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    world.add_flat_ground(200.0, 10.0);
    scene(&mut server, &mut world);

    for k in 0..6u64 {
        spawn(
            &mut server,
            &mut world,
            10 + k,
            Vec3::new(60.0, 40.0 + 20.0 * k as f32, 0.0),
        );
    }

    let mut visible = Vec::new();
    let mut deferred = Vec::new();
    for _ in 0..3 {
        server.update(&world, &mut replication);
        visible.push(server.observer(&OBSERVER).visible_count());
        deferred.push(server.deferred_raycasts_last_tick());
    }

    assert_eq!(visible, vec![2, 4, 6]);
    assert_eq!(deferred, vec![4, 2, 0]);
    assert_eq!(replication.active_pairs_of(&OBSERVER).len(), 6);
}

#[test]
fn unconditional_radius_overrides_occlusion() {
    init_logger();
    let (raycaster, counter) = CountingRaycaster::always_blocked();
    let mut server =
        InterestServer::new(every_tick_config()).with_raycaster(Box::new(raycaster));
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    world.add_flat_ground(200.0, 10.0);
    scene(&mut server, &mut world);

    let near = spawn(&mut server, &mut world, 2, Vec3::new(22.0, 100.0, 0.0));
    let far = spawn(&mut server, &mut world, 3, Vec3::new(40.0, 100.0, 0.0));
    server.update(&world, &mut replication);

    assert_pair!(server, OBSERVER, near, true, 1);
    assert_pair!(server, OBSERVER, far, false, 0);
    // only the far pair needed rays
    assert_eq!(counter.take(), 2);
}

#[test]
fn unconditional_radius_ignores_eye_height_and_look_ahead() {
    init_logger();
    let (raycaster, counter) = CountingRaycaster::always_blocked();
    let mut server =
        InterestServer::new(every_tick_config()).with_raycaster(Box::new(raycaster));
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    world.add_flat_ground(200.0, 10.0);
    scene(&mut server, &mut world);
    // eye lands at (17, 100, 1.7), about 8 units from the observable
    world.set_velocity(OBSERVER, Vec3::new(-30.0, 0.0, 0.0));

    let edge = spawn(&mut server, &mut world, 2, Vec3::new(24.9, 100.0, 0.0));
    server.update(&world, &mut replication);

    assert_pair!(server, OBSERVER, edge, true, 1);
    assert_eq!(counter.take(), 0);
}

#[test]
fn max_radius_hides_clear_pair_beyond_it() {
    init_logger();
    let (raycaster, counter) = CountingRaycaster::height_field();
    let mut server =
        InterestServer::new(every_tick_config()).with_raycaster(Box::new(raycaster));
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    world.add_flat_ground(200.0, 10.0);
    world.set_position(OBSERVER, Vec3::new(20.0, 100.0, 0.0));
    // eye lands at (23, 100, 1.7), inside the radius of both observables
    world.set_velocity(OBSERVER, Vec3::new(30.0, 0.0, 0.0));
    server.attach_observer(OBSERVER, ObserverConfig::new(60.0, 5.0).with_eye_height(1.7));

    let inside = spawn(&mut server, &mut world, 2, Vec3::new(79.5, 100.0, 0.0));
    let outside = spawn(&mut server, &mut world, 3, Vec3::new(80.5, 100.0, 0.0));
    server.update(&world, &mut replication);

    assert!(server.is_visible(&OBSERVER, &inside));
    assert_pair!(server, OBSERVER, outside, false, 0);
    // only the pair inside the radius is raycast
    assert_eq!(counter.take(), 1);
    assert_eq!(replication.active_pairs_of(&OBSERVER), vec![inside]);
}

#[test]
fn missing_terrain_degrades_to_distance_only() {
    init_logger();
    let mut server = InterestServer::new(every_tick_config());
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    scene(&mut server, &mut world);

    let behind = spawn(&mut server, &mut world, 2, Vec3::new(180.0, 100.0, 0.0));
    server.update(&world, &mut replication);
    assert!(server.is_visible(&OBSERVER, &behind));
    assert_eq!(server.distance_only_fallbacks_last_tick(), 1);
    assert_eq!(server.raycasts_last_tick(), 0);
    assert_eq!(server.terrain_collider_count(), 0);

    world.add_walled_ground(200.0, 10.0, 100.0, 50.0);
    server.take_events();
    server.update(&world, &mut replication);
    assert_pair!(server, OBSERVER, behind, false, 0);
    assert_eq!(server.distance_only_fallbacks_last_tick(), 0);
    assert_eq!(server.terrain_collider_count(), 1);
    assert!(server.take_events().has::<HideEvent>());
}

#[test]
fn point_of_view_leads_the_observer() {
    init_logger();
    let mut server = InterestServer::new(every_tick_config());
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();
    scene(&mut server, &mut world);
    world.set_velocity(OBSERVER, Vec3::new(10.0, 0.0, 0.0));

    server.update(&world, &mut replication);
    let point_of_view = server.observer(&OBSERVER).point_of_view().unwrap();
    assert!(point_of_view.distance_squared(&Vec3::new(21.0, 100.0, 1.7)) < 1e-6);

    server.set_look_ahead(Duration::ZERO);
    server.observer_mut(&OBSERVER).set_eye_height(2.0);
    server.update(&world, &mut replication);
    let point_of_view = server.observer(&OBSERVER).point_of_view().unwrap();
    assert!(point_of_view.distance_squared(&Vec3::new(20.0, 100.0, 2.0)) < 1e-6);
}
