/// Attach and detach handling.
///
/// Lifecycle events are queued and applied at the start of the next update,
/// strictly in the order they were published.

use sightline_server::{
    ErrorEvent, HideEvent, IdentityAssignedEvent, IdentityFreedEvent, InterestConfig,
    InterestError, InterestServer, LifecycleEvent, ObservableKind, ObserverConfig, ShowEvent,
};
use sightline_shared::{ObservableId, SendPeriod, Vec3};
use sightline_test::{assert_pair, RecordingReplication, TestEntity, TestWorld};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn server() -> InterestServer<TestEntity> {
    InterestServer::new(InterestConfig {
        update_period: 1,
        ..Default::default()
    })
}

fn place(world: &mut TestWorld, id: u64, x: f32) -> TestEntity {
    let entity = TestEntity::new(id);
    world.set_position(entity, Vec3::new(x, 0.0, 0.0));
    entity
}

#[test]
fn attach_then_detach_in_one_tick_never_assigns() {
    init_logger();
    let mut server = server();
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();

    let observable = place(&mut world, 1, 0.0);
    server.attach_observable(observable, ObservableKind::Plain);
    server.detach_observable(observable);
    assert_eq!(server.pending_lifecycle_events(), 2);

    server.update(&world, &mut replication);
    assert_eq!(server.pending_lifecycle_events(), 0);
    assert!(!server.observable_exists(&observable));
    assert_eq!(server.live_observables_count(), 0);
    assert!(server.take_events().is_empty());
}

#[test]
fn detach_then_reattach_hides_and_shows_again() {
    init_logger();
    let mut server = server();
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();

    let observer = place(&mut world, 1, 0.0);
    let observable = place(&mut world, 2, 5.0);
    server.attach_observer(observer, ObserverConfig::default());
    server.attach_observable(observable, ObservableKind::Plain);
    server.update(&world, &mut replication);
    server.take_events();

    server.detach_observable(observable);
    server.attach_observable(observable, ObservableKind::Simple);
    server.update(&world, &mut replication);

    let mut events = server.take_events();
    let freed: Vec<_> = events.read::<IdentityFreedEvent>().collect();
    let assigned: Vec<_> = events.read::<IdentityAssignedEvent>().collect();
    assert_eq!(freed, vec![(observable, ObservableId::new(0))]);
    assert_eq!(assigned, vec![(observable, ObservableId::new(0))]);
    assert_eq!(events.read::<HideEvent>().collect::<Vec<_>>(), vec![(observer, observable)]);
    assert_eq!(events.read::<ShowEvent>().collect::<Vec<_>>(), vec![(observer, observable)]);

    assert_eq!(server.observable_kind(&observable), Some(ObservableKind::Simple));
    assert_pair!(server, observer, observable, true, 8);
    assert_eq!(
        replication.calls_for(&observer, &observable),
        vec![SendPeriod::new(1), SendPeriod::NEVER, SendPeriod::new(8)]
    );
    assert_eq!(replication.redundant_calls(), 0);
}

#[test]
fn last_published_event_wins() {
    init_logger();
    let mut server = server();
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();

    let observer = place(&mut world, 1, 0.0);
    server.publish(LifecycleEvent::ObserverAttached(observer, ObserverConfig::default()));
    server.publish(LifecycleEvent::ObserverDetached(observer));
    server.publish(LifecycleEvent::ObserverAttached(
        observer,
        ObserverConfig::new(50.0, 2.0),
    ));
    server.update(&world, &mut replication);

    assert!(server.observer_exists(&observer));
    assert_eq!(server.observer(&observer).config().max_visibility_radius, 50.0);
    assert!(!server.take_events().has::<ErrorEvent>());
}

#[test]
fn duplicate_and_unknown_entities_are_reported() {
    init_logger();
    let mut server = server();
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();

    let entity = place(&mut world, 1, 0.0);
    let stranger = TestEntity::new(42);
    server.attach_observer(entity, ObserverConfig::default());
    server.attach_observer(entity, ObserverConfig::default());
    server.attach_observable(entity, ObservableKind::Plain);
    server.attach_observable(entity, ObservableKind::Plain);
    server.detach_observer(stranger);
    server.detach_observable(stranger);
    server.update(&world, &mut replication);

    let errors: Vec<_> = server.take_events().read::<ErrorEvent>().collect();
    assert_eq!(
        errors,
        vec![
            InterestError::ObserverAlreadyAttached {
                entity: "TestEntity(1)".to_string()
            },
            InterestError::ObservableAlreadyAttached {
                entity: "TestEntity(1)".to_string()
            },
            InterestError::ObserverNotFound {
                entity: "TestEntity(42)".to_string()
            },
            InterestError::ObservableNotFound {
                entity: "TestEntity(42)".to_string()
            },
        ]
    );

    // an entity may be both observer and observable
    assert!(server.observer_exists(&entity));
    assert!(server.observable_exists(&entity));
    assert_pair!(server, entity, entity, true, 1);
}

#[test]
fn disconnected_observer_is_not_evaluated() {
    init_logger();
    let mut server = server();
    let mut world = TestWorld::new();
    let mut replication = RecordingReplication::new();

    let observer = place(&mut world, 1, 0.0);
    let observable = place(&mut world, 2, 5.0);
    server.attach_observer(observer, ObserverConfig::new(100.0, 0.0));
    server.attach_observable(observable, ObservableKind::Plain);
    server.update(&world, &mut replication);
    assert!(server.is_visible(&observer, &observable));

    world.disconnect(observer);
    world.set_position(observable, Vec3::new(500.0, 0.0, 0.0));
    server.update(&world, &mut replication);
    assert_eq!(server.coarse_evaluations_last_tick(), 0);
    assert!(server.is_visible(&observer, &observable));

    world.reconnect(&observer);
    server.update(&world, &mut replication);
    assert_eq!(server.coarse_evaluations_last_tick(), 1);
    assert_pair!(server, observer, observable, false, 0);
}

#[test]
fn missing_transforms_skip_the_pair() {
    init_logger();
    let mut server = server();
    let world = TestWorld::new();
    let mut replication = RecordingReplication::new();

    let observer = TestEntity::new(1);
    let observable = TestEntity::new(2);
    server.attach_observer(observer, ObserverConfig::default());
    server.attach_observable(observable, ObservableKind::Plain);
    server.update(&world, &mut replication);

    assert!(server.observer_exists(&observer));
    assert!(server.observable_id(&observable).is_some());
    assert!(!server.is_visible(&observer, &observable));
    assert!(replication.calls().is_empty());
}

#[test]
#[should_panic(expected = "No Observer exists for given Entity!")]
fn unknown_observer_handle_panics() {
    let server = server();
    server.observer(&TestEntity::new(7));
}
