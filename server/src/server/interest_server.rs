use std::{fmt::Debug, hash::Hash, time::Duration};

use log::{debug, info, warn};

use sightline_shared::{
    GeometryCache, IdentityError, ObservableId, Raycaster, SendPeriod, Vec3,
};

use crate::{
    evaluators::{
        coarse_throttle::{CoarseDistanceThrottle, DistanceTiers},
        precise_visibility::{PreciseSettings, PreciseVisibilityEvaluator},
        simple_cadence::SimpleEvaluator,
        ObservablePositions, ObserverInput, TickContext,
    },
    events::{
        interest_events::InterestEvents,
        lifecycle::{LifecycleEvent, LifecycleQueue},
    },
    observable::{
        observable_kind::ObservableKind,
        observable_registry::{DetachOutcome, ObservableRegistry},
    },
    observer::{
        observer_config::ObserverConfig,
        observer_ref::{ObserverMut, ObserverRef},
        observer_state::ObserverState,
        pair_state_store::PairStateStore,
    },
    world::{ReplicationSink, WorldRefType},
    InterestConfig, InterestError,
};

cfg_if! {
    if #[cfg(feature = "strict_capacity")] {
        fn identity_exhausted<E: Debug>(entity: &E, error: IdentityError) -> InterestError {
            panic!("Cannot assign an identity to observable {:?}: {}", entity, error);
        }
    } else {
        fn identity_exhausted<E: Debug>(entity: &E, error: IdentityError) -> InterestError {
            warn!("observable {:?} was not given an identity and is dropped: {}", entity, error);
            InterestError::Identity(error)
        }
    }
}

/// Decides, every tick, which observables each observer can see and how
/// often each visible observable is replicated to that observer.
///
/// Work per tick, in order: drain attach/detach events, assign identities
/// to newly attached observables, snapshot positions and terrain, run the
/// precise, simple and coarse evaluators, then report every changed period
/// to the [`ReplicationSink`].
pub struct InterestServer<E: Copy + Eq + Hash + Debug> {
    config: InterestConfig,
    registry: ObservableRegistry<E>,
    store: PairStateStore<E>,
    lifecycle: LifecycleQueue<E>,
    geometry: GeometryCache,
    positions: ObservablePositions,
    coarse: CoarseDistanceThrottle,
    precise: PreciseVisibilityEvaluator,
    simple: SimpleEvaluator,
    events: InterestEvents<E>,
    tick: u32,
    frame_offset: u32,
    has_ticked: bool,
}

impl<E: Copy + Eq + Hash + Debug> InterestServer<E> {
    pub fn new(config: InterestConfig) -> Self {
        let config = config.sanitized();
        let registry = ObservableRegistry::new(config.max_observables);
        let capacity = registry.capacity();

        Self {
            config,
            registry,
            store: PairStateStore::new(),
            lifecycle: LifecycleQueue::new(),
            geometry: GeometryCache::new(),
            positions: ObservablePositions::new(capacity),
            coarse: CoarseDistanceThrottle::new(),
            precise: PreciseVisibilityEvaluator::default(),
            simple: SimpleEvaluator::new(),
            events: InterestEvents::new(),
            tick: 0,
            frame_offset: 0,
            has_ticked: false,
        }
    }

    /// Replaces the default height field raycaster
    pub fn with_raycaster(mut self, raycaster: Box<dyn Raycaster>) -> Self {
        self.precise.set_raycaster(raycaster);
        self
    }

    pub fn set_raycaster(&mut self, raycaster: Box<dyn Raycaster>) {
        self.precise.set_raycaster(raycaster);
    }

    // Lifecycle

    /// Queues an attach or detach; it takes effect at the start of the next
    /// `update`, in publish order
    pub fn publish(&mut self, event: LifecycleEvent<E>) {
        self.lifecycle.publish(event);
    }

    pub fn attach_observer(&mut self, entity: E, config: ObserverConfig) {
        self.publish(LifecycleEvent::ObserverAttached(entity, config));
    }

    pub fn detach_observer(&mut self, entity: E) {
        self.publish(LifecycleEvent::ObserverDetached(entity));
    }

    pub fn attach_observable(&mut self, entity: E, kind: ObservableKind) {
        self.publish(LifecycleEvent::ObservableAttached(entity, kind));
    }

    pub fn detach_observable(&mut self, entity: E) {
        self.publish(LifecycleEvent::ObservableDetached(entity));
    }

    pub fn pending_lifecycle_events(&self) -> usize {
        self.lifecycle.len()
    }

    // Tick

    /// Runs one simulation tick
    pub fn update<W: WorldRefType<E>, R: ReplicationSink<E>>(&mut self, world: &W, replication: &mut R) {
        if self.has_ticked {
            self.tick = self.tick.wrapping_add(1);
            self.frame_offset = (self.frame_offset + 1) % self.config.update_period;
        }
        self.has_ticked = true;

        for (_, state) in self.store.iter_mut() {
            state.begin_tick();
        }

        self.process_lifecycle_events(replication);
        self.assign_identities();
        self.capture_positions(world);
        let inputs = self.observer_inputs(world);
        self.geometry.rebuild(self.tick, world.terrain_colliders());

        let context = TickContext {
            tick: self.tick,
            frame_offset: self.frame_offset,
            update_period: self.config.update_period,
        };
        let precise_settings = PreciseSettings {
            max_raycasts: self.config.max_raycast_count_per_frame,
            head_probe: self.config.capsule_head_probe,
            look_ahead_secs: self.config.look_ahead.as_secs_f32(),
        };
        let tiers = DistanceTiers::from_config(&self.config);

        // precise first: the coarse pass reads the visibility it leaves behind
        self.precise.run(
            &context,
            &precise_settings,
            &inputs,
            &mut self.store,
            &self.registry,
            &self.positions,
            &self.geometry.snapshot(),
        );
        self.simple.run(
            &context,
            SendPeriod::new(self.config.simple_period),
            &inputs,
            &mut self.store,
            &self.registry,
            &self.positions,
        );
        self.coarse.run(
            &context,
            &tiers,
            &inputs,
            &mut self.store,
            &self.registry,
            &self.positions,
        );

        self.commit_changes(replication);
    }

    fn process_lifecycle_events<R: ReplicationSink<E>>(&mut self, replication: &mut R) {
        for event in self.lifecycle.drain() {
            match event {
                LifecycleEvent::ObserverAttached(entity, config) => {
                    let state = ObserverState::new(config, self.registry.capacity());
                    if self.store.insert(entity, state) {
                        info!("observer {:?} attached", entity);
                    } else {
                        self.report(InterestError::ObserverAlreadyAttached {
                            entity: format!("{:?}", entity),
                        });
                    }
                }
                LifecycleEvent::ObserverDetached(entity) => {
                    let Some(state) = self.store.remove(&entity) else {
                        self.report(InterestError::ObserverNotFound {
                            entity: format!("{:?}", entity),
                        });
                        continue;
                    };
                    // tell replication to stop before the table goes away
                    for (id, _) in state.nonzero_periods() {
                        let Some(observable) = self.registry.entity_of(id) else {
                            continue;
                        };
                        replication.set_send_period(&entity, &observable, SendPeriod::NEVER);
                        self.events
                            .push_send_period(entity, observable, SendPeriod::NEVER);
                    }
                    info!("observer {:?} detached", entity);
                }
                LifecycleEvent::ObservableAttached(entity, kind) => {
                    if !self.registry.attach(entity, kind) {
                        self.report(InterestError::ObservableAlreadyAttached {
                            entity: format!("{:?}", entity),
                        });
                    }
                }
                LifecycleEvent::ObservableDetached(entity) => match self.registry.detach(&entity) {
                    Ok(DetachOutcome::Freed(id)) => {
                        for (observer, state) in self.store.iter_mut() {
                            let (was_visible, period) = state.forget(id);
                            if !period.is_never() {
                                replication.set_send_period(observer, &entity, SendPeriod::NEVER);
                                self.events
                                    .push_send_period(*observer, entity, SendPeriod::NEVER);
                            }
                            if was_visible {
                                self.events.push_hide(*observer, entity);
                            }
                        }
                        self.events.push_freed(entity, id);
                        debug!("observable {:?} released identity {}", entity, id);
                    }
                    Ok(DetachOutcome::WasPending) => {}
                    Ok(DetachOutcome::Unknown) => {
                        self.report(InterestError::ObservableNotFound {
                            entity: format!("{:?}", entity),
                        });
                    }
                    Err(error) => self.report(error.into()),
                },
            }
        }
    }

    fn assign_identities(&mut self) {
        for result in self.registry.assign_pending() {
            match result {
                Ok((entity, id)) => {
                    debug!("observable {:?} assigned identity {}", entity, id);
                    self.events.push_assigned(entity, id);
                }
                Err((entity, error)) => {
                    let error = identity_exhausted(&entity, error);
                    self.events.push_error(error);
                }
            }
        }
    }

    fn capture_positions<W: WorldRefType<E>>(&mut self, world: &W) {
        self.positions.clear();
        for (id, slot) in self.registry.assigned() {
            match world.position(&slot.entity) {
                Some(position) if position.is_finite() => self.positions.set(id, Some(position)),
                _ => warn!("observable {:?} has no usable position, skipped this tick", slot.entity),
            }
        }
    }

    fn observer_inputs<W: WorldRefType<E>>(&self, world: &W) -> Vec<ObserverInput<E>> {
        let mut inputs = Vec::with_capacity(self.store.len());
        for (order, (entity, _)) in self.store.iter().enumerate() {
            if !world.has_connection(entity) {
                continue;
            }
            let Some(position) = world.position(entity).filter(Vec3::is_finite) else {
                warn!("observer {:?} has no usable position, skipped this tick", entity);
                continue;
            };
            let velocity = world
                .velocity(entity)
                .filter(Vec3::is_finite)
                .unwrap_or(Vec3::ZERO);
            inputs.push(ObserverInput {
                entity: *entity,
                order,
                position,
                velocity,
            });
        }
        inputs
    }

    fn commit_changes<R: ReplicationSink<E>>(&mut self, replication: &mut R) {
        let registry = &self.registry;
        let events = &mut self.events;

        for (observer, state) in self.store.iter_mut() {
            let changes = state.finish_tick();
            for id in changes.shown {
                if let Some(observable) = registry.entity_of(id) {
                    events.push_show(*observer, observable);
                }
            }
            for id in changes.hidden {
                if let Some(observable) = registry.entity_of(id) {
                    events.push_hide(*observer, observable);
                }
            }
            for (id, period) in changes.periods {
                let Some(observable) = registry.entity_of(id) else {
                    continue;
                };
                replication.set_send_period(observer, &observable, period);
                events.push_send_period(*observer, observable, period);
            }
        }
    }

    fn report(&mut self, error: InterestError) {
        warn!("{}", error);
        self.events.push_error(error);
    }

    /// Returns and clears every event gathered since the last call
    pub fn take_events(&mut self) -> InterestEvents<E> {
        std::mem::replace(&mut self.events, InterestEvents::new())
    }

    // Observers

    pub fn observer_exists(&self, entity: &E) -> bool {
        self.store.contains(entity)
    }

    /// Retrieves an ObserverRef that exposes read-only operations for the
    /// observer. Panics if the observer is not attached.
    pub fn observer(&'_ self, entity: &E) -> ObserverRef<'_, E> {
        if self.store.contains(entity) {
            return ObserverRef::new(self, entity);
        }
        panic!("No Observer exists for given Entity!");
    }

    /// Retrieves an ObserverMut for tuning the observer's radii.
    /// Panics if the observer is not attached.
    pub fn observer_mut(&'_ mut self, entity: &E) -> ObserverMut<'_, E> {
        if self.store.contains(entity) {
            return ObserverMut::new(self, entity);
        }
        panic!("No Observer exists for given Entity!");
    }

    /// Observers in attach order
    pub fn observer_keys(&self) -> Vec<E> {
        self.store.entities()
    }

    pub fn observers_count(&self) -> usize {
        self.store.len()
    }

    pub(crate) fn observer_state(&self, entity: &E) -> Option<&ObserverState> {
        self.store.get(entity)
    }

    pub(crate) fn observer_state_mut(&mut self, entity: &E) -> Option<&mut ObserverState> {
        self.store.get_mut(entity)
    }

    // Observables

    /// True once attached, whether or not an identity was assigned yet
    pub fn observable_exists(&self, entity: &E) -> bool {
        self.registry.contains(entity)
    }

    pub fn observable_id(&self, entity: &E) -> Option<ObservableId> {
        self.registry.id_of(entity)
    }

    pub fn observable_entity(&self, id: ObservableId) -> Option<E> {
        self.registry.entity_of(id)
    }

    pub fn observable_kind(&self, entity: &E) -> Option<ObservableKind> {
        let id = self.registry.id_of(entity)?;
        self.registry.slot(id).map(|slot| slot.kind)
    }

    pub fn live_observables_count(&self) -> usize {
        self.registry.live_count()
    }

    pub fn pending_observables_count(&self) -> usize {
        self.registry.pending_count()
    }

    pub fn observable_capacity(&self) -> usize {
        self.registry.capacity()
    }

    // Pairs

    pub fn is_visible(&self, observer: &E, observable: &E) -> bool {
        let (Some(state), Some(id)) = (self.store.get(observer), self.registry.id_of(observable)) else {
            return false;
        };
        state.is_visible(id)
    }

    pub fn send_period(&self, observer: &E, observable: &E) -> SendPeriod {
        let (Some(state), Some(id)) = (self.store.get(observer), self.registry.id_of(observable)) else {
            return SendPeriod::NEVER;
        };
        state.send_period(id)
    }

    /// Whether the pair should be replicated on the current tick: always on
    /// the tick it became visible, then once every send period
    pub fn should_send(&self, observer: &E, observable: &E) -> bool {
        let (Some(state), Some(id)) = (self.store.get(observer), self.registry.id_of(observable)) else {
            return false;
        };
        self.should_send_id(state, id)
    }

    pub(crate) fn should_send_id(&self, state: &ObserverState, id: ObservableId) -> bool {
        let period = state.send_period(id);
        if period.is_never() {
            return false;
        }
        if state.is_fresh(id) {
            return true;
        }
        let stagger = self
            .registry
            .slot(id)
            .map(|slot| slot.stagger_slot)
            .unwrap_or(0);
        period.is_send_tick(self.tick, stagger)
    }

    // Ticks & statistics

    /// Tick most recently processed by `update`
    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    pub fn frame_offset(&self) -> u32 {
        self.frame_offset
    }

    pub fn raycasts_last_tick(&self) -> usize {
        self.precise.raycasts_last_tick()
    }

    pub fn deferred_raycasts_last_tick(&self) -> usize {
        self.precise.deferred_last_tick()
    }

    pub fn distance_only_fallbacks_last_tick(&self) -> usize {
        self.precise.degraded_last_tick()
    }

    pub fn coarse_evaluations_last_tick(&self) -> usize {
        self.coarse.evaluated_last_tick()
    }

    pub fn simple_evaluations_last_tick(&self) -> usize {
        self.simple.evaluated_last_tick()
    }

    pub fn terrain_collider_count(&self) -> usize {
        self.geometry.len()
    }

    // Config

    pub fn config(&self) -> &InterestConfig {
        &self.config
    }

    pub fn max_aoi(&self) -> f32 {
        self.config.max_aoi
    }

    pub fn set_max_aoi(&mut self, max_aoi: f32) {
        if !(max_aoi.is_finite() && max_aoi >= 0.0) {
            warn!("rejected max AOI of {}", max_aoi);
            return;
        }
        self.config.max_aoi = max_aoi;
    }

    pub fn increase_threshold(&self) -> f32 {
        self.config.increase_threshold
    }

    pub fn set_increase_threshold(&mut self, increase_threshold: f32) {
        if !(increase_threshold.is_finite() && increase_threshold >= 0.0) {
            warn!("rejected period increase threshold of {}", increase_threshold);
            return;
        }
        self.config.increase_threshold = increase_threshold;
    }

    pub fn update_period(&self) -> u32 {
        self.config.update_period
    }

    pub fn set_update_period(&mut self, update_period: u32) {
        self.config.update_period = update_period.max(1);
        self.frame_offset %= self.config.update_period;
    }

    pub fn max_send_period(&self) -> u8 {
        self.config.max_send_period
    }

    pub fn set_max_send_period(&mut self, max_send_period: u8) {
        self.config.max_send_period = max_send_period.max(1);
    }

    pub fn max_raycast_count_per_frame(&self) -> usize {
        self.config.max_raycast_count_per_frame
    }

    pub fn set_max_raycast_count_per_frame(&mut self, max_raycasts: usize) {
        self.config.max_raycast_count_per_frame = max_raycasts;
    }

    pub fn look_ahead(&self) -> Duration {
        self.config.look_ahead
    }

    pub fn set_look_ahead(&mut self, look_ahead: Duration) {
        self.config.look_ahead = look_ahead;
    }

    pub fn simple_period(&self) -> u8 {
        self.config.simple_period
    }

    pub fn set_simple_period(&mut self, simple_period: u8) {
        self.config.simple_period = simple_period.max(1);
    }

    pub fn capsule_head_probe(&self) -> bool {
        self.config.capsule_head_probe
    }

    pub fn set_capsule_head_probe(&mut self, enabled: bool) {
        self.config.capsule_head_probe = enabled;
    }
}
