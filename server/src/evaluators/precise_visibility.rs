use std::hash::Hash;

use log::{debug, info, warn};

use sightline_shared::{GeometrySnapshot, HeightFieldRaycaster, ObservableId, Raycaster, Vec3};

use crate::{
    observable::{observable_kind::ObservableKind, observable_registry::ObservableRegistry},
    observer::pair_state_store::PairStateStore,
};

use super::{ObservablePositions, ObserverInput, TickContext};

/// Tunables the precise evaluator reads each tick
#[derive(Clone, Copy, Debug)]
pub(crate) struct PreciseSettings {
    pub max_raycasts: usize,
    pub head_probe: bool,
    pub look_ahead_secs: f32,
}

struct RaycastRequest<E> {
    observer: E,
    order: usize,
    id: ObservableId,
    origin: Vec3,
    center: Vec3,
    head: Vec3,
}

/// Line-of-sight visibility for observables with a capsule.
///
/// Distance checks run for every pair every tick. Raycasts run only for
/// pairs that are due (first seen, or on their stagger tick) and are limited
/// to a per-tick budget; due pairs left over keep their previous visibility
/// and are served first on the next tick.
pub struct PreciseVisibilityEvaluator {
    raycaster: Box<dyn Raycaster>,
    // first pair that did not fit in the previous tick's budget
    cursor: Option<(usize, ObservableId)>,
    geometry_missing: bool,
    raycasts_last_tick: usize,
    deferred_last_tick: usize,
    degraded_last_tick: usize,
}

impl PreciseVisibilityEvaluator {
    pub fn new(raycaster: Box<dyn Raycaster>) -> Self {
        Self {
            raycaster,
            cursor: None,
            geometry_missing: false,
            raycasts_last_tick: 0,
            deferred_last_tick: 0,
            degraded_last_tick: 0,
        }
    }

    pub fn set_raycaster(&mut self, raycaster: Box<dyn Raycaster>) {
        self.raycaster = raycaster;
    }

    pub fn raycasts_last_tick(&self) -> usize {
        self.raycasts_last_tick
    }

    /// Pairs that needed a raycast but did not fit in the budget
    pub fn deferred_last_tick(&self) -> usize {
        self.deferred_last_tick
    }

    /// Pairs decided by distance alone because no terrain was available
    pub fn degraded_last_tick(&self) -> usize {
        self.degraded_last_tick
    }

    /// Eye position extrapolated along the observer's velocity
    pub(crate) fn point_of_view<E>(input: &ObserverInput<E>, eye_height: f32, look_ahead_secs: f32) -> Vec3 {
        input.position + input.velocity * look_ahead_secs + Vec3::UP * eye_height
    }

    pub(crate) fn run<E: Copy + Eq + Hash>(
        &mut self,
        context: &TickContext,
        settings: &PreciseSettings,
        inputs: &[ObserverInput<E>],
        store: &mut PairStateStore<E>,
        registry: &ObservableRegistry<E>,
        positions: &ObservablePositions,
        geometry: &GeometrySnapshot,
    ) {
        let mut requests = Vec::new();
        let mut degraded = 0;

        for input in inputs {
            let Some(state) = store.get_mut(&input.entity) else {
                continue;
            };
            let config = *state.config();
            let point_of_view = Self::point_of_view(input, config.eye_height, settings.look_ahead_secs);
            state.set_point_of_view(Some(point_of_view));
            let max_visibility_squared = config.max_visibility_radius_squared();
            let unconditional_squared = config.unconditional_visibility_radius_squared();

            for (id, slot) in registry.assigned() {
                let ObservableKind::Precise(capsule) = slot.kind else {
                    continue;
                };
                let Some(position) = positions.get(id) else {
                    continue;
                };
                if !state.is_tracked(id) {
                    state.track(id);
                    state.set_raycast_due(id, true);
                } else if context.is_stagger_tick(slot.stagger_slot) {
                    state.set_raycast_due(id, true);
                }

                // radius cutoffs measure from the body, rays leave from the eye
                let distance_squared = input.position.distance_squared(&position);
                if distance_squared > max_visibility_squared {
                    state.set_visible(id, false);
                    state.set_raycast_due(id, false);
                    continue;
                }
                if distance_squared < unconditional_squared
                    || capsule.contains(&position, &point_of_view)
                {
                    state.set_visible(id, true);
                    state.set_raycast_due(id, false);
                    continue;
                }
                if geometry.is_empty() {
                    state.set_visible(id, true);
                    state.set_raycast_due(id, false);
                    degraded += 1;
                    continue;
                }
                if !state.is_raycast_due(id) {
                    continue;
                }

                requests.push(RaycastRequest {
                    observer: input.entity,
                    order: input.order,
                    id,
                    origin: point_of_view,
                    center: capsule.vertical_center(&position),
                    head: capsule.head(&position),
                });
            }
        }

        if degraded > 0 && !self.geometry_missing {
            warn!(
                "no terrain geometry available, precise visibility falls back to distance only (tick {})",
                context.tick
            );
            self.geometry_missing = true;
        } else if self.geometry_missing && !geometry.is_empty() {
            info!("terrain geometry available again on tick {}", context.tick);
            self.geometry_missing = false;
        }

        // resume where the budget ran out last tick
        let start = self
            .cursor
            .and_then(|cursor| {
                requests
                    .iter()
                    .position(|request| (request.order, request.id) >= cursor)
            })
            .unwrap_or(0);
        let (before, after) = requests.split_at(start);

        let raycaster = &self.raycaster;
        let mut raycasts = 0;
        let mut deferred = 0;
        let mut first_deferred = None;

        for request in after.iter().chain(before.iter()) {
            if raycasts >= settings.max_raycasts {
                deferred += 1;
                if first_deferred.is_none() {
                    first_deferred = Some((request.order, request.id));
                }
                continue;
            }

            raycasts += 1;
            let mut visible = !raycaster
                .raycast(&request.origin, &request.center, geometry)
                .is_blocked();
            if !visible && settings.head_probe && raycasts < settings.max_raycasts {
                raycasts += 1;
                visible = !raycaster
                    .raycast(&request.origin, &request.head, geometry)
                    .is_blocked();
            }

            let Some(state) = store.get_mut(&request.observer) else {
                continue;
            };
            state.set_visible(request.id, visible);
            state.set_raycast_due(request.id, false);
        }

        if deferred > 0 {
            debug!(
                "raycast budget of {} exhausted on tick {}, {} pairs deferred",
                settings.max_raycasts, context.tick, deferred
            );
        }

        self.cursor = first_deferred;
        self.raycasts_last_tick = raycasts;
        self.deferred_last_tick = deferred;
        self.degraded_last_tick = degraded;
    }
}

impl Default for PreciseVisibilityEvaluator {
    fn default() -> Self {
        Self::new(Box::new(HeightFieldRaycaster::default()))
    }
}
