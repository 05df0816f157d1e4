use std::hash::Hash;

use sightline_shared::SendPeriod;

use crate::{
    observable::{observable_kind::ObservableKind, observable_registry::ObservableRegistry},
    observer::pair_state_store::PairStateStore,
};

use super::{ObservablePositions, ObserverInput, TickContext};

/// Handles observables which never need occlusion: anything inside the
/// observer's visibility radius is visible and sent at one fixed period.
pub struct SimpleEvaluator {
    evaluated_last_tick: usize,
}

impl SimpleEvaluator {
    pub fn new() -> Self {
        Self {
            evaluated_last_tick: 0,
        }
    }

    pub fn evaluated_last_tick(&self) -> usize {
        self.evaluated_last_tick
    }

    pub(crate) fn run<E: Copy + Eq + Hash>(
        &mut self,
        context: &TickContext,
        period: SendPeriod,
        inputs: &[ObserverInput<E>],
        store: &mut PairStateStore<E>,
        registry: &ObservableRegistry<E>,
        positions: &ObservablePositions,
    ) {
        let mut evaluated = 0;

        for input in inputs {
            let Some(state) = store.get_mut(&input.entity) else {
                continue;
            };
            let max_visibility_squared = state.config().max_visibility_radius_squared();

            for (id, slot) in registry.assigned() {
                if slot.kind != ObservableKind::Simple {
                    continue;
                }
                if state.is_tracked(id) && !context.is_stagger_tick(slot.stagger_slot) {
                    continue;
                }
                let Some(position) = positions.get(id) else {
                    continue;
                };
                state.track(id);
                evaluated += 1;

                if input.position.distance_squared(&position) > max_visibility_squared {
                    state.set_visible(id, false);
                    state.set_send_period(id, SendPeriod::NEVER);
                } else {
                    state.set_visible(id, true);
                    state.set_send_period(id, period);
                }
            }
        }

        self.evaluated_last_tick = evaluated;
    }
}
