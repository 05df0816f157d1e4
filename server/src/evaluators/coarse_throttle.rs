use std::hash::Hash;

use log::debug;

use sightline_shared::SendPeriod;

use crate::{
    observable::{observable_kind::ObservableKind, observable_registry::ObservableRegistry},
    observer::pair_state_store::PairStateStore,
    InterestConfig,
};

use super::{ObservablePositions, ObserverInput, TickContext};

/// Distance bands used to turn a squared distance into a send period
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceTiers {
    pub increase_threshold: f32,
    pub max_aoi: f32,
    pub max_send_period: u8,
}

impl DistanceTiers {
    pub fn new(increase_threshold: f32, max_aoi: f32, max_send_period: u8) -> Self {
        Self {
            increase_threshold,
            max_aoi,
            max_send_period,
        }
    }

    pub(crate) fn from_config(config: &InterestConfig) -> Self {
        Self::new(config.increase_threshold, config.max_aoi, config.max_send_period)
    }
}

/// Send period for an observable at `distance_squared` which is already
/// known to be inside the observer's visibility radius.
///
/// Closer than `increase_threshold` is sent every tick, beyond `max_aoi`
/// never, and in between the period is `ceil(sqrt(d² / threshold²))`
/// capped at `max_send_period`.
pub fn distance_send_period(distance_squared: f32, tiers: &DistanceTiers) -> SendPeriod {
    let increase_squared = tiers.increase_threshold * tiers.increase_threshold;
    if distance_squared < increase_squared {
        return SendPeriod::EVERY_TICK;
    }
    if distance_squared > tiers.max_aoi * tiers.max_aoi {
        return SendPeriod::NEVER;
    }
    let cap = tiers.max_send_period.max(1);
    if increase_squared <= 0.0 {
        return SendPeriod::new(cap);
    }

    let period = (distance_squared / increase_squared).sqrt().ceil();
    SendPeriod::new(period.clamp(1.0, f32::from(cap)) as u8)
}

/// Assigns send periods from straight-line distance to every plain and
/// precise observable, and owns visibility for plain ones.
///
/// A pair is only looked at on its stagger tick, on the tick it first
/// appears, or when the precise evaluator changed it this tick; a pair the
/// precise evaluator holds hidden is forced to `NEVER` every tick.
pub struct CoarseDistanceThrottle {
    evaluated_last_tick: usize,
}

impl CoarseDistanceThrottle {
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
        tiers: &DistanceTiers,
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
                let due = match slot.kind {
                    ObservableKind::Simple => continue,
                    ObservableKind::Precise(_) => {
                        if !state.is_visible(id) {
                            // hidden by the occlusion pass
                            state.set_send_period(id, SendPeriod::NEVER);
                            continue;
                        }
                        state.flipped_this_tick(id) || context.is_stagger_tick(slot.stagger_slot)
                    }
                    ObservableKind::Plain => {
                        !state.is_tracked(id) || context.is_stagger_tick(slot.stagger_slot)
                    }
                };
                if !due {
                    continue;
                }
                let Some(position) = positions.get(id) else {
                    continue;
                };
                state.track(id);
                evaluated += 1;

                let distance_squared = input.position.distance_squared(&position);
                if distance_squared > max_visibility_squared {
                    state.set_visible(id, false);
                    state.set_send_period(id, SendPeriod::NEVER);
                    continue;
                }
                state.set_visible(id, true);
                state.set_send_period(id, distance_send_period(distance_squared, tiers));
            }
        }

        if evaluated > 0 {
            debug!("coarse throttle evaluated {} pairs on tick {}", evaluated, context.tick);
        }
        self.evaluated_last_tick = evaluated;
    }
}
