use std::{default::Default, time::Duration};

use sightline_shared::{DEFAULT_MAX_SEND_PERIOD, MAX_OBSERVABLES};

/// Global tunables of the interest server. Everything here may also be
/// changed at runtime through the server's setters.
#[derive(Clone, Debug, PartialEq)]
pub struct InterestConfig {
    /// Beyond this distance a visible observable is never sent, independently
    /// of the observer's visibility radius
    pub max_aoi: f32,
    /// Observables closer than this are sent every tick; the send period then
    /// grows with the square root of the distance relative to it
    pub increase_threshold: f32,
    /// Pairs are re-evaluated once every `update_period` ticks
    pub update_period: u32,
    /// Cap on the send period produced by the distance throttle
    pub max_send_period: u8,
    /// Hard limit on occlusion raycasts issued in a single tick
    pub max_raycast_count_per_frame: usize,
    /// How far ahead an observer's point of view is extrapolated
    pub look_ahead: Duration,
    /// Fixed send period used for observables that skip occlusion
    pub simple_period: u8,
    /// Probe the capsule head when its center is occluded
    pub capsule_head_probe: bool,
    /// Live observable bound, at most `MAX_OBSERVABLES`
    pub max_observables: usize,
}

impl Default for InterestConfig {
    fn default() -> Self {
        Self {
            max_aoi: 500.0,
            increase_threshold: 63.0,
            update_period: 4,
            max_send_period: DEFAULT_MAX_SEND_PERIOD,
            max_raycast_count_per_frame: 64,
            look_ahead: Duration::from_millis(100),
            simple_period: 8,
            capsule_head_probe: true,
            max_observables: MAX_OBSERVABLES,
        }
    }
}

impl InterestConfig {
    /// Clamps out-of-range values into something the evaluators accept
    pub(crate) fn sanitized(mut self) -> Self {
        if !(self.max_aoi.is_finite() && self.max_aoi >= 0.0) {
            self.max_aoi = Self::default().max_aoi;
        }
        if !(self.increase_threshold.is_finite() && self.increase_threshold >= 0.0) {
            self.increase_threshold = Self::default().increase_threshold;
        }
        self.update_period = self.update_period.max(1);
        self.max_send_period = self.max_send_period.max(1);
        self.simple_period = self.simple_period.max(1);
        self.max_observables = self.max_observables.clamp(1, MAX_OBSERVABLES);
        self
    }
}
