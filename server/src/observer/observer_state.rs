use sightline_shared::{ObservableId, PackedBitset, SendPeriod, Vec3, VisibilityBitset};

use super::observer_config::ObserverConfig;

/// Pair state of one observer against every observable identity.
///
/// All tables are sized to the identity capacity and indexed directly by
/// `ObservableId`. Evaluators write the working values; `finish_tick`
/// compares them with what was reported last and produces the change set.
pub struct ObserverState {
    config: ObserverConfig,
    visible: PackedBitset,
    // visibility bits whose value differs from the start of the tick
    flipped: PackedBitset,
    fresh: PackedBitset,
    tracked: PackedBitset,
    raycast_due: PackedBitset,
    periods: Vec<SendPeriod>,
    committed_periods: Vec<SendPeriod>,
    dirty_periods: Vec<ObservableId>,
    updated: Vec<ObservableId>,
    point_of_view: Option<Vec3>,
}

/// Differences produced by one tick for one observer
#[derive(Default)]
pub(crate) struct ObserverTickChanges {
    pub shown: Vec<ObservableId>,
    pub hidden: Vec<ObservableId>,
    pub periods: Vec<(ObservableId, SendPeriod)>,
}

impl ObserverState {
    pub fn new(config: ObserverConfig, capacity: usize) -> Self {
        Self {
            config,
            visible: PackedBitset::with_capacity(capacity),
            flipped: PackedBitset::with_capacity(capacity),
            fresh: PackedBitset::with_capacity(capacity),
            tracked: PackedBitset::with_capacity(capacity),
            raycast_due: PackedBitset::with_capacity(capacity),
            periods: vec![SendPeriod::NEVER; capacity],
            committed_periods: vec![SendPeriod::NEVER; capacity],
            dirty_periods: Vec::new(),
            updated: Vec::new(),
            point_of_view: None,
        }
    }

    // Config

    pub fn config(&self) -> &ObserverConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut ObserverConfig {
        &mut self.config
    }

    pub fn point_of_view(&self) -> Option<Vec3> {
        self.point_of_view
    }

    pub(crate) fn set_point_of_view(&mut self, point_of_view: Option<Vec3>) {
        self.point_of_view = point_of_view;
    }

    // Visibility

    pub fn is_visible(&self, id: ObservableId) -> bool {
        self.visible.get(id)
    }

    /// Visibility changed during the tick currently being evaluated
    pub(crate) fn flipped_this_tick(&self, id: ObservableId) -> bool {
        self.flipped.get(id)
    }

    pub(crate) fn set_visible(&mut self, id: ObservableId, visible: bool) {
        let previous = self.visible.set(id, visible);
        if previous != visible {
            let flipped = self.flipped.get(id);
            self.flipped.set(id, !flipped);
        }
    }

    /// Pairs which became visible this tick and have not had a send yet
    pub fn is_fresh(&self, id: ObservableId) -> bool {
        self.fresh.get(id)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.count()
    }

    pub fn visible_ids(&self) -> impl Iterator<Item = ObservableId> + '_ {
        self.visible.iter_ones()
    }

    /// Identities whose visibility flipped during the last tick
    pub fn updated_ids(&self) -> &[ObservableId] {
        &self.updated
    }

    // Tracking

    pub(crate) fn is_tracked(&self, id: ObservableId) -> bool {
        self.tracked.get(id)
    }

    pub(crate) fn track(&mut self, id: ObservableId) {
        self.tracked.set(id, true);
    }

    pub(crate) fn is_raycast_due(&self, id: ObservableId) -> bool {
        self.raycast_due.get(id)
    }

    pub(crate) fn set_raycast_due(&mut self, id: ObservableId, due: bool) {
        self.raycast_due.set(id, due);
    }

    // Send periods

    /// Period last reported to the replication layer
    pub fn send_period(&self, id: ObservableId) -> SendPeriod {
        self.committed_periods
            .get(id.index())
            .copied()
            .unwrap_or(SendPeriod::NEVER)
    }

    pub(crate) fn set_send_period(&mut self, id: ObservableId, period: SendPeriod) {
        let slot = &mut self.periods[id.index()];
        if *slot == period {
            return;
        }
        *slot = period;
        self.dirty_periods.push(id);
    }

    /// Every pair the replication layer currently sends, with its period
    pub fn nonzero_periods(&self) -> Vec<(ObservableId, SendPeriod)> {
        self.committed_periods
            .iter()
            .enumerate()
            .filter(|(_, period)| !period.is_never())
            .map(|(index, period)| (ObservableId::new(index as u16), *period))
            .collect()
    }

    // Tick

    pub(crate) fn begin_tick(&mut self) {
        self.updated.clear();
        self.fresh.clear();
    }

    pub(crate) fn finish_tick(&mut self) -> ObserverTickChanges {
        let mut changes = ObserverTickChanges::default();

        for id in self.flipped.iter_ones() {
            self.updated.push(id);
            if self.visible.get(id) {
                changes.shown.push(id);
            } else {
                changes.hidden.push(id);
            }
        }
        for id in &changes.shown {
            self.fresh.set(*id, true);
        }
        self.flipped.clear();

        let mut dirty = std::mem::take(&mut self.dirty_periods);
        dirty.sort_unstable();
        dirty.dedup();
        for id in dirty.drain(..) {
            let working = self.periods[id.index()];
            let committed = &mut self.committed_periods[id.index()];
            if *committed != working {
                *committed = working;
                changes.periods.push((id, working));
            }
        }
        self.dirty_periods = dirty;

        changes
    }

    /// Drops every trace of an identity whose observable detached. Returns
    /// whether it was visible and the period last reported for it.
    pub(crate) fn forget(&mut self, id: ObservableId) -> (bool, SendPeriod) {
        let was_visible = self.visible.set(id, false);
        let committed = std::mem::replace(&mut self.committed_periods[id.index()], SendPeriod::NEVER);
        self.periods[id.index()] = SendPeriod::NEVER;
        self.flipped.set(id, false);
        self.fresh.set(id, false);
        self.tracked.set(id, false);
        self.raycast_due.set(id, false);
        self.dirty_periods.retain(|dirty| *dirty != id);
        self.updated.retain(|updated| *updated != id);
        (was_visible, committed)
    }
}
