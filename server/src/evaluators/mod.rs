use sightline_shared::{ObservableId, Vec3};

pub mod coarse_throttle;
pub mod precise_visibility;
pub mod simple_cadence;

/// Per-tick values every evaluator needs to decide whether a pair is due
#[derive(Clone, Copy, Debug)]
pub(crate) struct TickContext {
    pub tick: u32,
    pub frame_offset: u32,
    pub update_period: u32,
}

impl TickContext {
    /// True on the one tick out of every `update_period` where pairs with
    /// this stagger slot are re-evaluated
    pub fn is_stagger_tick(&self, stagger_slot: u32) -> bool {
        stagger_slot.wrapping_add(self.frame_offset) % self.update_period.max(1) == 0
    }
}

/// A connected observer with a known position, captured once per tick
#[derive(Clone, Copy, Debug)]
pub(crate) struct ObserverInput<E> {
    pub entity: E,
    /// Position in the store's attach order
    pub order: usize,
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Position of every observable holding an identity, read once per tick
pub(crate) struct ObservablePositions {
    positions: Vec<Option<Vec3>>,
}

impl ObservablePositions {
    pub fn new(capacity: usize) -> Self {
        Self {
            positions: vec![None; capacity],
        }
    }

    pub fn clear(&mut self) {
        self.positions.iter_mut().for_each(|position| *position = None);
    }

    pub fn set(&mut self, id: ObservableId, position: Option<Vec3>) {
        if let Some(slot) = self.positions.get_mut(id.index()) {
            *slot = position;
        }
    }

    pub fn get(&self, id: ObservableId) -> Option<Vec3> {
        self.positions.get(id.index()).copied().flatten()
    }
}
