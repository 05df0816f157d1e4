use crate::{
    constants::MAX_OBSERVABLES,
    visibility::bitset::{PackedBitset, VisibilityBitset},
};

use super::{error::IdentityError, observable_id::ObservableId};

/// Hands out dense identities in `[0, capacity)`.
///
/// Freed identities are reused most-recently-freed first, and only once the
/// free list is empty does the high-water mark grow. Keeps the live set
/// packed at the low end of the range.
pub struct IdentityAllocator {
    capacity: usize,
    high_water_mark: usize,
    recycled: Vec<ObservableId>,
    live: PackedBitset,
    live_count: usize,
}

impl IdentityAllocator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_OBSERVABLES);
        Self {
            capacity,
            high_water_mark: 0,
            recycled: Vec::new(),
            live: PackedBitset::with_capacity(capacity),
            live_count: 0,
        }
    }

    pub fn allocate(&mut self) -> Result<ObservableId, IdentityError> {
        let id = if let Some(id) = self.recycled.pop() {
            id
        } else if self.high_water_mark < self.capacity {
            let id = ObservableId::new(self.high_water_mark as u16);
            self.high_water_mark += 1;
            id
        } else {
            return Err(IdentityError::CapacityExceeded {
                capacity: self.capacity,
            });
        };

        self.live.set(id, true);
        self.live_count += 1;
        Ok(id)
    }

    pub fn free(&mut self, id: ObservableId) -> Result<(), IdentityError> {
        if id.index() >= self.capacity {
            return Err(IdentityError::OutOfRange {
                id,
                capacity: self.capacity,
            });
        }
        if !self.live.get(id) {
            return Err(IdentityError::NotLive { id });
        }

        self.live.set(id, false);
        self.live_count -= 1;
        self.recycled.push(id);
        Ok(())
    }

    pub fn is_live(&self, id: ObservableId) -> bool {
        id.index() < self.capacity && self.live.get(id)
    }

    pub fn live_count(&self) -> usize {
        self.live_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct identities ever issued
    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark
    }
}
