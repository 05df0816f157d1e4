use std::{
    collections::{HashMap, VecDeque},
    hash::Hash,
};

use sightline_shared::{IdentityAllocator, IdentityError, ObservableId};

use super::observable_kind::ObservableKind;

/// An observable which holds an identity
#[derive(Clone, Copy, Debug)]
pub struct ObservableSlot<E> {
    pub entity: E,
    pub kind: ObservableKind,
    /// Evaluation phase, assigned round-robin so load spreads evenly
    /// regardless of which identity the observable received
    pub stagger_slot: u32,
}

pub(crate) enum DetachOutcome {
    Freed(ObservableId),
    WasPending,
    Unknown,
}

/// Owns the identity allocator and the mapping between entities and
/// identities. Entities wait in a queue until the next tick assigns them an
/// identity, in attach order.
pub struct ObservableRegistry<E: Copy + Eq + Hash> {
    allocator: IdentityAllocator,
    pending: VecDeque<(E, ObservableKind)>,
    entity_ids: HashMap<E, ObservableId>,
    slots: Vec<Option<ObservableSlot<E>>>,
    next_stagger_slot: u32,
}

impl<E: Copy + Eq + Hash> ObservableRegistry<E> {
    pub fn new(capacity: usize) -> Self {
        let allocator = IdentityAllocator::new(capacity);
        let slots = vec![None; allocator.capacity()];
        Self {
            allocator,
            pending: VecDeque::new(),
            entity_ids: HashMap::new(),
            slots,
            next_stagger_slot: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.allocator.capacity()
    }

    pub fn live_count(&self) -> usize {
        self.allocator.live_count()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn contains(&self, entity: &E) -> bool {
        self.entity_ids.contains_key(entity) || self.is_pending(entity)
    }

    pub fn is_pending(&self, entity: &E) -> bool {
        self.pending.iter().any(|(pending, _)| pending == entity)
    }

    /// Queues the entity for identity assignment. Returns false if it is
    /// already attached or queued.
    pub fn attach(&mut self, entity: E, kind: ObservableKind) -> bool {
        if self.contains(&entity) {
            return false;
        }
        self.pending.push_back((entity, kind));
        true
    }

    pub(crate) fn detach(&mut self, entity: &E) -> Result<DetachOutcome, IdentityError> {
        if let Some(id) = self.entity_ids.remove(entity) {
            self.slots[id.index()] = None;
            self.allocator.free(id)?;
            return Ok(DetachOutcome::Freed(id));
        }
        if let Some(position) = self.pending.iter().position(|(pending, _)| pending == entity) {
            self.pending.remove(position);
            return Ok(DetachOutcome::WasPending);
        }
        Ok(DetachOutcome::Unknown)
    }

    /// Hands out identities to every queued entity, oldest first. Entities
    /// which cannot get one are dropped from the queue and returned with
    /// the error.
    pub fn assign_pending(&mut self) -> Vec<Result<(E, ObservableId), (E, IdentityError)>> {
        let mut output = Vec::with_capacity(self.pending.len());

        while let Some((entity, kind)) = self.pending.pop_front() {
            match self.allocator.allocate() {
                Ok(id) => {
                    self.slots[id.index()] = Some(ObservableSlot {
                        entity,
                        kind,
                        stagger_slot: self.next_stagger_slot,
                    });
                    self.next_stagger_slot = self.next_stagger_slot.wrapping_add(1);
                    self.entity_ids.insert(entity, id);
                    output.push(Ok((entity, id)));
                }
                Err(error) => {
                    output.push(Err((entity, error)));
                }
            }
        }

        output
    }

    pub fn id_of(&self, entity: &E) -> Option<ObservableId> {
        self.entity_ids.get(entity).copied()
    }

    pub fn slot(&self, id: ObservableId) -> Option<&ObservableSlot<E>> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn entity_of(&self, id: ObservableId) -> Option<E> {
        self.slot(id).map(|slot| slot.entity)
    }

    /// Identities with their observables, in identity order
    pub fn assigned(&self) -> impl Iterator<Item = (ObservableId, &ObservableSlot<E>)> {
        self.slots
            .iter()
            .take(self.allocator.high_water_mark())
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.as_ref()
                    .map(|slot| (ObservableId::new(index as u16), slot))
            })
    }
}
