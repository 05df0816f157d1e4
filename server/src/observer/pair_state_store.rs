use std::{collections::HashMap, hash::Hash};

use super::observer_state::ObserverState;

/// Every attached observer with its pair state, iterated in attach order so
/// two runs over the same inputs evaluate pairs in the same sequence.
pub struct PairStateStore<E: Copy + Eq + Hash> {
    observers: Vec<(E, ObserverState)>,
    index: HashMap<E, usize>,
}

impl<E: Copy + Eq + Hash> PairStateStore<E> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn contains(&self, entity: &E) -> bool {
        self.index.contains_key(entity)
    }

    /// Returns false if the observer was already present
    pub fn insert(&mut self, entity: E, state: ObserverState) -> bool {
        if self.index.contains_key(&entity) {
            return false;
        }
        self.index.insert(entity, self.observers.len());
        self.observers.push((entity, state));
        true
    }

    pub fn remove(&mut self, entity: &E) -> Option<ObserverState> {
        let position = self.index.remove(entity)?;
        let (_, state) = self.observers.remove(position);
        for (moved, _) in &self.observers[position..] {
            if let Some(slot) = self.index.get_mut(moved) {
                *slot -= 1;
            }
        }
        Some(state)
    }

    pub fn get(&self, entity: &E) -> Option<&ObserverState> {
        let position = self.index.get(entity)?;
        self.observers.get(*position).map(|(_, state)| state)
    }

    pub fn get_mut(&mut self, entity: &E) -> Option<&mut ObserverState> {
        let position = self.index.get(entity)?;
        self.observers.get_mut(*position).map(|(_, state)| state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&E, &ObserverState)> {
        self.observers.iter().map(|(entity, state)| (entity, state))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&E, &mut ObserverState)> {
        self.observers.iter_mut().map(|(entity, state)| (&*entity, state))
    }

    pub fn entities(&self) -> Vec<E> {
        self.observers.iter().map(|(entity, _)| *entity).collect()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }
}
