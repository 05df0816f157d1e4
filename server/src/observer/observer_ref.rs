use std::{fmt::Debug, hash::Hash};

use log::warn;

use sightline_shared::{ObservableId, SendPeriod, Vec3};

use crate::{observer::observer_state::ObserverState, InterestServer, ObserverConfig};

// ObserverRef
pub struct ObserverRef<'s, E: Copy + Eq + Hash + Debug> {
    server: &'s InterestServer<E>,
    entity: E,
}

impl<'s, E: Copy + Eq + Hash + Debug> ObserverRef<'s, E> {
    pub(crate) fn new(server: &'s InterestServer<E>, entity: &E) -> Self {
        Self {
            server,
            entity: *entity,
        }
    }

    fn state(&self) -> &'s ObserverState {
        // the handle is only built for attached observers and borrows the server
        let server: &'s InterestServer<E> = self.server;
        match server.observer_state(&self.entity) {
            Some(state) => state,
            None => panic!("No Observer exists for given Entity!"),
        }
    }

    pub fn entity(&self) -> E {
        self.entity
    }

    pub fn config(&self) -> ObserverConfig {
        *self.state().config()
    }

    /// Eye position used by the last occlusion pass
    pub fn point_of_view(&self) -> Option<Vec3> {
        self.state().point_of_view()
    }

    /// Returns true if the observable is currently visible to this observer
    pub fn is_visible(&self, observable: &E) -> bool {
        self.server.is_visible(&self.entity, observable)
    }

    pub fn is_visible_id(&self, id: ObservableId) -> bool {
        self.state().is_visible(id)
    }

    pub fn visible_count(&self) -> usize {
        self.state().visible_count()
    }

    /// Every observable currently visible to this observer
    pub fn visible_observables(&self) -> Vec<E> {
        self.state()
            .visible_ids()
            .filter_map(|id| self.server.observable_entity(id))
            .collect()
    }

    /// Identities whose visibility flipped during the last tick
    pub fn updated_observable_ids(&self) -> &'s [ObservableId] {
        self.state().updated_ids()
    }

    pub fn updated_observables(&self) -> Vec<E> {
        self.updated_observable_ids()
            .iter()
            .filter_map(|id| self.server.observable_entity(*id))
            .collect()
    }

    pub fn send_period(&self, observable: &E) -> SendPeriod {
        self.server.send_period(&self.entity, observable)
    }

    pub fn should_send(&self, observable: &E) -> bool {
        self.server.should_send(&self.entity, observable)
    }

    /// Observables to replicate to this observer on the current tick
    pub fn send_list(&self) -> Vec<E> {
        let state = self.state();
        state
            .nonzero_periods()
            .into_iter()
            .filter(|(id, _)| self.server.should_send_id(state, *id))
            .filter_map(|(id, _)| self.server.observable_entity(id))
            .collect()
    }
}

// ObserverMut
pub struct ObserverMut<'s, E: Copy + Eq + Hash + Debug> {
    server: &'s mut InterestServer<E>,
    entity: E,
}

impl<'s, E: Copy + Eq + Hash + Debug> ObserverMut<'s, E> {
    pub(crate) fn new(server: &'s mut InterestServer<E>, entity: &E) -> Self {
        Self {
            server,
            entity: *entity,
        }
    }

    fn config_mut(&mut self) -> &mut ObserverConfig {
        match self.server.observer_state_mut(&self.entity) {
            Some(state) => state.config_mut(),
            None => panic!("No Observer exists for given Entity!"),
        }
    }

    pub fn entity(&self) -> E {
        self.entity
    }

    pub fn config(&self) -> ObserverConfig {
        self.server.observer(&self.entity).config()
    }

    /// Takes effect on the next evaluation of each pair
    pub fn set_max_visibility_radius(&mut self, radius: f32) -> &mut Self {
        if radius.is_finite() && radius >= 0.0 {
            self.config_mut().max_visibility_radius = radius;
        } else {
            warn!("rejected max visibility radius of {} for observer {:?}", radius, self.entity);
        }
        self
    }

    pub fn set_unconditional_visibility_radius(&mut self, radius: f32) -> &mut Self {
        if radius.is_finite() && radius >= 0.0 {
            self.config_mut().unconditional_visibility_radius = radius;
        } else {
            warn!(
                "rejected unconditional visibility radius of {} for observer {:?}",
                radius, self.entity
            );
        }
        self
    }

    pub fn set_eye_height(&mut self, eye_height: f32) -> &mut Self {
        if eye_height.is_finite() {
            self.config_mut().eye_height = eye_height;
        } else {
            warn!("rejected eye height of {} for observer {:?}", eye_height, self.entity);
        }
        self
    }
}
