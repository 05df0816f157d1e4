use std::{mem, vec::IntoIter};

use sightline_shared::{ObservableId, SendPeriod};

use crate::InterestError;

/// Outcomes of the ticks since the events were last taken
pub struct InterestEvents<E> {
    shows: Vec<(E, E)>,
    hides: Vec<(E, E)>,
    periods: Vec<(E, E, SendPeriod)>,
    assigned: Vec<(E, ObservableId)>,
    freed: Vec<(E, ObservableId)>,
    errors: Vec<InterestError>,
    empty: bool,
}

impl<E> InterestEvents<E> {
    pub(crate) fn new() -> Self {
        Self {
            shows: Vec::new(),
            hides: Vec::new(),
            periods: Vec::new(),
            assigned: Vec::new(),
            freed: Vec::new(),
            errors: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: InterestEvent<E>>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: InterestEvent<E>>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_show(&mut self, observer: E, observable: E) {
        self.shows.push((observer, observable));
        self.empty = false;
    }

    pub(crate) fn push_hide(&mut self, observer: E, observable: E) {
        self.hides.push((observer, observable));
        self.empty = false;
    }

    pub(crate) fn push_send_period(&mut self, observer: E, observable: E, period: SendPeriod) {
        self.periods.push((observer, observable, period));
        self.empty = false;
    }

    pub(crate) fn push_assigned(&mut self, observable: E, id: ObservableId) {
        self.assigned.push((observable, id));
        self.empty = false;
    }

    pub(crate) fn push_freed(&mut self, observable: E, id: ObservableId) {
        self.freed.push((observable, id));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: InterestError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait InterestEvent<E> {
    type Iter;

    fn iter(events: &mut InterestEvents<E>) -> Self::Iter;

    fn has(events: &InterestEvents<E>) -> bool;
}

// Show Event
/// `(observer, observable)` became visible
pub struct ShowEvent;
impl<E> InterestEvent<E> for ShowEvent {
    type Iter = IntoIter<(E, E)>;

    fn iter(events: &mut InterestEvents<E>) -> Self::Iter {
        mem::take(&mut events.shows).into_iter()
    }

    fn has(events: &InterestEvents<E>) -> bool {
        !events.shows.is_empty()
    }
}

// Hide Event
/// `(observer, observable)` stopped being visible, including when the
/// observable detached while visible
pub struct HideEvent;
impl<E> InterestEvent<E> for HideEvent {
    type Iter = IntoIter<(E, E)>;

    fn iter(events: &mut InterestEvents<E>) -> Self::Iter {
        mem::take(&mut events.hides).into_iter()
    }

    fn has(events: &InterestEvents<E>) -> bool {
        !events.hides.is_empty()
    }
}

// Send Period Event
pub struct SendPeriodEvent;
impl<E> InterestEvent<E> for SendPeriodEvent {
    type Iter = IntoIter<(E, E, SendPeriod)>;

    fn iter(events: &mut InterestEvents<E>) -> Self::Iter {
        mem::take(&mut events.periods).into_iter()
    }

    fn has(events: &InterestEvents<E>) -> bool {
        !events.periods.is_empty()
    }
}

// Identity Assigned Event
pub struct IdentityAssignedEvent;
impl<E> InterestEvent<E> for IdentityAssignedEvent {
    type Iter = IntoIter<(E, ObservableId)>;

    fn iter(events: &mut InterestEvents<E>) -> Self::Iter {
        mem::take(&mut events.assigned).into_iter()
    }

    fn has(events: &InterestEvents<E>) -> bool {
        !events.assigned.is_empty()
    }
}

// Identity Freed Event
pub struct IdentityFreedEvent;
impl<E> InterestEvent<E> for IdentityFreedEvent {
    type Iter = IntoIter<(E, ObservableId)>;

    fn iter(events: &mut InterestEvents<E>) -> Self::Iter {
        mem::take(&mut events.freed).into_iter()
    }

    fn has(events: &InterestEvents<E>) -> bool {
        !events.freed.is_empty()
    }
}

// Error Event
pub struct ErrorEvent;
impl<E> InterestEvent<E> for ErrorEvent {
    type Iter = IntoIter<InterestError>;

    fn iter(events: &mut InterestEvents<E>) -> Self::Iter {
        mem::take(&mut events.errors).into_iter()
    }

    fn has(events: &InterestEvents<E>) -> bool {
        !events.errors.is_empty()
    }
}
