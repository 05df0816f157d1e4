use std::collections::VecDeque;

use crate::{observable::observable_kind::ObservableKind, observer::observer_config::ObserverConfig};

/// Entity gained or lost observer / observable status. Published by the
/// host framework, drained at the start of the next tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LifecycleEvent<E> {
    ObserverAttached(E, ObserverConfig),
    ObserverDetached(E),
    ObservableAttached(E, ObservableKind),
    ObservableDetached(E),
}

pub(crate) struct LifecycleQueue<E> {
    events: VecDeque<LifecycleEvent<E>>,
}

impl<E> LifecycleQueue<E> {
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    pub fn publish(&mut self, event: LifecycleEvent<E>) {
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Takes every published event, oldest first
    pub fn drain(&mut self) -> VecDeque<LifecycleEvent<E>> {
        std::mem::take(&mut self.events)
    }
}
