use std::fmt;

/// Dense identity of a live observable, always below the allocator's capacity
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct ObservableId(u16);

impl ObservableId {
    pub fn new(value: u16) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Slot of this identity in per-observer tables
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for ObservableId {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<ObservableId> for u16 {
    fn from(value: ObservableId) -> Self {
        value.0
    }
}

impl fmt::Display for ObservableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
