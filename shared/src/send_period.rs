use std::fmt;

/// Number of ticks between two network updates of one (observer, observable)
/// pair. `0` disables updates, `1` sends every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SendPeriod(u8);

impl SendPeriod {
    pub const NEVER: SendPeriod = SendPeriod(0);
    pub const EVERY_TICK: SendPeriod = SendPeriod(1);

    pub const fn new(period: u8) -> Self {
        Self(period)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_never(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if `tick` is one on which the pair should be sent.
    /// `stagger` shifts the phase so pairs sharing a period do not all land
    /// on the same tick.
    pub fn is_send_tick(&self, tick: u32, stagger: u32) -> bool {
        match self.0 {
            0 => false,
            1 => true,
            period => tick.wrapping_add(stagger) % u32::from(period) == 0,
        }
    }
}

impl From<u8> for SendPeriod {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for SendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "never"),
            1 => write!(f, "every tick"),
            period => write!(f, "every {} ticks", period),
        }
    }
}
