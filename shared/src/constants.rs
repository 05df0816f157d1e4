/// Upper bound on simultaneously live observables. Identities are drawn from
/// `[0, MAX_OBSERVABLES)` and per-observer tables are sized by it.
pub const MAX_OBSERVABLES: usize = 1024;

/// Largest send period the distance throttle produces unless configured otherwise.
pub const DEFAULT_MAX_SEND_PERIOD: u8 = 8;
