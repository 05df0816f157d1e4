use sightline_shared::CapsuleShape;

/// Which evaluator decides an observable's visibility
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ObservableKind {
    /// Distance only, decided by the coarse throttle
    Plain,
    /// Occlusion tested against terrain before the coarse throttle assigns a period
    Precise(CapsuleShape),
    /// Never occlusion tested; re-announced at a fixed cadence
    Simple,
}

impl Default for ObservableKind {
    fn default() -> Self {
        ObservableKind::Plain
    }
}
